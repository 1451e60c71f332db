pub mod checksum;
pub mod config;
pub mod fetch;
pub mod logging;
pub mod manifest;
pub mod mirror;
pub mod retry;
