mod checksum;
mod run;
mod validate;

pub use checksum::run_checksum;
pub use run::run_mirror;
pub use validate::run_validate;
