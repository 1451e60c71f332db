//! Per-attempt fetch error, typed so the retry policy can classify it
//! before the outcome is flattened for the coordinator.

use crate::retry::{classify_curl_error, ErrorKind};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// URL does not start with an accepted scheme. Checked before any
    /// network call; aborts the task without consuming an attempt.
    #[error("invalid URL {0:?}: expected http:// or https://")]
    InvalidUrl(String),

    /// Response status was not 200.
    #[error("HTTP {0}")]
    HttpStatus(u32),

    /// Body was persisted but the file on disk came back zero bytes.
    #[error("empty file after download: {}", .0.display())]
    EmptyFile(PathBuf),

    /// Transport failure (timeout, connection refused/reset, DNS, ...).
    #[error(transparent)]
    Curl(#[from] curl::Error),

    /// Local filesystem failure while persisting the body.
    #[error("write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },

    /// Catch-all for anything else mid-attempt (e.g. hashing the result).
    #[error("{0}")]
    Unexpected(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            FetchError::HttpStatus(_) => ErrorKind::HttpStatus,
            FetchError::EmptyFile(_) => ErrorKind::EmptyFile,
            FetchError::Curl(e) => classify_curl_error(e),
            FetchError::Io { .. } | FetchError::Unexpected(_) => ErrorKind::Other,
        }
    }
}
