//! Fetcher: validated, retried, timed-out HTTP GET persisted to disk.
//!
//! Each attempt buffers the full response body (playlist and EPG files are
//! small) and only touches the destination on a 200, so a failed attempt
//! never leaves a partial or error-page file behind.

mod error;

pub use error::FetchError;

use crate::checksum;
use crate::manifest::FetchTask;
use crate::retry::{ErrorKind, RetryPolicy};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Request knobs shared by every attempt of every task.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Whole-request timeout (connect + transfer).
    pub timeout: Duration,
    /// Static User-Agent; some playlist hosts reject curl's default.
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

/// Terminal result of one task after all attempts.
#[derive(Debug)]
pub struct FetchOutcome {
    pub success: bool,
    /// 0 on failure.
    pub bytes_written: u64,
    /// Informational digest of the written file; only set on success.
    pub sha256: Option<String>,
    /// Attempts actually consumed. 0 when the URL was rejected up front.
    pub attempts: u32,
    /// Last error observed; only set on failure.
    pub error: Option<FetchError>,
}

impl FetchOutcome {
    fn success(bytes_written: u64, sha256: String, attempts: u32) -> Self {
        Self {
            success: true,
            bytes_written,
            sha256: Some(sha256),
            attempts,
            error: None,
        }
    }

    fn failure(attempts: u32, error: FetchError) -> Self {
        Self {
            success: false,
            bytes_written: 0,
            sha256: None,
            attempts,
            error: Some(error),
        }
    }
}

/// Accepted scheme prefixes. Anything else fails without a network call.
pub fn validate_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// One GET attempt: returns the body on a 200, a typed error otherwise.
fn perform_get(url: &str, opts: &FetchOptions) -> Result<Vec<u8>, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.timeout(opts.timeout)?;
    easy.useragent(&opts.user_agent)?;

    let mut body = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if code != 200 {
        return Err(FetchError::HttpStatus(code));
    }
    Ok(body)
}

/// Write the body to `dest` (creating parent dirs), then read the size back
/// and hash the file. A zero-byte result counts as a failed attempt and the
/// empty file is removed so a fully failed task leaves nothing on disk.
fn persist_body(body: &[u8], dest: &Path) -> Result<(u64, String), FetchError> {
    let io_err = |source| FetchError::Io {
        path: dest.to_path_buf(),
        source,
    };
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(dest, body).map_err(io_err)?;

    let size = fs::metadata(dest).map_err(io_err)?.len();
    if size == 0 {
        let _ = fs::remove_file(dest);
        return Err(FetchError::EmptyFile(dest.to_path_buf()));
    }

    let digest = checksum::sha256_path(dest).map_err(|e| FetchError::Unexpected(e.to_string()))?;
    Ok((size, digest))
}

fn fetch_once(url: &str, dest: &Path, opts: &FetchOptions) -> Result<(u64, String), FetchError> {
    let body = perform_get(url, opts)?;
    persist_body(&body, dest)
}

/// Fetch one task, retrying per `policy`. Never panics and never returns an
/// error: every failure mode is folded into the outcome so one bad task
/// cannot take the coordinator down.
pub fn fetch_with_retry(
    task: &FetchTask,
    policy: &RetryPolicy,
    opts: &FetchOptions,
) -> FetchOutcome {
    if !validate_url(&task.url) {
        tracing::error!(url = %task.url, "invalid URL, skipping");
        return FetchOutcome::failure(0, FetchError::InvalidUrl(task.url.clone()));
    }

    let mut attempt = 1u32;
    loop {
        tracing::info!(
            url = %task.url,
            attempt,
            max_attempts = policy.max_attempts,
            "fetching"
        );
        match fetch_once(&task.url, &task.dest, opts) {
            Ok((bytes, digest)) => {
                tracing::info!(
                    file = %task.dest.display(),
                    bytes,
                    sha256 = %digest,
                    attempt,
                    "downloaded"
                );
                return FetchOutcome::success(bytes, digest, attempt);
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(url = %task.url, attempt, %e, "attempt failed");
                if policy.should_retry(attempt, kind) {
                    let delay = policy.delay_before_retry(attempt);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                } else {
                    tracing::error!(url = %task.url, attempts = attempt, %e, "giving up");
                    return FetchOutcome::failure(attempt, e);
                }
            }
        }
    }
}

/// Convenience wrapper: fetch a single URL to a destination path outside of
/// any manifest (destination's file name doubles as the task name).
pub fn fetch_url(
    url: &str,
    dest: PathBuf,
    policy: &RetryPolicy,
    opts: &FetchOptions,
) -> FetchOutcome {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let task = FetchTask {
        category: String::new(),
        file_name,
        url: url.to_string(),
        dest,
    };
    fetch_with_retry(&task, policy, opts)
}
