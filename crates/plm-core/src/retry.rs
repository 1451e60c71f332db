//! Retry policy and error classification.
//!
//! Attempts against a playlist host are immediate (no backoff): the catalog
//! is a handful of slow-changing endpoints fetched a handful of times per
//! run, so the policy only has to decide *whether* to try again, not when.

use std::time::Duration;

/// High-level classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// URL rejected before any network call. Never retried.
    InvalidUrl,
    /// Request timed out (connect or transfer).
    Timeout,
    /// Network-level failure (connection refused/reset, DNS, etc.).
    Connection,
    /// Response arrived but with a non-200 status.
    HttpStatus,
    /// Body was written but the file on disk is zero bytes.
    EmptyFile,
    /// Anything else (unexpected curl or IO failure mid-attempt).
    Other,
}

/// Per-task retry policy: how many attempts, and which failures are worth one.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    /// Whether another attempt should follow a failure of `kind` on the given
    /// 1-based `attempt`. Invalid URLs are task-fatal; everything else is
    /// transient until the attempt budget runs out.
    pub fn should_retry(&self, attempt: u32, kind: ErrorKind) -> bool {
        if kind == ErrorKind::InvalidUrl {
            return false;
        }
        attempt < self.max_attempts
    }

    /// Delay before the next attempt. Always zero today; kept on the policy
    /// so a backoff schedule has an obvious seat if the catalog grows.
    pub fn delay_before_retry(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

/// Classify a curl error for retry decisions and log wording.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_never_retried() {
        let p = RetryPolicy { max_attempts: 10 };
        assert!(!p.should_retry(1, ErrorKind::InvalidUrl));
    }

    #[test]
    fn transient_kinds_retried_until_budget() {
        let p = RetryPolicy { max_attempts: 3 };
        for kind in [
            ErrorKind::Timeout,
            ErrorKind::Connection,
            ErrorKind::HttpStatus,
            ErrorKind::EmptyFile,
            ErrorKind::Other,
        ] {
            assert!(p.should_retry(1, kind));
            assert!(p.should_retry(2, kind));
            assert!(!p.should_retry(3, kind));
        }
    }

    #[test]
    fn retry_is_immediate() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_before_retry(1), Duration::ZERO);
        assert_eq!(p.delay_before_retry(2), Duration::ZERO);
    }
}
