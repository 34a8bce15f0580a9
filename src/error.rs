//! Error types used by stages, streams and the runtime.
//!
//! - [`StageError`]: a transform failed for one item (payload-level failure).
//! - [`StreamError`]: a racing send/receive did not complete.
//! - [`RuntimeError`]: errors raised by the [`Runtime`](crate::Runtime) itself.
//!
//! Cancellation is never a panic: it surfaces as [`StreamError::Cancelled`] or
//! [`StageError::Canceled`] and every stage handles it as a normal exit path.
//! All enums provide `as_label` / `as_message` helpers for logs and metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the stagevisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some stewards did not reach `Stopped`.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Names of stewards that did not stop in time.
        stuck: Vec<String>,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagevisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck stewards={stuck:?}")
            }
        }
    }
}

/// # Errors produced by a stage transform.
///
/// What a stage does with the error is decided by its
/// [`FailurePolicy`](crate::FailurePolicy), never silently.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The transform failed for this item; later items may still succeed.
    #[error("item failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Non-recoverable failure; the stage should stop producing.
    #[error("fatal error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },

    /// The stage observed its cancellation signal.
    #[error("stage cancelled")]
    Canceled,
}

impl StageError {
    /// Shorthand for [`StageError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        StageError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`StageError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        StageError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use stagevisor::StageError;
    ///
    /// assert_eq!(StageError::fail("bad input").as_label(), "stage_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            StageError::Fail { .. } => "stage_failed",
            StageError::Fatal { .. } => "stage_fatal",
            StageError::Canceled => "stage_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            StageError::Fail { error } => format!("error: {error}"),
            StageError::Fatal { error } => format!("fatal: {error}"),
            StageError::Canceled => "stage cancelled".to_string(),
        }
    }

    /// Indicates whether skipping the item and continuing is safe.
    ///
    /// Returns `true` only for [`StageError::Fail`].
    ///
    /// # Example
    /// ```
    /// use stagevisor::StageError;
    ///
    /// assert!(StageError::fail("boom").is_retryable());
    /// assert!(!StageError::fatal("nope").is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, StageError::Fail { .. })
    }
}

/// # Outcome of a send or receive that lost its race.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamError {
    /// The cancellation signal fired before the operation completed.
    #[error("cancelled")]
    Cancelled,

    /// The other half of the stream is gone (receiver dropped on send).
    #[error("stream disconnected")]
    Disconnected,
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Cancelled => "stream_cancelled",
            StreamError::Disconnected => "stream_disconnected",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_error_labels_are_stable() {
        assert_eq!(StageError::fail("x").as_label(), "stage_failed");
        assert_eq!(StageError::fatal("x").as_label(), "stage_fatal");
        assert_eq!(StageError::Canceled.as_label(), "stage_canceled");
        assert_eq!(StreamError::Cancelled.as_label(), "stream_cancelled");
    }

    #[test]
    fn only_fail_is_retryable() {
        assert!(StageError::fail("x").is_retryable());
        assert!(!StageError::fatal("x").is_retryable());
        assert!(!StageError::Canceled.is_retryable());
    }

    #[test]
    fn grace_exceeded_message_lists_stuck() {
        let err = RuntimeError::GraceExceeded {
            grace: Duration::from_secs(1),
            stuck: vec!["ingest".into()],
        };
        assert!(err.as_message().contains("ingest"));
        assert!(err.to_string().contains("1s"));
    }
}
