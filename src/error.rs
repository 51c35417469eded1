//! Error types used by the notifier.
//!
//! - [`WaitError`]: a wait ended without the resource reaching a target state.
//!
//! Publishing has no error type of its own: `try_publish_update` returns the
//! caller's transform error unchanged.

use thiserror::Error;

/// # Errors produced by waits.
///
/// Cancellation is the only way a wait ends without a result. It is an
/// expected outcome (shutdown, caller gave up), not a defect. Timeouts are
/// modelled by the caller cancelling its own token.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    /// The caller's token or the shutdown signal fired before a target state was reached.
    #[error("wait for resource '{resource}' was cancelled")]
    Canceled {
        /// Resource name the wait was registered for.
        resource: String,
    },
}

impl WaitError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use statevisor::WaitError;
    ///
    /// let err = WaitError::Canceled { resource: "db".into() };
    /// assert_eq!(err.as_label(), "wait_canceled");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            WaitError::Canceled { .. } => "wait_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            WaitError::Canceled { resource } => format!("canceled: resource={resource}"),
        }
    }

    /// True if the wait ended because of cancellation.
    pub fn is_canceled(&self) -> bool {
        matches!(self, WaitError::Canceled { .. })
    }
}
