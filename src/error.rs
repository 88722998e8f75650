//! Error types used by callbacks and the registry runtime.
//!
//! The registry itself never fails: `invoke`, `remove` and the cancel
//! operations swallow callback failures after reporting them, so the only
//! error type in the crate is [`CallbackError`], the failure a callback
//! signals from its `react` or `cancel` method.
//!
//! A failure never propagates to sibling callbacks or to the caller of
//! `invoke`; it is logged with the callback's identity and the callback is
//! removed from the registry.

use thiserror::Error;

/// # Failure signalled by a callback.
///
/// Returned from [`Callback::react`](crate::Callback::react) or
/// [`Callback::cancel`](crate::Callback::cancel). A failing reaction is
/// logged, the callback's `cancel` is invoked as best-effort cleanup, and the
/// callback is removed from the registry. A failing cancellation is logged
/// and swallowed.
///
/// [`CallbackError::Panicked`] is synthesized by the dispatcher when a
/// callback panics instead of returning an error, so both paths share one
/// reporting shape.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CallbackError {
    /// The callback could not process the delivery.
    #[error("callback failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The callback panicked; the panic was caught by the dispatcher.
    #[error("callback panicked during execution")]
    Panicked,
}

impl CallbackError {
    /// Builds a [`CallbackError::Failed`] from any displayable message.
    ///
    /// # Example
    /// ```
    /// use relay::CallbackError;
    ///
    /// let err = CallbackError::failed("connection reset");
    /// assert_eq!(err.as_label(), "callback_failed");
    /// ```
    pub fn failed(error: impl Into<String>) -> Self {
        CallbackError::Failed {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallbackError::Failed { .. } => "callback_failed",
            CallbackError::Panicked => "callback_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            CallbackError::Failed { error } => format!("failed: {error}"),
            CallbackError::Panicked => "panicked during execution".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_label_and_message() {
        let err = CallbackError::failed("boom");
        assert_eq!(err.as_label(), "callback_failed");
        assert_eq!(err.as_message(), "failed: boom");
        assert_eq!(err.to_string(), "callback failed: boom");
    }

    #[test]
    fn test_panicked_label() {
        let err = CallbackError::Panicked;
        assert_eq!(err.as_label(), "callback_panicked");
        assert_eq!(err.to_string(), "callback panicked during execution");
    }
}
