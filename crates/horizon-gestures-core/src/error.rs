//! Error types for Horizon Gestures.
//!
//! Recognition itself never fails: a sample that does not fit a gesture moves
//! the recognizer to a terminal state. Errors are reserved for malformed input
//! reaching the engine and for misuse of the manager's API.

use thiserror::Error;

/// Errors produced by the gesture engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    /// An input event code outside START, MOVE, END and CANCEL.
    #[error("unknown input event type code {0}")]
    UnknownEventType(u8),

    /// A sample carried non-finite numeric data.
    #[error("invalid input sample: {field} is {value}")]
    InvalidSample {
        /// Name of the offending sample field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The recognizer id is stale or was never registered with this manager.
    #[error("unknown or removed recognizer")]
    UnknownRecognizer,

    /// A relation was requested between a recognizer and itself.
    #[error("a recognizer cannot be related to itself")]
    SelfDependency,

    /// Recognizer relations were edited while a gesture attempt was running.
    #[error("recognizer relations cannot change while a gesture is in flight")]
    GestureInFlight,

    /// Configuration could not be parsed or failed validation.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GestureError {
    /// Create an invalid-sample error for a named field.
    pub fn invalid_sample(field: &'static str, value: f32) -> Self {
        Self::InvalidSample { field, value }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

/// Result type alias for gesture operations.
pub type Result<T> = std::result::Result<T, GestureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GestureError::UnknownEventType(3).to_string(),
            "unknown input event type code 3"
        );
        let err = GestureError::invalid_sample("scale", f32::NAN);
        assert!(err.to_string().starts_with("invalid input sample: scale is"));
        assert_eq!(
            GestureError::config("taps must be at least 1").to_string(),
            "configuration error: taps must be at least 1"
        );
    }

    #[test]
    fn test_errors_are_comparable() {
        assert_eq!(GestureError::SelfDependency, GestureError::SelfDependency);
        assert_ne!(
            GestureError::UnknownRecognizer,
            GestureError::GestureInFlight
        );
    }
}
