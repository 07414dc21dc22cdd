//! Recognizer states.

use std::fmt;

/// Where a recognizer is in its current attempt.
///
/// ```text
/// Possible ──> Began ──> Changed* ──> Recognized
///    │           └──────────┴───────> Cancelled
///    ├──────────────────────────────> Recognized   (discrete gestures)
///    └──────────────────────────────> Failed
/// ```
///
/// Recognized, Cancelled and Failed are terminal: the recognizer ignores
/// further samples until the next START resets it to Possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GestureState {
    /// Waiting for input that matches the gesture.
    #[default]
    Possible,
    /// A continuous gesture started.
    Began,
    /// A continuous gesture updated.
    Changed,
    /// The gesture completed. Also known as Ended.
    Recognized,
    /// A gesture that had begun was aborted.
    Cancelled,
    /// The input does not match the gesture.
    Failed,
}

impl GestureState {
    /// Alias for [`GestureState::Recognized`].
    pub const ENDED: GestureState = GestureState::Recognized;

    /// Recognized, Cancelled or Failed.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Recognized | Self::Cancelled | Self::Failed)
    }

    /// Began or Changed: a continuous gesture is in progress.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Began | Self::Changed)
    }

    /// States whose entry may produce an outbound event.
    pub const fn is_emittable(self) -> bool {
        matches!(self, Self::Began | Self::Changed | Self::Recognized)
    }

    /// Failed or Cancelled.
    pub const fn is_unsuccessful(self) -> bool {
        matches!(self, Self::Failed | Self::Cancelled)
    }

    /// Lowercase name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Possible => "possible",
            Self::Began => "began",
            Self::Changed => "changed",
            Self::Recognized => "recognized",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classes() {
        use GestureState::*;

        for state in [Recognized, Cancelled, Failed] {
            assert!(state.is_terminal());
            assert!(!state.is_active());
        }
        for state in [Possible, Began, Changed] {
            assert!(!state.is_terminal());
        }
        assert!(Began.is_active() && Changed.is_active());
        assert!(Recognized.is_emittable() && !Possible.is_emittable());
        assert!(Failed.is_unsuccessful() && !Recognized.is_unsuccessful());
        assert_eq!(GestureState::ENDED, Recognized);
        assert_eq!(GestureState::default(), Possible);
    }
}
