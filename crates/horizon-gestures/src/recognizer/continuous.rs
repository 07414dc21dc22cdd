//! Shared machinery for continuous gestures.
//!
//! Pan, swipe, pinch and rotate all follow the same ladder: a pointer-count
//! gate, a recognizer-specific attribute test, and the
//! Possible → Began → Changed* → Recognized progression.

use crate::event::{GestureEvent, GestureKind, GesturePhase};
use crate::input::{EventType, InputSample};
use crate::state::GestureState;

use super::RecognizerBase;

/// Whether the sample has the pointer count a recognizer expects.
///
/// START and MOVE need exactly `pointers`; END needs one fewer (the pointer
/// that just lifted is gone); CANCEL always passes.
pub fn pointer_gate(pointers: usize, sample: &InputSample) -> bool {
    match sample.event_type {
        EventType::Start | EventType::Move => sample.touches_length == pointers,
        EventType::End => sample.touches_length + 1 == pointers,
        EventType::Cancel => true,
    }
}

/// Advance the continuous ladder.
///
/// `gate` is the pointer-gate result and `valid` the full attribute test
/// (gate and refinement). A recognizer that passes the gate but has not met
/// its threshold yet stays Possible, so it can still begin later in the same
/// attempt.
pub fn ladder(state: GestureState, event_type: EventType, gate: bool, valid: bool) -> GestureState {
    let began = state.is_active();
    let cancel = event_type == EventType::Cancel;

    if began && (cancel || !valid) {
        GestureState::Cancelled
    } else if began || valid {
        match event_type {
            EventType::End => GestureState::Recognized,
            // Valid but cancelled before it began: never reported.
            EventType::Cancel => GestureState::Failed,
            _ if !began => GestureState::Began,
            _ => GestureState::Changed,
        }
    } else if !gate || event_type.is_final() {
        GestureState::Failed
    } else {
        GestureState::Possible
    }
}

/// State shared by every continuous recognizer.
#[derive(Debug, Clone)]
pub struct ContinuousCore {
    /// Name, state and enabled flag.
    pub base: RecognizerBase,
    /// Required pointer count.
    pub pointers: usize,
    /// The last sample that was processed.
    pub last: Option<InputSample>,
}

impl ContinuousCore {
    /// Create a core for `pointers` pointers.
    pub fn new(name: impl Into<String>, pointers: usize) -> Self {
        Self {
            base: RecognizerBase::new(name),
            pointers,
            last: None,
        }
    }

    /// Run the gate and ladder for one sample.
    ///
    /// `refined` is the recognizer-specific test result; it only counts when
    /// the pointer gate passes.
    pub fn step(&mut self, sample: &InputSample, refined: bool) -> GestureState {
        let gate = pointer_gate(self.pointers, sample);
        self.last = Some(*sample);
        ladder(self.base.state, sample.event_type, gate, gate && refined)
    }

    /// Whether the gesture has begun.
    pub fn began(&self) -> bool {
        self.base.state.is_active()
    }

    /// Build an event for the current state from the last sample.
    pub fn event(&self, kind: GestureKind) -> Option<GestureEvent> {
        let phase = GesturePhase::from_state(self.base.state)?;
        let sample = self.last.as_ref()?;
        Some(GestureEvent::from_sample(&self.base.name, kind, phase, sample))
    }

    /// Forget per-attempt data.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::time::Duration;
    use GestureState::*;

    fn sample(event_type: EventType, touches: usize) -> InputSample {
        InputSample::new(event_type, touches, Vec2::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_pointer_gate() {
        assert!(pointer_gate(1, &sample(EventType::Start, 1)));
        assert!(!pointer_gate(1, &sample(EventType::Move, 2)));
        assert!(pointer_gate(2, &sample(EventType::End, 1)));
        assert!(!pointer_gate(1, &sample(EventType::End, 1)));
        assert!(pointer_gate(2, &sample(EventType::Cancel, 0)));
    }

    #[test]
    fn test_ladder_progression() {
        assert_eq!(ladder(Possible, EventType::Move, true, true), Began);
        assert_eq!(ladder(Began, EventType::Move, true, true), Changed);
        assert_eq!(ladder(Changed, EventType::Move, true, true), Changed);
        assert_eq!(ladder(Changed, EventType::End, true, true), Recognized);
    }

    #[test]
    fn test_ladder_cancels_after_began() {
        assert_eq!(ladder(Began, EventType::Cancel, true, true), Cancelled);
        assert_eq!(ladder(Changed, EventType::Move, false, false), Cancelled);
    }

    #[test]
    fn test_ladder_below_threshold_stays_possible() {
        assert_eq!(ladder(Possible, EventType::Start, true, false), Possible);
        assert_eq!(ladder(Possible, EventType::Move, true, false), Possible);
    }

    #[test]
    fn test_ladder_fails_before_began() {
        assert_eq!(ladder(Possible, EventType::Move, false, false), Failed);
        assert_eq!(ladder(Possible, EventType::End, true, false), Failed);
        assert_eq!(ladder(Possible, EventType::Cancel, true, false), Failed);
        assert_eq!(ladder(Possible, EventType::Cancel, true, true), Failed);
    }

    #[test]
    fn test_ladder_end_valid_recognizes_without_began() {
        assert_eq!(ladder(Possible, EventType::End, true, true), Recognized);
    }
}
