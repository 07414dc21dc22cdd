//! Gesture recognizers.
//!
//! A recognizer is a small state machine that classifies the sample stream
//! as one gesture. The [`GestureManager`](crate::GestureManager) drives every
//! registered recognizer with the same samples, arbitrates between them and
//! delivers what they emit.
//!
//! Continuous gestures (pan, swipe, pinch, rotate) share the began/changed/
//! ended ladder in [`continuous`]. Discrete gestures (tap, press) run their
//! own logic around an owned [`GestureTimer`](horizon_gestures_core::GestureTimer).
//!
//! # Writing a recognizer
//!
//! Implement [`Recognizer::process`] and [`Recognizer::emit`], keep the shared
//! fields in a [`RecognizerBase`], and let the provided
//! [`Recognizer::recognize`] handle terminal-state bookkeeping.

use std::fmt;
use std::time::Duration;

use slotmap::new_key_type;

use horizon_gestures_core::logging::targets;

use crate::event::{GestureEvent, GestureKind};
use crate::input::{EventType, InputSample};
use crate::state::GestureState;
use crate::touch_action::TouchActions;

pub mod continuous;
mod pan;
mod pinch;
mod press;
mod rotate;
mod swipe;
mod tap;

pub use pan::{DEFAULT_PAN_THRESHOLD, PanRecognizer};
pub use pinch::PinchRecognizer;
pub use press::{DEFAULT_PRESS_HOLD_TIME_MS, DEFAULT_PRESS_THRESHOLD, PressRecognizer};
pub use rotate::RotateRecognizer;
pub use swipe::{DEFAULT_SWIPE_THRESHOLD, DEFAULT_SWIPE_VELOCITY, SwipeRecognizer};
pub use tap::{
    DEFAULT_TAP_HOLD_TIME_MS, DEFAULT_TAP_INTERVAL_MS, DEFAULT_TAP_POSITION_THRESHOLD,
    DEFAULT_TAP_THRESHOLD, TapRecognizer,
};

new_key_type! {
    /// Identifies a recognizer registered with a manager.
    pub struct RecognizerId;
}

/// What the manager tells a recognizer about its surroundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecognizerContext {
    /// The recognizer waits for at least one other recognizer to fail.
    pub has_require_failures: bool,
}

/// Fields every recognizer carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizerBase {
    name: String,
    state: GestureState,
    enabled: bool,
}

impl RecognizerBase {
    /// Create an enabled base in the Possible state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: GestureState::Possible,
            enabled: true,
        }
    }
}

/// A gesture state machine.
pub trait Recognizer: fmt::Debug + Send {
    /// Shared fields.
    fn base(&self) -> &RecognizerBase;

    /// Shared fields, mutably.
    fn base_mut(&mut self) -> &mut RecognizerBase;

    /// The gesture family.
    fn kind(&self) -> GestureKind;

    /// Compute the next state from a sample.
    ///
    /// Only the recognizer's own fields may change. The manager stores the
    /// returned state.
    fn process(&mut self, sample: &InputSample, ctx: &RecognizerContext) -> GestureState;

    /// Build the outbound event for the current state.
    ///
    /// Returns `None` when the current state has nothing to announce.
    fn emit(&self) -> Option<GestureEvent>;

    /// Native touch behavior this recognizer can coexist with.
    fn touch_action(&self) -> TouchActions;

    /// Fire the owned timer if it is due, returning the new state.
    fn poll_timer(&mut self, now: Duration, ctx: &RecognizerContext) -> Option<GestureState> {
        let _ = (now, ctx);
        None
    }

    /// Deadline of the owned timer, if armed.
    fn next_deadline(&self) -> Option<Duration> {
        None
    }

    /// Cancel the owned timer and forget per-attempt data.
    fn reset(&mut self) {}

    /// The recognizer's unique name, also its base topic.
    fn name(&self) -> &str {
        &self.base().name
    }

    /// Current state.
    fn state(&self) -> GestureState {
        self.base().state
    }

    /// Overwrite the state. Used by the manager to force outcomes.
    fn set_state(&mut self, state: GestureState) {
        let base = self.base_mut();
        if base.state != state {
            tracing::trace!(
                target: targets::RECOGNIZER,
                recognizer = %base.name,
                from = %base.state,
                to = %state,
                "state transition"
            );
            base.state = state;
        }
    }

    /// Whether the recognizer takes part in recognition.
    fn is_enabled(&self) -> bool {
        self.base().enabled
    }

    /// Enable or disable the recognizer.
    fn set_enabled(&mut self, enabled: bool) {
        self.base_mut().enabled = enabled;
    }

    /// Whether the owned timer is armed.
    fn has_pending_timer(&self) -> bool {
        self.next_deadline().is_some()
    }

    /// Feed a sample through the state machine.
    ///
    /// A terminal recognizer ignores everything but START, which resets it to
    /// Possible first. Returns `None` when the sample was ignored.
    fn recognize(&mut self, sample: &InputSample, ctx: &RecognizerContext) -> Option<GestureState> {
        if self.state().is_terminal() {
            if sample.event_type != EventType::Start {
                return None;
            }
            self.reset();
            self.set_state(GestureState::Possible);
        }
        let next = self.process(sample, ctx);
        self.set_state(next);
        Some(next)
    }
}
