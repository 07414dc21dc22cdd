//! Two-pointer pinch recognition.

use crate::event::{GestureEvent, GestureKind, PinchDirection};
use crate::input::InputSample;
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::continuous::ContinuousCore;
use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Recognizes two pointers moving toward or away from each other.
///
/// Begins once the scale departs from 1 by more than the threshold. Each
/// event carries an in/out qualifier unless the scale is exactly 1.
#[derive(Debug, Clone)]
pub struct PinchRecognizer {
    core: ContinuousCore,
    threshold: f32,
}

impl Default for PinchRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PinchRecognizer {
    /// Create a two-pointer pinch with a zero threshold.
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(GestureKind::Pinch.as_str(), 2),
            threshold: 0.0,
        }
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.base = RecognizerBase::new(name);
        self
    }

    /// Set the minimum scale departure from 1.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Recognizer for PinchRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.core.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Pinch
    }

    fn process(&mut self, sample: &InputSample, _ctx: &RecognizerContext) -> GestureState {
        let refined = self.core.began() || (sample.scale - 1.0).abs() > self.threshold;
        self.core.step(sample, refined)
    }

    fn emit(&self) -> Option<GestureEvent> {
        let mut event = self.core.event(GestureKind::Pinch)?;
        event.pinch_direction = PinchDirection::from_scale(event.scale);
        Some(event)
    }

    fn touch_action(&self) -> TouchActions {
        TouchActions::NONE
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
