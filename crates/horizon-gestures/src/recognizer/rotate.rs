//! Two-pointer rotation recognition.

use crate::event::{GestureEvent, GestureKind};
use crate::input::InputSample;
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::continuous::ContinuousCore;
use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Recognizes two pointers turning around their center.
#[derive(Debug, Clone)]
pub struct RotateRecognizer {
    core: ContinuousCore,
    threshold: f32,
}

impl Default for RotateRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RotateRecognizer {
    /// Create a two-pointer rotation with a zero threshold.
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(GestureKind::Rotate.as_str(), 2),
            threshold: 0.0,
        }
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.base = RecognizerBase::new(name);
        self
    }

    /// Set the minimum rotation in degrees.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }
}

impl Recognizer for RotateRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.core.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Rotate
    }

    fn process(&mut self, sample: &InputSample, _ctx: &RecognizerContext) -> GestureState {
        let refined = self.core.began() || sample.rotation.abs() > self.threshold;
        self.core.step(sample, refined)
    }

    fn emit(&self) -> Option<GestureEvent> {
        self.core.event(GestureKind::Rotate)
    }

    fn touch_action(&self) -> TouchActions {
        TouchActions::NONE
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
