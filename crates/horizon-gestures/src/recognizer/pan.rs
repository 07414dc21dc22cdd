//! Pan (drag) recognition.

use crate::event::{GestureEvent, GestureKind};
use crate::input::{Direction, InputSample};
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::continuous::ContinuousCore;
use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Default minimum travel before a pan begins.
pub const DEFAULT_PAN_THRESHOLD: f32 = 10.0;

/// Recognizes a pointer dragging across the surface.
///
/// Begins once the center has travelled more than the threshold in an
/// allowed direction, then reports every move until the pointers lift.
///
/// When only some directions are allowed, diagonal motion is locked to the
/// allowed axis: distance and direction are taken from that axis alone.
#[derive(Debug, Clone)]
pub struct PanRecognizer {
    core: ContinuousCore,
    direction: Direction,
    threshold: f32,
}

impl Default for PanRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PanRecognizer {
    /// Create a one-pointer pan in all directions.
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(GestureKind::Pan.as_str(), 1),
            direction: Direction::ALL,
            threshold: DEFAULT_PAN_THRESHOLD,
        }
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.base = RecognizerBase::new(name);
        self
    }

    /// Set the required pointer count.
    pub fn with_pointers(mut self, pointers: usize) -> Self {
        self.core.pointers = pointers;
        self
    }

    /// Set the minimum travel.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the allowed directions.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// The allowed directions.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The minimum travel.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    fn direction_test(&self, sample: &InputSample) -> bool {
        let mut direction = sample.direction;
        let mut distance = sample.distance;
        let mut has_moved = true;
        let movement = sample.movement;
        // Axis components are compared against the previous sample.
        let previous = self.core.last.map(|last| last.movement);

        if !direction.intersects(self.direction) {
            if self.direction.intersects(Direction::HORIZONTAL) {
                direction = Direction::horizontal_sign(movement.x);
                has_moved = previous.is_none_or(|p| p.x != movement.x);
                distance = movement.x.abs();
            } else {
                direction = Direction::vertical_sign(movement.y);
                has_moved = previous.is_none_or(|p| p.y != movement.y);
                distance = movement.y.abs();
            }
        }

        has_moved && distance > self.threshold && direction.intersects(self.direction)
    }
}

impl Recognizer for PanRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.core.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Pan
    }

    fn process(&mut self, sample: &InputSample, _ctx: &RecognizerContext) -> GestureState {
        let refined = self.core.began() || self.direction_test(sample);
        self.core.step(sample, refined)
    }

    fn emit(&self) -> Option<GestureEvent> {
        self.core.event(GestureKind::Pan)
    }

    fn touch_action(&self) -> TouchActions {
        let mut actions = TouchActions::EMPTY;
        if self.direction.intersects(Direction::HORIZONTAL) {
            actions |= TouchActions::PAN_Y;
        }
        if self.direction.intersects(Direction::VERTICAL) {
            actions |= TouchActions::PAN_X;
        }
        actions
    }

    fn reset(&mut self) {
        self.core.reset();
    }
}
