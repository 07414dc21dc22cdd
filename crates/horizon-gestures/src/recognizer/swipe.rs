//! Swipe (flick) recognition.

use crate::event::{GestureEvent, GestureKind, SwipeDirection};
use crate::input::{Direction, EventType, InputSample};
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::continuous::ContinuousCore;
use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Default minimum displacement for a swipe.
pub const DEFAULT_SWIPE_THRESHOLD: f32 = 10.0;

/// Default minimum speed for a swipe, in units per millisecond.
pub const DEFAULT_SWIPE_VELOCITY: f32 = 0.65;

/// Recognizes a fast flick in an allowed direction.
///
/// A swipe is decided only when the pointer lifts: the release must be far
/// enough from the start, fast enough, and headed in an allowed direction.
#[derive(Debug, Clone)]
pub struct SwipeRecognizer {
    core: ContinuousCore,
    direction: Direction,
    threshold: f32,
    velocity: f32,
}

impl Default for SwipeRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SwipeRecognizer {
    /// Create a one-pointer swipe in all directions.
    pub fn new() -> Self {
        Self {
            core: ContinuousCore::new(GestureKind::Swipe.as_str(), 1),
            direction: Direction::HORIZONTAL | Direction::VERTICAL,
            threshold: DEFAULT_SWIPE_THRESHOLD,
            velocity: DEFAULT_SWIPE_VELOCITY,
        }
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.core.base = RecognizerBase::new(name);
        self
    }

    /// Set the minimum displacement.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the minimum speed in units per millisecond.
    pub fn with_velocity(mut self, velocity: f32) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the allowed directions.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Speed along the allowed axes.
    fn speed(&self, sample: &InputSample) -> f32 {
        let horizontal = self.direction.intersects(Direction::HORIZONTAL);
        let vertical = self.direction.intersects(Direction::VERTICAL);
        match (horizontal, vertical) {
            (true, true) => sample.velocity.length(),
            (true, false) => sample.velocity.x.abs(),
            (false, true) => sample.velocity.y.abs(),
            (false, false) => 0.0,
        }
    }

    fn attribute_test(&self, sample: &InputSample) -> bool {
        sample.event_type == EventType::End
            && sample.direction.intersects(self.direction)
            && sample.distance > self.threshold
            && self.speed(sample) > self.velocity
    }
}

impl Recognizer for SwipeRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.core.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.core.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Swipe
    }

    fn process(&mut self, sample: &InputSample, _ctx: &RecognizerContext) -> GestureState {
        let refined = self.attribute_test(sample);
        self.core.step(sample, refined)
    }

    fn emit(&self) -> Option<GestureEvent> {
        let mut event = self.core.event(GestureKind::Swipe)?;
        event.swipe_direction = SwipeDirection::from_movement(event.movement);
        Some(event)
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

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use std::time::Duration;

    fn release(movement: Vec2, velocity: Vec2) -> InputSample {
        InputSample::new(EventType::End, 0, movement, Duration::from_millis(80))
            .with_movement(movement)
            .with_velocity(velocity)
    }

    #[test]
    fn test_fast_release_recognizes() {
        let mut swipe = SwipeRecognizer::new();
        let ctx = RecognizerContext::default();
        let sample = release(Vec2::new(-60.0, 0.0), Vec2::new(-1.2, 0.0));
        assert_eq!(swipe.recognize(&sample, &ctx), Some(GestureState::Recognized));

        let event = swipe.emit().expect("swipe event");
        assert_eq!(event.swipe_direction, Some(SwipeDirection::Left));
        assert!(event.topics().contains(&"swipeleft".to_string()));
    }

    #[test]
    fn test_slow_release_fails() {
        let mut swipe = SwipeRecognizer::new();
        let sample = release(Vec2::new(-60.0, 0.0), Vec2::new(-0.3, 0.0));
        assert_eq!(
            swipe.recognize(&sample, &RecognizerContext::default()),
            Some(GestureState::Failed)
        );
    }

    #[test]
    fn test_moves_never_begin_a_swipe() {
        let mut swipe = SwipeRecognizer::new();
        let sample = InputSample::new(EventType::Move, 1, Vec2::ZERO, Duration::ZERO)
            .with_movement(Vec2::new(80.0, 0.0))
            .with_velocity(Vec2::new(3.0, 0.0));
        assert_eq!(
            swipe.recognize(&sample, &RecognizerContext::default()),
            Some(GestureState::Possible)
        );
    }

    #[test]
    fn test_axis_restricted_speed() {
        let swipe = SwipeRecognizer::new().with_direction(Direction::VERTICAL);
        let sample = release(Vec2::new(0.0, 40.0), Vec2::new(5.0, 0.5));
        assert_eq!(swipe.speed(&sample), 0.5);
        assert!(!swipe.attribute_test(&sample));
    }
}
