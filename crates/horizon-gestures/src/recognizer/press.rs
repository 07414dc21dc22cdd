//! Press-and-hold recognition.

use std::time::Duration;

use horizon_gestures_core::GestureTimer;

use crate::event::{GestureEvent, GestureKind, GesturePhase};
use crate::input::{EventType, InputSample};
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Default minimum hold time, in milliseconds.
pub const DEFAULT_PRESS_HOLD_TIME_MS: u64 = 500;

/// Default maximum movement while holding.
pub const DEFAULT_PRESS_THRESHOLD: f32 = 5.0;

/// Recognizes a pointer held still for a minimum time.
///
/// Recognition normally happens when the hold timer fires, while the pointer
/// is still down. A release after the hold time whose timer has not been
/// polled yet is recognized as well.
#[derive(Debug, Clone)]
pub struct PressRecognizer {
    base: RecognizerBase,
    pointers: usize,
    hold_time: Duration,
    threshold: f32,
    started: Duration,
    last: Option<InputSample>,
    timer: GestureTimer<()>,
}

impl Default for PressRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl PressRecognizer {
    /// Create a one-pointer press with default limits.
    pub fn new() -> Self {
        Self {
            base: RecognizerBase::new(GestureKind::Press.as_str()),
            pointers: 1,
            hold_time: Duration::from_millis(DEFAULT_PRESS_HOLD_TIME_MS),
            threshold: DEFAULT_PRESS_THRESHOLD,
            started: Duration::ZERO,
            last: None,
            timer: GestureTimer::new(),
        }
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base = RecognizerBase::new(name);
        self
    }

    /// Set the minimum hold time.
    pub fn with_hold_time(mut self, hold_time: Duration) -> Self {
        self.hold_time = hold_time;
        self
    }

    /// Set the maximum movement.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    fn fail(&mut self) -> GestureState {
        self.timer.stop();
        GestureState::Failed
    }
}

impl Recognizer for PressRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Press
    }

    fn process(&mut self, sample: &InputSample, _ctx: &RecognizerContext) -> GestureState {
        self.last = Some(*sample);

        let valid_pointers = match sample.event_type {
            EventType::End => sample.touches_length + 1 == self.pointers,
            EventType::Cancel => false,
            _ => sample.touches_length == self.pointers,
        };
        if !valid_pointers || sample.distance >= self.threshold {
            return self.fail();
        }

        match sample.event_type {
            EventType::Start => {
                self.started = sample.time_stamp.saturating_sub(sample.delta_time);
                self.timer.start(self.started, self.hold_time, ());
                GestureState::Possible
            }
            EventType::Move => GestureState::Possible,
            EventType::End if sample.delta_time >= self.hold_time => {
                self.timer.stop();
                GestureState::Recognized
            }
            EventType::End | EventType::Cancel => self.fail(),
        }
    }

    fn emit(&self) -> Option<GestureEvent> {
        if self.state() != GestureState::Recognized {
            return None;
        }
        let sample = self.last.as_ref()?;
        Some(GestureEvent::from_sample(self.name(), GestureKind::Press, GesturePhase::End, sample))
    }

    fn touch_action(&self) -> TouchActions {
        TouchActions::AUTO
    }

    fn poll_timer(&mut self, now: Duration, _ctx: &RecognizerContext) -> Option<GestureState> {
        self.timer.take_expired(now)?;
        if self.state() != GestureState::Possible {
            return None;
        }
        // The event reports the moment the hold completed.
        if let Some(last) = self.last.as_mut() {
            last.delta_time = now.saturating_sub(self.started);
            last.time_stamp = now;
        }
        self.set_state(GestureState::Recognized);
        Some(GestureState::Recognized)
    }

    fn next_deadline(&self) -> Option<Duration> {
        self.timer.deadline()
    }

    fn reset(&mut self) {
        self.timer.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn sample(event_type: EventType, touches: usize, at: u64) -> InputSample {
        InputSample::new(event_type, touches, Vec2::new(20.0, 20.0), ms(at)).with_delta_time(ms(at))
    }

    #[test]
    fn test_hold_timer_recognizes() {
        let mut press = PressRecognizer::new();
        let ctx = RecognizerContext::default();

        assert_eq!(press.recognize(&sample(EventType::Start, 1, 0), &ctx), Some(GestureState::Possible));
        assert_eq!(press.next_deadline(), Some(ms(500)));
        assert_eq!(press.poll_timer(ms(499), &ctx), None);
        assert_eq!(press.poll_timer(ms(500), &ctx), Some(GestureState::Recognized));

        let event = press.emit().expect("press event");
        assert_eq!(event.time_stamp, ms(500));
        assert_eq!(event.topics(), vec!["press".to_string()]);
    }

    #[test]
    fn test_early_release_fails() {
        let mut press = PressRecognizer::new();
        let ctx = RecognizerContext::default();
        press.recognize(&sample(EventType::Start, 1, 0), &ctx);
        assert_eq!(press.recognize(&sample(EventType::End, 0, 200), &ctx), Some(GestureState::Failed));
        assert!(!press.has_pending_timer());
    }

    #[test]
    fn test_late_release_recognizes() {
        let mut press = PressRecognizer::new();
        let ctx = RecognizerContext::default();
        press.recognize(&sample(EventType::Start, 1, 0), &ctx);
        assert_eq!(press.recognize(&sample(EventType::End, 0, 650), &ctx), Some(GestureState::Recognized));
    }

    #[test]
    fn test_movement_fails() {
        let mut press = PressRecognizer::new();
        let ctx = RecognizerContext::default();
        press.recognize(&sample(EventType::Start, 1, 0), &ctx);
        let moved = sample(EventType::Move, 1, 100).with_movement(Vec2::new(0.0, 8.0));
        assert_eq!(press.recognize(&moved, &ctx), Some(GestureState::Failed));
        assert_eq!(press.poll_timer(ms(600), &ctx), None);
    }

    #[test]
    fn test_second_pointer_fails() {
        let mut press = PressRecognizer::new();
        let ctx = RecognizerContext::default();
        press.recognize(&sample(EventType::Start, 1, 0), &ctx);
        assert_eq!(press.recognize(&sample(EventType::Start, 2, 50), &ctx), Some(GestureState::Failed));
    }
}
