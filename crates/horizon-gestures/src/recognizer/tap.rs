//! Tap and multi-tap recognition.

use std::time::Duration;

use glam::Vec2;

use horizon_gestures_core::GestureTimer;

use crate::event::{GestureEvent, GestureKind, GesturePhase};
use crate::input::{EventType, InputSample};
use crate::state::GestureState;
use crate::touch_action::TouchActions;

use super::{Recognizer, RecognizerBase, RecognizerContext};

/// Default maximum time a pointer may stay down for a tap, in milliseconds.
pub const DEFAULT_TAP_HOLD_TIME_MS: u64 = 250;

/// Default maximum movement during a tap.
pub const DEFAULT_TAP_THRESHOLD: f32 = 6.0;

/// Default maximum gap between the taps of a multi-tap, in milliseconds.
pub const DEFAULT_TAP_INTERVAL_MS: u64 = 300;

/// Default maximum distance between the taps of a multi-tap.
pub const DEFAULT_TAP_POSITION_THRESHOLD: f32 = 10.0;

/// What the tap's timer is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TapTimer {
    /// The pointer stayed down too long without releasing.
    FailTimeout,
    /// A completed tap waiting out the interval before it is recognized.
    Pending,
}

/// Recognizes one or more quick taps at roughly the same spot.
///
/// Each release that follows a short, still press bumps a repetition count.
/// Releases too far apart in time or space restart the count. The gesture is
/// recognized when the count reaches a multiple of the configured taps.
///
/// When the tap waits on another recognizer's failure (a single tap waiting
/// for a double tap), a completed tap is held for one interval before it is
/// recognized.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    base: RecognizerBase,
    pointers: usize,
    taps: u32,
    hold_time: Duration,
    threshold: f32,
    interval: Duration,
    position_threshold: f32,
    count: u32,
    previous_time: Option<Duration>,
    previous_center: Option<Vec2>,
    center: Vec2,
    last: Option<InputSample>,
    timer: GestureTimer<TapTimer>,
}

impl Default for TapRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TapRecognizer {
    /// Create a single-tap recognizer with default limits.
    pub fn new() -> Self {
        Self {
            base: RecognizerBase::new(GestureKind::Tap.as_str()),
            pointers: 1,
            taps: 1,
            hold_time: Duration::from_millis(DEFAULT_TAP_HOLD_TIME_MS),
            threshold: DEFAULT_TAP_THRESHOLD,
            interval: Duration::from_millis(DEFAULT_TAP_INTERVAL_MS),
            position_threshold: DEFAULT_TAP_POSITION_THRESHOLD,
            count: 0,
            previous_time: None,
            previous_center: None,
            center: Vec2::ZERO,
            last: None,
            timer: GestureTimer::new(),
        }
    }

    /// Create a double-tap recognizer named `doubletap`.
    pub fn double() -> Self {
        Self::new().with_name("doubletap").with_taps(2)
    }

    /// Set the recognizer name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.base = RecognizerBase::new(name);
        self
    }

    /// Set the number of taps to recognize. Values below 1 are raised to 1.
    pub fn with_taps(mut self, taps: u32) -> Self {
        self.taps = taps.max(1);
        self
    }

    /// Set the maximum time a pointer may stay down.
    pub fn with_hold_time(mut self, hold_time: Duration) -> Self {
        self.hold_time = hold_time;
        self
    }

    /// Set the maximum movement while down.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the maximum gap between taps.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the maximum distance between taps.
    pub fn with_position_threshold(mut self, position_threshold: f32) -> Self {
        self.position_threshold = position_threshold;
        self
    }

    /// Number of taps required.
    pub fn taps(&self) -> u32 {
        self.taps
    }

    /// Current repetition count.
    pub fn count(&self) -> u32 {
        self.count
    }

    fn correct_touch_count(&self, sample: &InputSample) -> bool {
        match sample.event_type {
            EventType::Start | EventType::Move => sample.touches_length == self.pointers,
            EventType::End => sample.touches_length + 1 == self.pointers,
            EventType::Cancel => false,
        }
    }

    fn arm_fail_timeout(&mut self, sample: &InputSample) -> GestureState {
        self.timer
            .start(sample.time_stamp, self.interval, TapTimer::FailTimeout);
        GestureState::Possible
    }

    fn release(&mut self, sample: &InputSample, ctx: &RecognizerContext) -> GestureState {
        let time_stamp = sample.time_stamp;
        let valid_interval = self
            .previous_time
            .is_none_or(|previous| time_stamp.saturating_sub(previous) < self.interval);
        let valid_position = self
            .previous_center
            .is_none_or(|previous| previous.distance(sample.center) < self.position_threshold);

        self.previous_time = Some(time_stamp);
        self.previous_center = Some(sample.center);
        self.center = sample.center;
        self.count = if valid_interval && valid_position {
            self.count + 1
        } else {
            1
        };

        if self.count % self.taps != 0 {
            return GestureState::Failed;
        }
        if !ctx.has_require_failures {
            return GestureState::Recognized;
        }
        self.timer
            .start(time_stamp, self.interval, TapTimer::Pending);
        GestureState::Began
    }
}

impl Recognizer for TapRecognizer {
    fn base(&self) -> &RecognizerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RecognizerBase {
        &mut self.base
    }

    fn kind(&self) -> GestureKind {
        GestureKind::Tap
    }

    fn process(&mut self, sample: &InputSample, ctx: &RecognizerContext) -> GestureState {
        self.timer.stop();
        self.last = Some(*sample);

        if !self.correct_touch_count(sample) {
            return GestureState::Failed;
        }
        if sample.event_type == EventType::Start {
            self.center = sample.center;
            return self.arm_fail_timeout(sample);
        }
        if sample.distance >= self.threshold || sample.delta_time >= self.hold_time {
            return GestureState::Failed;
        }
        if sample.event_type != EventType::End {
            self.center = sample.center;
            return self.arm_fail_timeout(sample);
        }
        self.release(sample, ctx)
    }

    fn emit(&self) -> Option<GestureEvent> {
        if self.state() != GestureState::Recognized {
            return None;
        }
        let sample = self.last.as_ref()?;
        let mut event = GestureEvent::from_sample(self.name(), GestureKind::Tap, GesturePhase::End, sample);
        event.center = self.center;
        event.tap_count = Some(self.count);
        Some(event)
    }

    fn touch_action(&self) -> TouchActions {
        TouchActions::MANIPULATION
    }

    fn poll_timer(&mut self, now: Duration, _ctx: &RecognizerContext) -> Option<GestureState> {
        let purpose = self.timer.take_expired(now)?;
        if self.state().is_terminal() {
            return None;
        }
        let next = match purpose {
            TapTimer::FailTimeout => GestureState::Failed,
            TapTimer::Pending => GestureState::Recognized,
        };
        self.set_state(next);
        Some(next)
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

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn down(at: u64) -> InputSample {
        InputSample::new(EventType::Start, 1, Vec2::new(100.0, 100.0), ms(at))
    }

    fn up(at: u64, held: u64) -> InputSample {
        InputSample::new(EventType::End, 0, Vec2::new(100.0, 100.0), ms(at)).with_delta_time(ms(held))
    }

    #[test]
    fn test_single_tap_recognizes_on_release() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();

        assert_eq!(tap.recognize(&down(0), &ctx), Some(GestureState::Possible));
        assert!(tap.has_pending_timer());
        assert_eq!(tap.recognize(&up(100, 100), &ctx), Some(GestureState::Recognized));
        assert!(!tap.has_pending_timer());

        let event = tap.emit().expect("tap event");
        assert_eq!(event.tap_count, Some(1));
        assert_eq!(event.center, Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_long_hold_fails() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();
        tap.recognize(&down(0), &ctx);
        assert_eq!(tap.recognize(&up(300, 300), &ctx), Some(GestureState::Failed));
        assert_eq!(tap.emit(), None);
    }

    #[test]
    fn test_movement_fails() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();
        tap.recognize(&down(0), &ctx);
        let moved = InputSample::new(EventType::Move, 1, Vec2::new(110.0, 100.0), ms(30))
            .with_movement(Vec2::new(10.0, 0.0))
            .with_delta_time(ms(30));
        assert_eq!(tap.recognize(&moved, &ctx), Some(GestureState::Failed));
    }

    #[test]
    fn test_fail_timeout_fires() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();
        tap.recognize(&down(0), &ctx);
        assert_eq!(tap.next_deadline(), Some(ms(300)));
        assert_eq!(tap.poll_timer(ms(299), &ctx), None);
        assert_eq!(tap.poll_timer(ms(300), &ctx), Some(GestureState::Failed));
        assert_eq!(tap.state(), GestureState::Failed);
    }

    #[test]
    fn test_double_tap_counts() {
        let mut double = TapRecognizer::double();
        let ctx = RecognizerContext::default();

        double.recognize(&down(0), &ctx);
        assert_eq!(double.recognize(&up(60, 60), &ctx), Some(GestureState::Failed));
        assert_eq!(double.recognize(&down(150), &ctx), Some(GestureState::Possible));
        assert_eq!(double.recognize(&up(200, 50), &ctx), Some(GestureState::Recognized));
        assert_eq!(double.emit().and_then(|e| e.tap_count), Some(2));
    }

    #[test]
    fn test_slow_second_tap_restarts_count() {
        let mut double = TapRecognizer::double();
        let ctx = RecognizerContext::default();

        double.recognize(&down(0), &ctx);
        double.recognize(&up(60, 60), &ctx);
        double.recognize(&down(500), &ctx);
        assert_eq!(double.recognize(&up(560, 60), &ctx), Some(GestureState::Failed));
        assert_eq!(double.count(), 1);
    }

    #[test]
    fn test_pending_tap_with_require_failures() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext { has_require_failures: true };

        tap.recognize(&down(0), &ctx);
        assert_eq!(tap.recognize(&up(50, 50), &ctx), Some(GestureState::Began));
        assert_eq!(tap.emit(), None);
        assert_eq!(tap.next_deadline(), Some(ms(350)));

        assert_eq!(tap.poll_timer(ms(350), &ctx), Some(GestureState::Recognized));
        assert!(tap.emit().is_some());
    }

    #[test]
    fn test_timer_on_terminal_recognizer_is_noop() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();
        tap.recognize(&down(0), &ctx);
        tap.set_state(GestureState::Cancelled);
        assert_eq!(tap.poll_timer(ms(400), &ctx), None);
        assert_eq!(tap.state(), GestureState::Cancelled);
    }

    #[test]
    fn test_cancel_fails() {
        let mut tap = TapRecognizer::new();
        let ctx = RecognizerContext::default();
        tap.recognize(&down(0), &ctx);
        let cancel = InputSample::new(EventType::Cancel, 0, Vec2::ZERO, ms(20));
        assert_eq!(tap.recognize(&cancel, &ctx), Some(GestureState::Failed));
        assert!(!tap.has_pending_timer());
    }
}
