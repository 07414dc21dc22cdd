//! Recognizer-owned one-shot timers.
//!
//! A [`GestureTimer`] is a cancellable deadline on the host clock. It holds no
//! external registration: the host reports the current time and the owner
//! asks whether the deadline has passed. Dropping the owner drops the timer.
//!
//! Each armed timer carries a small `purpose` value so one timer can stand in
//! for several mutually exclusive waits (for example a tap's failure timeout
//! and its pending-recognition interval).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_gestures_core::GestureTimer;
//!
//! let mut timer = GestureTimer::new();
//! timer.start(Duration::ZERO, Duration::from_millis(500), "hold");
//! assert_eq!(timer.take_expired(Duration::from_millis(499)), None);
//! assert_eq!(timer.take_expired(Duration::from_millis(500)), Some("hold"));
//! assert!(!timer.is_active());
//! ```

use std::time::Duration;

use crate::logging::targets;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed<P> {
    deadline: Duration,
    purpose: P,
}

/// A single cancellable one-shot deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTimer<P> {
    armed: Option<Armed<P>>,
}

impl<P> Default for GestureTimer<P> {
    fn default() -> Self {
        Self { armed: None }
    }
}

impl<P: Copy + std::fmt::Debug> GestureTimer<P> {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any armed deadline.
    pub fn start(&mut self, now: Duration, delay: Duration, purpose: P) {
        let deadline = now.saturating_add(delay);
        tracing::trace!(target: targets::TIMER, ?purpose, ?deadline, "timer armed");
        self.armed = Some(Armed { deadline, purpose });
    }

    /// Cancel the timer. Returns `true` if it was armed.
    pub fn stop(&mut self) -> bool {
        match self.armed.take() {
            Some(armed) => {
                tracing::trace!(target: targets::TIMER, purpose = ?armed.purpose, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Check whether a deadline is armed.
    pub fn is_active(&self) -> bool {
        self.armed.is_some()
    }

    /// The armed deadline, if any.
    pub fn deadline(&self) -> Option<Duration> {
        self.armed.map(|armed| armed.deadline)
    }

    /// The purpose of the armed deadline, if any.
    pub fn purpose(&self) -> Option<P> {
        self.armed.map(|armed| armed.purpose)
    }

    /// Time remaining until the deadline, zero if it has already passed.
    pub fn time_until(&self, now: Duration) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_sub(now))
    }

    /// Disarm and return the purpose if the deadline is at or before `now`.
    ///
    /// A timer fires at most once per arming.
    pub fn take_expired(&mut self, now: Duration) -> Option<P> {
        let armed = self.armed?;
        if armed.deadline > now {
            return None;
        }
        self.armed = None;
        tracing::trace!(target: targets::TIMER, purpose = ?armed.purpose, "timer fired");
        Some(armed.purpose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_new_timer_is_idle() {
        let timer = GestureTimer::<()>::new();
        assert!(!timer.is_active());
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.time_until(ms(10)), None);
    }

    #[test]
    fn test_fires_once_at_deadline() {
        let mut timer = GestureTimer::new();
        timer.start(ms(100), ms(250), 7u8);
        assert_eq!(timer.deadline(), Some(ms(350)));
        assert_eq!(timer.time_until(ms(300)), Some(ms(50)));

        assert_eq!(timer.take_expired(ms(349)), None);
        assert_eq!(timer.take_expired(ms(350)), Some(7));
        assert_eq!(timer.take_expired(ms(400)), None);
    }

    #[test]
    fn test_restart_replaces_deadline() {
        let mut timer = GestureTimer::new();
        timer.start(ms(0), ms(100), 'a');
        timer.start(ms(50), ms(100), 'b');

        assert_eq!(timer.purpose(), Some('b'));
        assert_eq!(timer.take_expired(ms(100)), None);
        assert_eq!(timer.take_expired(ms(150)), Some('b'));
    }

    #[test]
    fn test_stop_prevents_fire() {
        let mut timer = GestureTimer::new();
        timer.start(ms(0), ms(10), ());
        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.take_expired(ms(1_000)), None);
    }

    #[test]
    fn test_overdue_time_until_is_zero() {
        let mut timer = GestureTimer::new();
        timer.start(ms(0), ms(10), ());
        assert_eq!(timer.time_until(ms(50)), Some(Duration::ZERO));
    }
}
