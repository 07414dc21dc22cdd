//! Building input samples from raw pointer positions.
//!
//! Hosts that already normalize their pointer stream can construct
//! [`InputSample`]s directly. [`InputSession`] is for hosts that only know
//! where each active pointer is: it tracks the gesture's origin and derives
//! centroid, cumulative movement, velocity, scale and rotation.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use glam::Vec2;
//! use horizon_gestures::{EventType, InputSession};
//!
//! let mut session = InputSession::new();
//! session.sample(EventType::Start, &[Vec2::new(10.0, 10.0)], Duration::ZERO);
//! let sample = session.sample(
//!     EventType::Move,
//!     &[Vec2::new(40.0, 10.0)],
//!     Duration::from_millis(16),
//! );
//! assert_eq!(sample.movement, Vec2::new(30.0, 0.0));
//! ```

use std::time::Duration;

use glam::Vec2;

use crate::input::{EventType, InputSample};

/// Tracks one pointer gesture and produces samples for it.
#[derive(Debug, Clone, Default)]
pub struct InputSession {
    start_time: Duration,
    start_center: Option<Vec2>,
    previous: Option<InputSample>,
    first_pair: Option<[Vec2; 2]>,
    last_pair: Option<[Vec2; 2]>,
}

impl InputSession {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a sample for the pointers currently down.
    ///
    /// `pointers` lists every active pointer after the event was applied: an
    /// END for the last pointer passes an empty slice. A START with a single
    /// pointer begins a new gesture. With no pointers the last known center
    /// and velocity are kept, and an END that breaks a pointer pair reports
    /// the pair's last scale.
    pub fn sample(
        &mut self,
        event_type: EventType,
        pointers: &[Vec2],
        time_stamp: Duration,
    ) -> InputSample {
        if event_type == EventType::Start && pointers.len() == 1 {
            *self = Self {
                start_time: time_stamp,
                ..Self::default()
            };
        }

        let center = match centroid(pointers) {
            Some(center) => center,
            None => self.previous.map_or(Vec2::ZERO, |previous| previous.center),
        };
        let start_center = *self.start_center.get_or_insert(center);

        let (scale, rotation) = match pointers {
            [a, b] => self.two_pointer_transform([*a, *b]),
            _ => {
                let scale = match event_type {
                    EventType::End => self.pair_scale(),
                    _ => 1.0,
                };
                self.first_pair = None;
                self.last_pair = None;
                (scale, 0.0)
            }
        };

        let velocity = match self.previous {
            // Nothing left to track: the release keeps the flick's speed.
            Some(previous) if pointers.is_empty() => previous.velocity,
            Some(previous) => {
                let elapsed = time_stamp.saturating_sub(previous.time_stamp);
                let millis = (elapsed.as_secs_f64() * 1000.0) as f32;
                if millis > 0.0 {
                    (center - previous.center) / millis
                } else {
                    previous.velocity
                }
            }
            None => Vec2::ZERO,
        };

        let sample = InputSample::new(event_type, pointers.len(), center, time_stamp)
            .with_movement(center - start_center)
            .with_velocity(velocity)
            .with_scale(scale)
            .with_rotation(rotation)
            .with_delta_time(time_stamp.saturating_sub(self.start_time));
        self.previous = Some(sample);
        sample
    }

    /// Scale against the first pair and rotation since the previous pair.
    fn two_pointer_transform(&mut self, pair: [Vec2; 2]) -> (f32, f32) {
        let first = *self.first_pair.get_or_insert(pair);
        let scale = span_ratio(first, pair);

        let rotation = match self.last_pair {
            Some(last) => normalize_degrees(angle(pair) - angle(last)),
            None => 0.0,
        };
        self.last_pair = Some(pair);
        (scale, rotation)
    }

    /// Scale of the last tracked pair, or 1 when no pair is tracked.
    fn pair_scale(&self) -> f32 {
        match (self.first_pair, self.last_pair) {
            (Some(first), Some(last)) => span_ratio(first, last),
            _ => 1.0,
        }
    }
}

fn span_ratio(first: [Vec2; 2], pair: [Vec2; 2]) -> f32 {
    let initial_span = first[0].distance(first[1]);
    if initial_span > f32::EPSILON {
        pair[0].distance(pair[1]) / initial_span
    } else {
        1.0
    }
}

fn centroid(pointers: &[Vec2]) -> Option<Vec2> {
    if pointers.is_empty() {
        return None;
    }
    let sum: Vec2 = pointers.iter().copied().sum();
    Some(sum / pointers.len() as f32)
}

/// Angle of the line from the second pointer to the first, in degrees.
fn angle(pair: [Vec2; 2]) -> f32 {
    let d = pair[0] - pair[1];
    d.y.atan2(d.x).to_degrees()
}

/// Wrap into (-180, 180].
fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_movement_is_cumulative() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::new(0.0, 0.0)], ms(0));
        session.sample(EventType::Move, &[Vec2::new(5.0, 0.0)], ms(10));
        let sample = session.sample(EventType::Move, &[Vec2::new(12.0, 0.0)], ms(20));

        assert_eq!(sample.movement, Vec2::new(12.0, 0.0));
        assert_eq!(sample.distance, 12.0);
        assert_eq!(sample.delta_time, ms(20));
        assert_eq!(sample.touches_length, 1);
    }

    #[test]
    fn test_velocity_from_previous_sample() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::ZERO], ms(0));
        let sample = session.sample(EventType::Move, &[Vec2::new(20.0, -10.0)], ms(10));
        assert_eq!(sample.velocity, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_final_end_keeps_last_center() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::new(3.0, 4.0)], ms(0));
        let sample = session.sample(EventType::End, &[], ms(50));
        assert_eq!(sample.center, Vec2::new(3.0, 4.0));
        assert_eq!(sample.touches_length, 0);
        assert_eq!(sample.distance, 0.0);
    }

    #[test]
    fn test_release_keeps_last_velocity() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::ZERO], ms(0));
        session.sample(EventType::Move, &[Vec2::new(40.0, 0.0)], ms(20));
        session.sample(EventType::Move, &[Vec2::new(80.0, 0.0)], ms(40));
        let release = session.sample(EventType::End, &[], ms(48));

        assert_eq!(release.velocity, Vec2::new(2.0, 0.0));
        assert_eq!(release.movement, Vec2::new(80.0, 0.0));
    }

    #[test]
    fn test_lifting_one_of_two_keeps_pair_scale() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::ZERO], ms(0));
        session.sample(EventType::Start, &[Vec2::ZERO, Vec2::new(100.0, 0.0)], ms(5));
        session.sample(EventType::Move, &[Vec2::new(-25.0, 0.0), Vec2::new(125.0, 0.0)], ms(20));

        let lifted = session.sample(EventType::End, &[Vec2::new(-25.0, 0.0)], ms(30));
        assert_eq!(lifted.scale, 1.5);
        assert_eq!(lifted.rotation, 0.0);

        let last = session.sample(EventType::End, &[], ms(40));
        assert_eq!(last.scale, 1.0);
    }

    #[test]
    fn test_new_start_resets_origin() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::ZERO], ms(0));
        session.sample(EventType::End, &[], ms(40));
        let sample = session.sample(EventType::Start, &[Vec2::new(50.0, 50.0)], ms(500));
        assert_eq!(sample.movement, Vec2::ZERO);
        assert_eq!(sample.delta_time, Duration::ZERO);
    }

    #[test]
    fn test_two_pointer_scale() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::new(0.0, 0.0)], ms(0));
        let first = session.sample(
            EventType::Start,
            &[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
            ms(5),
        );
        assert_eq!(first.scale, 1.0);

        let spread = session.sample(
            EventType::Move,
            &[Vec2::new(-50.0, 0.0), Vec2::new(150.0, 0.0)],
            ms(20),
        );
        assert_eq!(spread.scale, 2.0);
    }

    #[test]
    fn test_two_pointer_rotation_is_incremental() {
        let mut session = InputSession::new();
        session.sample(EventType::Start, &[Vec2::new(100.0, 0.0)], ms(0));
        session.sample(
            EventType::Start,
            &[Vec2::new(100.0, 0.0), Vec2::ZERO],
            ms(5),
        );
        let turned = session.sample(
            EventType::Move,
            &[Vec2::new(0.0, 100.0), Vec2::ZERO],
            ms(20),
        );
        assert!((turned.rotation - 90.0).abs() < 1e-3);

        let held = session.sample(
            EventType::Move,
            &[Vec2::new(0.0, 100.0), Vec2::ZERO],
            ms(30),
        );
        assert_eq!(held.rotation, 0.0);
    }

    #[test]
    fn test_normalize_degrees() {
        assert_eq!(normalize_degrees(190.0), -170.0);
        assert_eq!(normalize_degrees(-190.0), 170.0);
        assert_eq!(normalize_degrees(180.0), 180.0);
        assert_eq!(normalize_degrees(-180.0), 180.0);
    }
}
