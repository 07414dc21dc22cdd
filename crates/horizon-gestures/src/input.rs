//! Normalized input samples.
//!
//! An [`InputSample`] is an immutable snapshot of one pointer event, already
//! normalized by the host (or by [`InputSession`](crate::InputSession)). Every
//! recognizer reads the same sample during a dispatch cycle.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use horizon_gestures_core::{GestureError, Result};

/// The phase of the pointer stream a sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventType {
    /// A pointer went down.
    Start = 1,
    /// One or more pointers moved.
    Move = 2,
    /// A pointer went up.
    End = 4,
    /// The platform aborted the pointer stream.
    Cancel = 8,
}

impl EventType {
    /// The wire code of this event type.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Lowercase name, used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
            Self::Cancel => "cancel",
        }
    }

    /// Whether this event closes the pointer stream.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::End | Self::Cancel)
    }
}

impl TryFrom<u8> for EventType {
    type Error = GestureError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            1 => Ok(Self::Start),
            2 => Ok(Self::Move),
            4 => Ok(Self::End),
            8 => Ok(Self::Cancel),
            other => Err(GestureError::UnknownEventType(other)),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of cardinal directions.
///
/// Screen coordinates are assumed: `y` grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Direction(u8);

impl Direction {
    /// No direction.
    pub const NONE: Direction = Direction(0);
    /// Toward negative `x`.
    pub const LEFT: Direction = Direction(1 << 0);
    /// Toward positive `x`.
    pub const RIGHT: Direction = Direction(1 << 1);
    /// Toward negative `y`.
    pub const UP: Direction = Direction(1 << 2);
    /// Toward positive `y`.
    pub const DOWN: Direction = Direction(1 << 3);
    /// Left or right.
    pub const HORIZONTAL: Direction = Direction(0b0011);
    /// Up or down.
    pub const VERTICAL: Direction = Direction(0b1100);
    /// Every direction.
    pub const ALL: Direction = Direction(0b1111);

    const NAMED: [(Direction, &'static str); 4] = [
        (Self::LEFT, "left"),
        (Self::RIGHT, "right"),
        (Self::UP, "up"),
        (Self::DOWN, "down"),
    ];

    /// Build a set from raw bits, dropping unknown bits.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Direction(bits & Self::ALL.0)
    }

    /// The raw bits of this set.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Check if every direction in `other` is in this set.
    pub const fn contains(self, other: Direction) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if this set shares any direction with `other`.
    pub const fn intersects(self, other: Direction) -> bool {
        (self.0 & other.0) != 0
    }

    /// Check if this set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Classify a movement vector.
    ///
    /// A cardinal direction is included when the unit vector lies within
    /// 78.75° of it, so diagonal motion carries two bits. Zero (or
    /// non-finite) movement has no direction.
    pub fn from_movement(movement: Vec2) -> Self {
        let Some(unit) = movement.try_normalize() else {
            return Self::NONE;
        };
        let threshold = (7.0 * std::f32::consts::PI / 16.0).cos();
        let mut direction = Self::NONE;
        if unit.dot(Vec2::NEG_Y) > threshold {
            direction |= Self::UP;
        }
        if unit.dot(Vec2::Y) > threshold {
            direction |= Self::DOWN;
        }
        if unit.dot(Vec2::X) > threshold {
            direction |= Self::RIGHT;
        }
        if unit.dot(Vec2::NEG_X) > threshold {
            direction |= Self::LEFT;
        }
        direction
    }

    /// The sign of `value` along the horizontal axis.
    pub fn horizontal_sign(value: f32) -> Self {
        if value < 0.0 {
            Self::LEFT
        } else if value > 0.0 {
            Self::RIGHT
        } else {
            Self::NONE
        }
    }

    /// The sign of `value` along the vertical axis.
    pub fn vertical_sign(value: f32) -> Self {
        if value < 0.0 {
            Self::UP
        } else if value > 0.0 {
            Self::DOWN
        } else {
            Self::NONE
        }
    }

    /// Names of the single directions in this set.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        Self::NAMED
            .into_iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
    }
}

impl BitOr for Direction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Direction(self.0 | rhs.0)
    }
}

impl BitOrAssign for Direction {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Direction {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Direction(self.0 & rhs.0)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = self.names().collect();
        f.write_str(&names.join("|"))
    }
}

impl TryFrom<Vec<String>> for Direction {
    type Error = GestureError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        names.iter().try_fold(Self::NONE, |acc, name| {
            let flag = match name.as_str() {
                "left" => Self::LEFT,
                "right" => Self::RIGHT,
                "up" => Self::UP,
                "down" => Self::DOWN,
                "horizontal" => Self::HORIZONTAL,
                "vertical" => Self::VERTICAL,
                "all" => Self::ALL,
                "none" => Self::NONE,
                other => {
                    return Err(GestureError::config(format!(
                        "unknown direction \"{other}\""
                    )));
                }
            };
            Ok(acc | flag)
        })
    }
}

impl From<Direction> for Vec<String> {
    fn from(direction: Direction) -> Self {
        direction.names().map(str::to_owned).collect()
    }
}

/// An immutable snapshot of one pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSample {
    /// Which phase of the pointer stream this is.
    pub event_type: EventType,
    /// Number of pointers currently down.
    pub touches_length: usize,
    /// Centroid of the active pointers.
    pub center: Vec2,
    /// Displacement of the center since the gesture's START.
    pub movement: Vec2,
    /// Length of `movement`.
    pub distance: f32,
    /// Direction of `movement`.
    pub direction: Direction,
    /// Center velocity in units per millisecond.
    pub velocity: Vec2,
    /// Rotation in degrees reported for two-pointer input.
    pub rotation: f32,
    /// Ratio of the current pointer span to the initial span.
    pub scale: f32,
    /// Time elapsed since the gesture's START.
    pub delta_time: Duration,
    /// Absolute time on the host clock.
    pub time_stamp: Duration,
}

impl InputSample {
    /// Create a sample with no movement, velocity or rotation and unit scale.
    pub fn new(
        event_type: EventType,
        touches_length: usize,
        center: Vec2,
        time_stamp: Duration,
    ) -> Self {
        Self {
            event_type,
            touches_length,
            center,
            movement: Vec2::ZERO,
            distance: 0.0,
            direction: Direction::NONE,
            velocity: Vec2::ZERO,
            rotation: 0.0,
            scale: 1.0,
            delta_time: Duration::ZERO,
            time_stamp,
        }
    }

    /// Set the cumulative movement, deriving `distance` and `direction`.
    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self.distance = movement.length();
        self.direction = Direction::from_movement(movement);
        self
    }

    /// Override the direction derived from movement.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the rotation in degrees.
    pub fn with_rotation(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Set the time elapsed since START.
    pub fn with_delta_time(mut self, delta_time: Duration) -> Self {
        self.delta_time = delta_time;
        self
    }

    /// Reject samples carrying non-finite numbers.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("center.x", self.center.x),
            ("center.y", self.center.y),
            ("movement.x", self.movement.x),
            ("movement.y", self.movement.y),
            ("distance", self.distance),
            ("velocity.x", self.velocity.x),
            ("velocity.y", self.velocity.y),
            ("rotation", self.rotation),
            ("scale", self.scale),
        ];
        match fields.into_iter().find(|(_, value)| !value.is_finite()) {
            Some((field, value)) => Err(GestureError::invalid_sample(field, value)),
            None => Ok(()),
        }
    }
}
