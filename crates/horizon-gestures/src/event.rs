//! Outbound gesture events.
//!
//! A [`GestureEvent`] is an owned copy of what a recognizer saw when it
//! entered an emitting state. Subscribers receive it by topic: the
//! recognizer's name, optionally followed by a phase suffix (`panstart`,
//! `panmove`, `panend`) or a qualifier (`swipeleft`, `pinchin`).

use std::fmt;
use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::input::{Direction, InputSample};
use crate::recognizer::RecognizerId;
use crate::state::GestureState;

/// The family a recognizer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureKind {
    /// Single-pointer drag.
    Pan,
    /// Fast single-pointer flick.
    Swipe,
    /// Two-pointer scale.
    Pinch,
    /// Two-pointer rotation.
    Rotate,
    /// Single or multi-tap.
    Tap,
    /// Press and hold.
    Press,
}

/// All gesture kinds for iteration purposes.
pub const ALL_GESTURE_KINDS: &[GestureKind] = &[
    GestureKind::Pan,
    GestureKind::Swipe,
    GestureKind::Pinch,
    GestureKind::Rotate,
    GestureKind::Tap,
    GestureKind::Press,
];

impl GestureKind {
    /// Lowercase name, also the default recognizer name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Swipe => "swipe",
            Self::Pinch => "pinch",
            Self::Rotate => "rotate",
            Self::Tap => "tap",
            Self::Press => "press",
        }
    }

    /// Whether events of this kind carry a start/move/end phase.
    pub const fn is_continuous(self) -> bool {
        matches!(self, Self::Pan | Self::Swipe | Self::Pinch | Self::Rotate)
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle position of an emitted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    /// The recognizer entered Began.
    Start,
    /// The recognizer entered Changed.
    Move,
    /// The recognizer entered Recognized.
    End,
}

impl GesturePhase {
    /// The phase an emitting state maps to.
    pub const fn from_state(state: GestureState) -> Option<Self> {
        match state {
            GestureState::Began => Some(Self::Start),
            GestureState::Changed => Some(Self::Move),
            GestureState::Recognized => Some(Self::End),
            _ => None,
        }
    }

    /// Topic suffix for continuous gestures.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Move => "move",
            Self::End => "end",
        }
    }
}

/// Dominant direction of a swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Toward negative `x`.
    Left,
    /// Toward positive `x`.
    Right,
    /// Toward negative `y`.
    Up,
    /// Toward positive `y`.
    Down,
}

impl SwipeDirection {
    /// Classify by the dominant axis of `movement`. Zero movement has none.
    pub fn from_movement(movement: Vec2) -> Option<Self> {
        if movement == Vec2::ZERO {
            None
        } else if movement.x.abs() >= movement.y.abs() {
            Some(if movement.x < 0.0 { Self::Left } else { Self::Right })
        } else {
            Some(if movement.y < 0.0 { Self::Up } else { Self::Down })
        }
    }

    /// Topic qualifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Whether a pinch is closing or opening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchDirection {
    /// Pointers moved together.
    In,
    /// Pointers moved apart.
    Out,
}

impl PinchDirection {
    /// Classify a scale factor. A scale of exactly 1 has no direction.
    pub fn from_scale(scale: f32) -> Option<Self> {
        if scale < 1.0 {
            Some(Self::In)
        } else if scale > 1.0 {
            Some(Self::Out)
        } else {
            None
        }
    }

    /// Topic qualifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// An emitted gesture notification.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureEvent {
    /// The recognizer that produced this event.
    pub recognizer: RecognizerId,
    /// The recognizer's name; the base topic.
    pub name: String,
    /// The recognizer's family.
    pub kind: GestureKind,
    /// Lifecycle position.
    pub phase: GesturePhase,
    /// Center of the pointers (the tap position for taps).
    pub center: Vec2,
    /// Displacement since the gesture's START.
    pub movement: Vec2,
    /// Center velocity in units per millisecond.
    pub velocity: Vec2,
    /// Length of `movement`.
    pub distance: f32,
    /// Direction of `movement`.
    pub direction: Direction,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Scale factor.
    pub scale: f32,
    /// Host time of the sample (or timer) that produced the event.
    pub time_stamp: Duration,
    /// Repetition count for taps.
    pub tap_count: Option<u32>,
    /// Qualifier for swipes.
    pub swipe_direction: Option<SwipeDirection>,
    /// Qualifier for pinches.
    pub pinch_direction: Option<PinchDirection>,
}

impl GestureEvent {
    /// Build an event from the sample a recognizer retained.
    ///
    /// The recognizer id is assigned by the manager on emission.
    pub fn from_sample(
        name: &str,
        kind: GestureKind,
        phase: GesturePhase,
        sample: &InputSample,
    ) -> Self {
        Self {
            recognizer: RecognizerId::default(),
            name: name.to_owned(),
            kind,
            phase,
            center: sample.center,
            movement: sample.movement,
            velocity: sample.velocity,
            distance: sample.distance,
            direction: sample.direction,
            rotation: sample.rotation,
            scale: sample.scale,
            time_stamp: sample.time_stamp,
            tap_count: None,
            swipe_direction: None,
            pinch_direction: None,
        }
    }

    /// The qualifier appended to the name, if any.
    pub fn qualifier(&self) -> Option<&'static str> {
        self.swipe_direction
            .map(SwipeDirection::as_str)
            .or_else(|| self.pinch_direction.map(PinchDirection::as_str))
    }

    /// Every topic this event is delivered under.
    pub fn topics(&self) -> Vec<String> {
        let mut topics = vec![self.name.clone()];
        if self.kind.is_continuous() {
            topics.push(format!("{}{}", self.name, self.phase.suffix()));
        }
        if let Some(qualifier) = self.qualifier() {
            topics.push(format!("{}{}", self.name, qualifier));
        }
        topics
    }
}
