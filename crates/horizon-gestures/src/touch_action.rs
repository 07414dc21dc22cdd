//! Touch-action hints.
//!
//! Recognizers advertise which native scrolling and zooming the platform may
//! keep while they listen. The manager folds every enabled recognizer's hint
//! into one [`TouchAction`], rendered as a CSS `touch-action` value.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of touch-action hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TouchActions(u8);

impl TouchActions {
    /// No hint.
    pub const EMPTY: TouchActions = TouchActions(0);
    /// The platform keeps all native behavior.
    pub const AUTO: TouchActions = TouchActions(1 << 0);
    /// Native panning and pinch-zoom only.
    pub const MANIPULATION: TouchActions = TouchActions(1 << 1);
    /// No native behavior.
    pub const NONE: TouchActions = TouchActions(1 << 2);
    /// Native horizontal panning.
    pub const PAN_X: TouchActions = TouchActions(1 << 3);
    /// Native vertical panning.
    pub const PAN_Y: TouchActions = TouchActions(1 << 4);

    /// Check if every hint in `other` is in this set.
    pub const fn contains(self, other: TouchActions) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if this set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for TouchActions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        TouchActions(self.0 | rhs.0)
    }
}

impl BitOrAssign for TouchActions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<TouchActions> for TouchActions {
    fn from_iter<I: IntoIterator<Item = TouchActions>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, |acc, hint| acc | hint)
    }
}

/// The resolved touch action for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TouchAction {
    /// All native behavior.
    #[default]
    Auto,
    /// Native panning and pinch-zoom.
    Manipulation,
    /// No native behavior.
    None,
    /// Native horizontal panning only.
    PanX,
    /// Native vertical panning only.
    PanY,
    /// Native panning on both axes.
    PanXY,
}

impl TouchAction {
    /// Resolve a combined hint set.
    ///
    /// NONE dominates. Otherwise PAN_X and PAN_Y combine, then MANIPULATION,
    /// then AUTO.
    pub fn resolve(hints: TouchActions) -> Self {
        if hints.contains(TouchActions::NONE) {
            return Self::None;
        }
        let pan_x = hints.contains(TouchActions::PAN_X);
        let pan_y = hints.contains(TouchActions::PAN_Y);
        match (pan_x, pan_y) {
            (true, true) => Self::PanXY,
            (true, false) => Self::PanX,
            (false, true) => Self::PanY,
            (false, false) if hints.contains(TouchActions::MANIPULATION) => Self::Manipulation,
            (false, false) => Self::Auto,
        }
    }

    /// The CSS `touch-action` value.
    pub const fn as_css_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manipulation => "manipulation",
            Self::None => "none",
            Self::PanX => "pan-x",
            Self::PanY => "pan-y",
            Self::PanXY => "pan-x pan-y",
        }
    }
}

impl fmt::Display for TouchAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_css_str())
    }
}
