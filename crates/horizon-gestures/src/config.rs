//! TOML configuration for the standard recognizer set.
//!
//! Every key is optional; omitted keys keep their defaults. Durations are in
//! milliseconds.
//!
//! ```toml
//! simultaneous = [["pinch", "rotate"], ["pan", "swipe"]]
//!
//! [pan]
//! threshold = 20.0
//! direction = ["vertical"]
//!
//! [double_tap]
//! enabled = false
//!
//! [press]
//! hold_time_ms = 650
//! ```
//!
//! [`GestureManager::from_config`] turns a [`GestureConfig`] into a manager
//! holding pan, swipe, pinch, rotate, double tap, tap and press, with the
//! single tap waiting for the double tap to fail. Only pinch and rotate run
//! together by default, so one finger yields either a pan or a swipe. The
//! example above opts pan and swipe in.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use horizon_gestures_core::logging::targets;
use horizon_gestures_core::{GestureError, Result};

use crate::arbitration::SimultaneousGesturePolicy;
use crate::event::GestureKind;
use crate::input::Direction;
use crate::manager::GestureManager;
use crate::recognizer::{
    DEFAULT_PAN_THRESHOLD, DEFAULT_PRESS_HOLD_TIME_MS, DEFAULT_PRESS_THRESHOLD,
    DEFAULT_SWIPE_THRESHOLD, DEFAULT_SWIPE_VELOCITY, DEFAULT_TAP_HOLD_TIME_MS,
    DEFAULT_TAP_INTERVAL_MS, DEFAULT_TAP_POSITION_THRESHOLD, DEFAULT_TAP_THRESHOLD,
    PanRecognizer, PinchRecognizer, PressRecognizer, Recognizer, RotateRecognizer,
    SwipeRecognizer, TapRecognizer,
};

/// Pan settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanConfig {
    /// Whether the recognizer takes part.
    pub enabled: bool,
    /// Minimum travel before the pan begins.
    pub threshold: f32,
    /// Allowed directions.
    pub direction: Direction,
}

impl Default for PanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_PAN_THRESHOLD,
            direction: Direction::ALL,
        }
    }
}

/// Swipe settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwipeConfig {
    /// Whether the recognizer takes part.
    pub enabled: bool,
    /// Minimum displacement at release.
    pub threshold: f32,
    /// Minimum speed in units per millisecond.
    pub velocity: f32,
    /// Allowed directions.
    pub direction: Direction,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_SWIPE_THRESHOLD,
            velocity: DEFAULT_SWIPE_VELOCITY,
            direction: Direction::ALL,
        }
    }
}

/// Pinch or rotate settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoPointerConfig {
    /// Whether the recognizer takes part.
    pub enabled: bool,
    /// Scale departure for pinch, degrees for rotate.
    pub threshold: f32,
}

impl Default for TwoPointerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 0.0,
        }
    }
}

/// Tap settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    /// Whether the recognizer takes part.
    pub enabled: bool,
    /// Taps to recognize. Unset keeps 1 for `tap` and 2 for `double_tap`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taps: Option<u32>,
    /// Longest a single press may last.
    pub hold_time_ms: u64,
    /// Movement allowed during one press.
    pub threshold: f32,
    /// Longest gap between consecutive taps.
    pub interval_ms: u64,
    /// Distance allowed between consecutive taps.
    pub position_threshold: f32,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            taps: None,
            hold_time_ms: DEFAULT_TAP_HOLD_TIME_MS,
            threshold: DEFAULT_TAP_THRESHOLD,
            interval_ms: DEFAULT_TAP_INTERVAL_MS,
            position_threshold: DEFAULT_TAP_POSITION_THRESHOLD,
        }
    }
}

impl TapConfig {
    fn apply(&self, tap: TapRecognizer) -> TapRecognizer {
        let tap = match self.taps {
            Some(taps) => tap.with_taps(taps),
            None => tap,
        };
        tap.with_hold_time(Duration::from_millis(self.hold_time_ms))
            .with_threshold(self.threshold)
            .with_interval(Duration::from_millis(self.interval_ms))
            .with_position_threshold(self.position_threshold)
    }
}

/// Press settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressConfig {
    /// Whether the recognizer takes part.
    pub enabled: bool,
    /// How long the pointer must stay down.
    pub hold_time_ms: u64,
    /// Movement allowed while holding.
    pub threshold: f32,
}

impl Default for PressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hold_time_ms: DEFAULT_PRESS_HOLD_TIME_MS,
            threshold: DEFAULT_PRESS_THRESHOLD,
        }
    }
}

/// Settings for the standard recognizer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Kind pairs allowed to run at the same time.
    pub simultaneous: Vec<[GestureKind; 2]>,
    pub pan: PanConfig,
    pub swipe: SwipeConfig,
    pub pinch: TwoPointerConfig,
    pub rotate: TwoPointerConfig,
    /// Single tap; waits for `double_tap` to fail when that is enabled.
    pub tap: TapConfig,
    pub double_tap: TapConfig,
    pub press: PressConfig,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            simultaneous: vec![[GestureKind::Pinch, GestureKind::Rotate]],
            pan: PanConfig::default(),
            swipe: SwipeConfig::default(),
            pinch: TwoPointerConfig::default(),
            rotate: TwoPointerConfig::default(),
            tap: TapConfig::default(),
            double_tap: TapConfig::default(),
            press: PressConfig::default(),
        }
    }
}

impl GestureConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source).map_err(|err| GestureError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|err| GestureError::config(format!("{}: {err}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Render as a TOML document.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|err| GestureError::config(err.to_string()))
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("pan.threshold", self.pan.threshold),
            ("swipe.threshold", self.swipe.threshold),
            ("swipe.velocity", self.swipe.velocity),
            ("pinch.threshold", self.pinch.threshold),
            ("rotate.threshold", self.rotate.threshold),
            ("tap.threshold", self.tap.threshold),
            ("tap.position_threshold", self.tap.position_threshold),
            ("double_tap.threshold", self.double_tap.threshold),
            ("double_tap.position_threshold", self.double_tap.position_threshold),
            ("press.threshold", self.press.threshold),
        ];
        if let Some((key, value)) = thresholds
            .into_iter()
            .find(|(_, value)| !value.is_finite() || *value < 0.0)
        {
            return Err(GestureError::config(format!(
                "{key} must be a non-negative number, got {value}"
            )));
        }
        for (key, taps) in [("tap.taps", self.tap.taps), ("double_tap.taps", self.double_tap.taps)] {
            if taps == Some(0) {
                return Err(GestureError::config(format!("{key} must be at least 1")));
            }
        }
        Ok(())
    }

    /// The simultaneity policy described by `simultaneous`.
    pub fn policy(&self) -> SimultaneousGesturePolicy {
        let mut policy = SimultaneousGesturePolicy::new();
        for [a, b] in &self.simultaneous {
            policy.allow(*a, *b);
        }
        policy
    }
}

fn enabled<R: Recognizer>(mut recognizer: R, enabled: bool) -> R {
    recognizer.set_enabled(enabled);
    recognizer
}

impl GestureManager {
    /// Build the standard recognizer set from configuration.
    ///
    /// Registration order is pan, swipe, pinch, rotate, double tap, tap,
    /// press. Disabled recognizers are registered but inactive. When the
    /// double tap is enabled, the single tap requires it to fail.
    pub fn from_config(config: &GestureConfig) -> Result<Self> {
        config.validate()?;
        let mut manager = Self::with_policy(config.policy());

        manager.add(enabled(
            PanRecognizer::new()
                .with_threshold(config.pan.threshold)
                .with_direction(config.pan.direction),
            config.pan.enabled,
        ));
        manager.add(enabled(
            SwipeRecognizer::new()
                .with_threshold(config.swipe.threshold)
                .with_velocity(config.swipe.velocity)
                .with_direction(config.swipe.direction),
            config.swipe.enabled,
        ));
        manager.add(enabled(
            PinchRecognizer::new().with_threshold(config.pinch.threshold),
            config.pinch.enabled,
        ));
        manager.add(enabled(
            RotateRecognizer::new().with_threshold(config.rotate.threshold),
            config.rotate.enabled,
        ));
        let double_tap = manager.add(enabled(
            config.double_tap.apply(TapRecognizer::double()),
            config.double_tap.enabled,
        ));
        let tap = manager.add(enabled(
            config.tap.apply(TapRecognizer::new()),
            config.tap.enabled,
        ));
        manager.add(enabled(
            PressRecognizer::new()
                .with_hold_time(Duration::from_millis(config.press.hold_time_ms))
                .with_threshold(config.press.threshold),
            config.press.enabled,
        ));

        if config.double_tap.enabled {
            manager.require_failure(tap, double_tap)?;
        }
        tracing::debug!(target: targets::MANAGER, recognizers = manager.len(), "manager built from config");
        Ok(manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GestureConfig::default();
        assert_eq!(config.tap.taps, None);
        assert_eq!(config.double_tap, config.tap);
        assert_eq!(config.press.hold_time_ms, 500);
        assert_eq!(config.swipe.velocity, 0.65);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = GestureConfig::from_toml_str(
            r#"
            [pan]
            threshold = 20.0
            direction = ["vertical"]

            [double_tap]
            interval_ms = 400
            "#,
        )
        .expect("valid config");

        assert_eq!(config.pan.threshold, 20.0);
        assert_eq!(config.pan.direction, Direction::VERTICAL);
        assert!(config.pan.enabled);
        assert_eq!(config.double_tap.interval_ms, 400);
        assert_eq!(config.double_tap.taps, None);
        assert_eq!(config.tap, TapConfig::default());
        assert_eq!(config.simultaneous, GestureConfig::default().simultaneous);
        assert!(config.policy().allows(GestureKind::Pinch, GestureKind::Rotate));
        assert!(!config.policy().allows(GestureKind::Pan, GestureKind::Swipe));
    }

    #[test]
    fn test_simultaneous_pairs_opt_in() {
        let config =
            GestureConfig::from_toml_str("simultaneous = [[\"pan\", \"swipe\"]]\n").expect("valid config");
        let policy = config.policy();
        assert!(policy.allows(GestureKind::Swipe, GestureKind::Pan));
        assert!(!policy.allows(GestureKind::Pinch, GestureKind::Rotate));
    }

    #[test]
    fn test_toml_string_parses_back() {
        let mut config = GestureConfig::default();
        config.press.enabled = false;
        config.swipe.direction = Direction::HORIZONTAL;

        let text = config.to_toml_string().expect("serializable");
        assert_eq!(GestureConfig::from_toml_str(&text), Ok(config));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("horizon-gestures-{}.toml", std::process::id()));
        std::fs::write(&path, "[press]\nhold_time_ms = 650\n").expect("write config");
        let loaded = GestureConfig::from_file(&path);
        std::fs::remove_file(&path).expect("remove config");

        assert_eq!(loaded.expect("valid config").press.hold_time_ms, 650);
        assert!(matches!(
            GestureConfig::from_file(&path),
            Err(GestureError::Config(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = GestureConfig::from_toml_str("[tap]\ntaps = 0\n").expect_err("zero taps");
        assert!(matches!(err, GestureError::Config(ref message) if message.contains("tap.taps")));

        let err = GestureConfig::from_toml_str("[pan]\nthreshold = -1.0\n").expect_err("negative");
        assert!(matches!(err, GestureError::Config(ref message) if message.contains("pan.threshold")));

        assert!(GestureConfig::from_toml_str("[pan]\ndirection = [\"diagonal\"]\n").is_err());
        assert!(GestureConfig::from_toml_str("simultaneous = [[\"pan\", \"wobble\"]]\n").is_err());
    }

    #[test]
    fn test_from_config_builds_standard_set() {
        let manager = GestureManager::from_config(&GestureConfig::default()).expect("manager");
        let names: Vec<&str> = manager
            .ids()
            .filter_map(|id| manager.recognizer(id))
            .map(|recognizer| recognizer.name())
            .collect();
        assert_eq!(
            names,
            vec!["pan", "swipe", "pinch", "rotate", "doubletap", "tap", "press"]
        );

        let tap = manager.get("tap").expect("tap");
        let double_tap = manager.get("doubletap").expect("doubletap");
        let edges: Vec<_> = manager.failure_dependencies().copied().collect();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].waiting, tap);
        assert_eq!(edges[0].must_fail, double_tap);
    }

    #[test]
    fn test_disabled_double_tap_has_no_relation() {
        let mut config = GestureConfig::default();
        config.double_tap.enabled = false;
        let manager = GestureManager::from_config(&config).expect("manager");

        assert_eq!(manager.failure_dependencies().count(), 0);
        let double_tap = manager.get("doubletap").expect("doubletap");
        assert!(!manager.recognizer(double_tap).is_some_and(|r| r.is_enabled()));
    }
}
