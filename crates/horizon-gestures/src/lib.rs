//! Horizon Gestures - multi-pointer gesture recognition.
//!
//! Feed normalized pointer samples to a [`GestureManager`]; it runs them
//! through a set of recognizers and delivers gesture events to subscribers.
//!
//! # Features
//!
//! - **Continuous gestures**: [`PanRecognizer`], [`SwipeRecognizer`],
//!   [`PinchRecognizer`], [`RotateRecognizer`]
//! - **Discrete gestures**: [`TapRecognizer`] (single or multi-tap) and
//!   [`PressRecognizer`], driven by host-clock timers
//! - **Arbitration**: require-failure edges, a per-kind simultaneity policy
//!   with per-pair overrides, and per-recognizer priority
//! - **Touch action**: the combined browser-style `touch-action` hint of the
//!   active recognizers
//! - **Configuration**: TOML via [`GestureConfig`]
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use glam::Vec2;
//! use horizon_gestures::{EventType, GestureConfig, GestureManager, InputSession};
//!
//! let mut manager = GestureManager::from_config(&GestureConfig::default())?;
//! manager.on("panstart", |event| println!("pan began at {}", event.center));
//!
//! let mut session = InputSession::new();
//! let at = Duration::from_millis;
//! manager.dispatch(&session.sample(EventType::Start, &[Vec2::new(0.0, 0.0)], at(0)))?;
//! let events = manager.dispatch(&session.sample(EventType::Move, &[Vec2::new(30.0, 2.0)], at(16)))?;
//! assert_eq!(events[0].name, "pan");
//! # Ok::<(), horizon_gestures::GestureError>(())
//! ```

pub mod arbitration;
pub mod config;
pub mod event;
pub mod input;
pub mod manager;
pub mod recognizer;
pub mod session;
pub mod state;
pub mod touch_action;

pub use horizon_gestures_core::{ConnectionId, GestureError, Result};

pub use arbitration::{
    FailureDependency, GesturePriority, SimultaneityOverrides, SimultaneousGesturePolicy,
};
pub use config::GestureConfig;
pub use event::{GestureEvent, GestureKind, GesturePhase, PinchDirection, SwipeDirection};
pub use input::{Direction, EventType, InputSample};
pub use manager::GestureManager;
pub use recognizer::{
    PanRecognizer, PinchRecognizer, PressRecognizer, Recognizer, RecognizerId, RotateRecognizer,
    SwipeRecognizer, TapRecognizer,
};
pub use session::InputSession;
pub use state::GestureState;
pub use touch_action::{TouchAction, TouchActions};
