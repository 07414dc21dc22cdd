//! Core systems for Horizon Gestures.
//!
//! This crate provides the foundation the gesture engine is built on:
//!
//! - **Errors**: [`GestureError`] and the crate-wide [`Result`] alias
//! - **Logging**: `tracing` target and span name constants
//! - **Signals**: [`Signal`], a subscriber registry with panic isolation
//! - **Timers**: [`GestureTimer`], a cancellable one-shot deadline on the host clock
//!
//! # Signal Example
//!
//! ```
//! use horizon_gestures_core::Signal;
//!
//! let swiped = Signal::<&'static str>::new();
//! let id = swiped.connect(|direction| println!("swiped {direction}"));
//! swiped.emit(&"left");
//! swiped.disconnect(id);
//! ```

pub mod error;
pub mod logging;
pub mod signal;
pub mod timer;

pub use error::{GestureError, Result};
pub use signal::{ConnectionId, Signal};
pub use timer::GestureTimer;
