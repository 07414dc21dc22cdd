//! Logging targets for Horizon Gestures.
//!
//! Horizon Gestures uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the host installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_gestures::manager=debug")
//!     .init();
//! ```
//!
//! Levels follow one convention across the workspace: recognizer state
//! transitions at `trace`, emissions and arbitration outcomes at `debug`,
//! rejected input at `warn`, and panicking subscribers at `error`.

/// Span names used by instrumented entry points.
///
/// `#[instrument]` needs literals, so the attributes repeat these values.
pub mod span_names {
    /// Sample dispatch span.
    pub const DISPATCH: &str = "horizon_gestures::dispatch";
    /// Timer advancement span.
    pub const ADVANCE: &str = "horizon_gestures::advance";
    /// Subscriber delivery span.
    pub const DELIVER: &str = "horizon_gestures::deliver";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Gesture manager: dispatch, arbitration, delivery.
    pub const MANAGER: &str = "horizon_gestures::manager";
    /// Recognizer state machines.
    pub const RECOGNIZER: &str = "horizon_gestures::recognizer";
    /// Recognizer-owned timers.
    pub const TIMER: &str = "horizon_gestures::timer";
    /// Subscriber registry.
    pub const SIGNAL: &str = "horizon_gestures::signal";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_share_prefix() {
        for target in [
            targets::MANAGER,
            targets::RECOGNIZER,
            targets::TIMER,
            targets::SIGNAL,
            span_names::DISPATCH,
            span_names::ADVANCE,
            span_names::DELIVER,
        ] {
            assert!(target.starts_with("horizon_gestures::"));
        }
    }
}
