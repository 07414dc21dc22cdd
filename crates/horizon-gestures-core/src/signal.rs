//! Subscriber registry for gesture notifications.
//!
//! A [`Signal<Args>`] holds a set of slots (callbacks) keyed by
//! [`ConnectionId`]. Emission invokes every slot directly on the emitting
//! thread, in connection order.
//!
//! Slots are isolated from one another: a panicking slot is caught and logged
//! and the remaining slots still run. Slots may connect or disconnect other
//! slots on the same signal while it is emitting; such changes take effect
//! from the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_gestures_core::Signal;
//!
//! let tapped = Signal::<u32>::new();
//! let id = tapped.connect(|count| println!("tapped {count} times"));
//! assert_eq!(tapped.emit(&2), 0); // no slot panicked
//! assert!(tapped.disconnect(id));
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Unique identifier for a signal-slot connection.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A set of callbacks invoked together when the signal is emitted.
pub struct Signal<Args> {
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block emission temporarily. While blocked, `emit()` does nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots.
    ///
    /// Returns the number of slots that panicked. Panics are logged at
    /// `error` level and never propagate to the caller.
    #[tracing::instrument(skip_all, target = "horizon_gestures::signal", level = "trace")]
    pub fn emit(&self, args: &Args) -> usize {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return 0;
        }

        // Snapshot so slots can touch the registry without deadlocking.
        let slots: Vec<(ConnectionId, Slot<Args>)> = self
            .connections
            .lock()
            .iter()
            .map(|(id, slot)| (id, Arc::clone(slot)))
            .collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        let mut panicked = 0;
        for (id, slot) in slots {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| slot(args))) {
                panicked += 1;
                tracing::error!(
                    target: targets::SIGNAL,
                    connection = ?id,
                    message = panic_message(payload.as_ref()),
                    "slot panicked during emit"
                );
            }
        }
        panicked
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "<non-string panic payload>"
    }
}

static_assertions::assert_impl_all!(Signal<u32>: Send, Sync);
