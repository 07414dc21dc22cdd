//! The gesture manager.
//!
//! [`GestureManager`] owns an ordered set of recognizers, feeds every input
//! sample to each of them, arbitrates between the ones that want to emit,
//! and delivers the surviving events to subscribers.
//!
//! # Dispatch cycle
//!
//! 1. The sample is validated; timers due at or before its timestamp fire.
//! 2. A START with one touch opens a new session.
//! 3. Each recognizer, in registration order, processes the sample unless it
//!    is disabled or excluded by the session's claimant.
//! 4. Recognizers that reached an emitting state are ordered by priority and
//!    checked against the simultaneity policy and any per-pair override; the
//!    first to emit claims the session.
//! 5. Require-failure edges decide whether each event goes out now, waits
//!    for its sources to fail, or is dropped.
//! 6. Events are delivered to subscribers and returned to the caller.
//!
//! # Timers
//!
//! Taps and presses own deadlines on the host clock. The host calls
//! [`GestureManager::advance`] when [`GestureManager::next_deadline`] passes
//! (and `dispatch` does so implicitly for the sample's timestamp).
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use glam::Vec2;
//! use horizon_gestures::{EventType, GestureManager, InputSample, TapRecognizer};
//!
//! let mut manager = GestureManager::new();
//! manager.add(TapRecognizer::new());
//! manager.on("tap", |event| println!("tap at {}", event.center));
//!
//! let at = |ms| Duration::from_millis(ms);
//! manager.dispatch(&InputSample::new(EventType::Start, 1, Vec2::new(5.0, 5.0), at(0)))?;
//! let events = manager.dispatch(
//!     &InputSample::new(EventType::End, 0, Vec2::new(5.0, 5.0), at(80)).with_delta_time(at(80)),
//! )?;
//! assert_eq!(events.len(), 1);
//! # Ok::<(), horizon_gestures::GestureError>(())
//! ```

use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Duration;

use slotmap::SlotMap;

use horizon_gestures_core::logging::{span_names, targets};
use horizon_gestures_core::{ConnectionId, GestureError, Result, Signal};

use crate::arbitration::{
    FailureDependency, FailureGraph, FailureVerdict, GesturePriority, SimultaneityOverrides,
    SimultaneousGesturePolicy, SourceStatus, failure_verdict,
};
use crate::event::{GestureEvent, GestureKind};
use crate::input::{EventType, InputSample};
use crate::recognizer::{Recognizer, RecognizerContext, RecognizerId};
use crate::state::GestureState;
use crate::touch_action::{TouchAction, TouchActions};

#[derive(Debug)]
struct Entry {
    recognizer: Box<dyn Recognizer>,
    priority: GesturePriority,
    deferred: Vec<GestureEvent>,
}

/// Per-session arbitration state.
#[derive(Debug, Clone, Copy, Default)]
struct Session {
    claimant: Option<RecognizerId>,
    stopped: bool,
}

/// Reset a recognizer and force it out of the current attempt.
fn force_out(entry: &mut Entry) {
    entry.recognizer.reset();
    entry.deferred.clear();
    let state = entry.recognizer.state();
    if !state.is_unsuccessful() {
        let forced = if state.is_active() {
            GestureState::Cancelled
        } else {
            GestureState::Failed
        };
        entry.recognizer.set_state(forced);
    }
}

/// Coordinates a set of recognizers over one input stream.
#[derive(Debug, Default)]
pub struct GestureManager {
    recognizers: SlotMap<RecognizerId, Entry>,
    order: Vec<RecognizerId>,
    failures: FailureGraph,
    overrides: SimultaneityOverrides,
    policy: SimultaneousGesturePolicy,
    handlers: HashMap<String, Signal<GestureEvent>>,
    session: Session,
}

impl GestureManager {
    /// Create an empty manager with the default simultaneity policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager with a custom simultaneity policy.
    pub fn with_policy(policy: SimultaneousGesturePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    // =========================================================================
    // Recognizer set
    // =========================================================================

    /// Register a recognizer at the end of the order.
    ///
    /// A recognizer with the same name is removed first.
    pub fn add<R: Recognizer + 'static>(&mut self, recognizer: R) -> RecognizerId {
        self.add_boxed(Box::new(recognizer))
    }

    /// Register a boxed recognizer at the end of the order.
    pub fn add_boxed(&mut self, recognizer: Box<dyn Recognizer>) -> RecognizerId {
        if let Some(existing) = self.get(recognizer.name()) {
            tracing::debug!(target: targets::MANAGER, name = recognizer.name(), "replacing recognizer");
            self.remove(existing);
        }
        tracing::debug!(
            target: targets::MANAGER,
            name = recognizer.name(),
            kind = %recognizer.kind(),
            "recognizer added"
        );
        let id = self.recognizers.insert(Entry {
            recognizer,
            priority: GesturePriority::default(),
            deferred: Vec::new(),
        });
        self.order.push(id);
        id
    }

    /// Unregister a recognizer, cancelling its timer and dropping its
    /// require-failure edges.
    pub fn remove(&mut self, id: RecognizerId) -> Option<Box<dyn Recognizer>> {
        let mut entry = self.recognizers.remove(id)?;
        self.order.retain(|other| *other != id);
        self.failures.remove_recognizer(id);
        self.overrides.remove_recognizer(id);
        if self.session.claimant == Some(id) {
            self.session.claimant = None;
        }
        entry.recognizer.reset();
        tracing::debug!(target: targets::MANAGER, name = entry.recognizer.name(), "recognizer removed");
        Some(entry.recognizer)
    }

    /// Look up a recognizer by name.
    pub fn get(&self, name: &str) -> Option<RecognizerId> {
        self.order.iter().copied().find(|id| {
            self.recognizers
                .get(*id)
                .is_some_and(|entry| entry.recognizer.name() == name)
        })
    }

    /// Borrow a recognizer.
    pub fn recognizer(&self, id: RecognizerId) -> Option<&dyn Recognizer> {
        self.recognizers.get(id).map(|entry| entry.recognizer.as_ref())
    }

    /// Current state of a recognizer.
    pub fn state(&self, id: RecognizerId) -> Option<GestureState> {
        self.recognizer(id).map(|recognizer| recognizer.state())
    }

    /// Registered recognizers in registration order.
    pub fn ids(&self) -> impl Iterator<Item = RecognizerId> + '_ {
        self.order.iter().copied()
    }

    /// Number of registered recognizers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no recognizer is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Enable or disable a recognizer.
    pub fn set_enabled(&mut self, id: RecognizerId, enabled: bool) -> Result<()> {
        let entry = self
            .recognizers
            .get_mut(id)
            .ok_or(GestureError::UnknownRecognizer)?;
        entry.recognizer.set_enabled(enabled);
        Ok(())
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Make `waiting` emit only after `must_fail` has failed.
    pub fn require_failure(&mut self, waiting: RecognizerId, must_fail: RecognizerId) -> Result<()> {
        self.check_relation_edit(waiting, must_fail)?;
        if self.failures.add(FailureDependency::new(waiting, must_fail)) {
            tracing::debug!(target: targets::MANAGER, ?waiting, ?must_fail, "require-failure added");
        }
        Ok(())
    }

    /// Remove a require-failure edge. Returns `true` if it existed.
    pub fn drop_require_failure(
        &mut self,
        waiting: RecognizerId,
        must_fail: RecognizerId,
    ) -> Result<bool> {
        self.check_relation_edit(waiting, must_fail)?;
        Ok(self
            .failures
            .remove(FailureDependency::new(waiting, must_fail)))
    }

    /// All require-failure edges.
    pub fn failure_dependencies(&self) -> impl Iterator<Item = &FailureDependency> {
        self.failures.iter()
    }

    fn check_relation_edit(&self, waiting: RecognizerId, must_fail: RecognizerId) -> Result<()> {
        if waiting == must_fail {
            return Err(GestureError::SelfDependency);
        }
        if !self.recognizers.contains_key(waiting) || !self.recognizers.contains_key(must_fail) {
            return Err(GestureError::UnknownRecognizer);
        }
        if self.is_in_flight() {
            return Err(GestureError::GestureInFlight);
        }
        Ok(())
    }

    /// Whether any recognizer is mid-attempt: begun, timing, or holding a
    /// deferred event.
    pub fn is_in_flight(&self) -> bool {
        self.recognizers.values().any(|entry| {
            entry.recognizer.state().is_active()
                || entry.recognizer.has_pending_timer()
                || !entry.deferred.is_empty()
        })
    }

    /// Set a recognizer's priority.
    pub fn set_priority(&mut self, id: RecognizerId, priority: GesturePriority) -> Result<()> {
        let entry = self
            .recognizers
            .get_mut(id)
            .ok_or(GestureError::UnknownRecognizer)?;
        entry.priority = priority;
        Ok(())
    }

    /// A recognizer's priority.
    pub fn priority(&self, id: RecognizerId) -> Option<GesturePriority> {
        self.recognizers.get(id).map(|entry| entry.priority)
    }

    /// Replace the simultaneity policy.
    pub fn set_policy(&mut self, policy: SimultaneousGesturePolicy) {
        self.policy = policy;
    }

    /// The simultaneity policy.
    pub fn policy(&self) -> &SimultaneousGesturePolicy {
        &self.policy
    }

    /// Let two kinds run at the same time.
    pub fn allow_simultaneous(&mut self, a: GestureKind, b: GestureKind) {
        self.policy.allow(a, b);
    }

    /// Let two recognizers run at the same time, whatever their kinds.
    pub fn recognize_with(&mut self, a: RecognizerId, b: RecognizerId) -> Result<()> {
        self.check_relation_edit(a, b)?;
        self.overrides.set(a, b, true);
        tracing::debug!(target: targets::MANAGER, ?a, ?b, "recognize-with added");
        Ok(())
    }

    /// Keep two recognizers apart, whatever their kinds.
    pub fn recognize_apart(&mut self, a: RecognizerId, b: RecognizerId) -> Result<()> {
        self.check_relation_edit(a, b)?;
        self.overrides.set(a, b, false);
        tracing::debug!(target: targets::MANAGER, ?a, ?b, "recognize-apart added");
        Ok(())
    }

    /// Remove the pair decision made by [`Self::recognize_with`] or
    /// [`Self::recognize_apart`], falling back to the kind policy. Returns
    /// `true` if one existed.
    pub fn drop_recognize_with(&mut self, a: RecognizerId, b: RecognizerId) -> Result<bool> {
        self.check_relation_edit(a, b)?;
        Ok(self.overrides.clear(a, b))
    }

    /// Whether two registered recognizers may run at the same time.
    pub fn can_run_together(&self, a: RecognizerId, b: RecognizerId) -> bool {
        if let Some(together) = self.overrides.get(a, b) {
            return together;
        }
        match (self.recognizers.get(a), self.recognizers.get(b)) {
            (Some(a), Some(b)) => self.policy.allows(a.recognizer.kind(), b.recognizer.kind()),
            _ => true,
        }
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Subscribe to a topic such as `pan`, `panstart` or `swipeleft`.
    pub fn on<F>(&mut self, topic: impl Into<String>, handler: F) -> ConnectionId
    where
        F: Fn(&GestureEvent) + Send + Sync + 'static,
    {
        self.handlers.entry(topic.into()).or_default().connect(handler)
    }

    /// Unsubscribe. Returns `true` if the subscription existed.
    pub fn off(&mut self, topic: &str, id: ConnectionId) -> bool {
        let Some(signal) = self.handlers.get(topic) else {
            return false;
        };
        let removed = signal.disconnect(id);
        if signal.connection_count() == 0 {
            self.handlers.remove(topic);
        }
        removed
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Feed one input sample to every recognizer.
    ///
    /// Returns the events emitted during this cycle, in delivery order,
    /// including any produced by timers that were due at the sample's
    /// timestamp. Samples with non-finite data are rejected before any
    /// recognizer sees them.
    #[tracing::instrument(
        name = "horizon_gestures::dispatch",
        skip_all,
        target = "horizon_gestures::manager",
        level = "trace",
        fields(event = %sample.event_type, touches = sample.touches_length)
    )]
    pub fn dispatch(&mut self, sample: &InputSample) -> Result<Vec<GestureEvent>> {
        if let Err(err) = sample.validate() {
            tracing::warn!(target: targets::MANAGER, %err, "rejected input sample");
            return Err(err);
        }

        let mut events = self.fire_timers(sample.time_stamp);

        if sample.event_type == EventType::Start && sample.touches_length == 1 {
            self.session = Session::default();
        }
        if !self.session.stopped {
            self.release_finished_claimant();
            let candidates = self.process_sample(sample);
            events.extend(self.arbitrate(candidates));
        }
        events.extend(self.flush_deferred());

        self.deliver(&events);
        Ok(events)
    }

    /// Fire every timer due at or before `now`.
    #[tracing::instrument(
        name = "horizon_gestures::advance",
        skip(self),
        target = "horizon_gestures::manager",
        level = "trace"
    )]
    pub fn advance(&mut self, now: Duration) -> Vec<GestureEvent> {
        let mut events = self.fire_timers(now);
        events.extend(self.flush_deferred());
        self.deliver(&events);
        events
    }

    /// The earliest armed recognizer deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.recognizers
            .values()
            .filter_map(|entry| entry.recognizer.next_deadline())
            .min()
    }

    /// Stop recognizing for the rest of the current session.
    ///
    /// Every recognizer is forced out of its attempt and its timer cancelled.
    /// Samples are ignored until the next START with a single touch.
    pub fn stop(&mut self) {
        tracing::debug!(target: targets::MANAGER, "session stopped");
        self.session.stopped = true;
        for entry in self.recognizers.values_mut() {
            if entry.recognizer.state().is_terminal() {
                entry.recognizer.reset();
                entry.deferred.clear();
            } else {
                force_out(entry);
            }
        }
    }

    /// The combined touch action of every enabled recognizer.
    pub fn touch_action(&self) -> TouchAction {
        let hints: TouchActions = self
            .recognizers
            .values()
            .filter(|entry| entry.recognizer.is_enabled())
            .map(|entry| entry.recognizer.touch_action())
            .collect();
        TouchAction::resolve(hints)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn context(&self, id: RecognizerId) -> RecognizerContext {
        RecognizerContext {
            has_require_failures: self.failures.has_sources(id),
        }
    }

    fn release_finished_claimant(&mut self) {
        let Some(claimant) = self.session.claimant else {
            return;
        };
        let finished = self
            .recognizers
            .get(claimant)
            .is_none_or(|entry| entry.recognizer.state().is_terminal());
        if finished {
            tracing::trace!(target: targets::MANAGER, ?claimant, "claimant released");
            self.session.claimant = None;
        }
    }

    /// Run every recognizer on the sample and return those ready to emit.
    fn process_sample(&mut self, sample: &InputSample) -> Vec<RecognizerId> {
        let claimant = self
            .session
            .claimant
            .filter(|id| self.recognizers.contains_key(*id));

        let mut candidates = Vec::new();
        for &id in &self.order {
            let ctx = RecognizerContext {
                has_require_failures: self.failures.has_sources(id),
            };
            let excluded = claimant
                .is_some_and(|claimant| claimant != id && !self.can_run_together(id, claimant));
            let Some(entry) = self.recognizers.get_mut(id) else {
                continue;
            };

            if !entry.recognizer.is_enabled() {
                entry.recognizer.reset();
                entry.deferred.clear();
                entry.recognizer.set_state(GestureState::Failed);
                continue;
            }

            if excluded {
                force_out(entry);
                continue;
            }

            if let Some(state) = entry.recognizer.recognize(sample, &ctx)
                && state.is_emittable()
            {
                candidates.push(id);
            }
        }
        candidates
    }

    fn verdict(&self, id: RecognizerId) -> FailureVerdict {
        failure_verdict(self.failures.sources(id).filter_map(|source| {
            let entry = self.recognizers.get(source)?;
            Some(SourceStatus {
                state: entry.recognizer.state(),
                pending_timer: entry.recognizer.has_pending_timer(),
            })
        }))
    }

    /// Resolve which of the ready recognizers may emit.
    fn arbitrate(&mut self, mut candidates: Vec<RecognizerId>) -> Vec<GestureEvent> {
        // Stable: equal priorities keep registration order.
        candidates.sort_by_key(|id| {
            Reverse(
                self.recognizers
                    .get(*id)
                    .map_or(GesturePriority::Low, |entry| entry.priority),
            )
        });

        let mut accepted: Vec<RecognizerId> = Vec::new();
        let mut events = Vec::new();
        for id in candidates {
            let excluded = self
                .session
                .claimant
                .is_some_and(|claimant| claimant != id && !self.can_run_together(id, claimant))
                || accepted
                    .iter()
                    .any(|&other| !self.can_run_together(id, other));
            let verdict = self.verdict(id);

            let Some(entry) = self.recognizers.get_mut(id) else {
                continue;
            };
            let Some(mut event) = entry.recognizer.emit() else {
                continue;
            };
            event.recognizer = id;

            if excluded {
                tracing::debug!(target: targets::MANAGER, name = %event.name, "lost to a competing gesture");
                force_out(entry);
                continue;
            }

            match verdict {
                FailureVerdict::Block => {
                    tracing::debug!(
                        target: targets::MANAGER,
                        name = %event.name,
                        "required failure did not happen"
                    );
                    force_out(entry);
                    continue;
                }
                FailureVerdict::Defer => {
                    // Held events do not claim the session until released.
                    tracing::debug!(target: targets::MANAGER, name = %event.name, "emission deferred");
                    entry.deferred.push(event);
                    continue;
                }
                FailureVerdict::Emit => {
                    tracing::debug!(
                        target: targets::MANAGER,
                        name = %event.name,
                        phase = ?event.phase,
                        "gesture emitted"
                    );
                    events.append(&mut entry.deferred);
                    events.push(event);
                }
            }

            accepted.push(id);
            if self.session.claimant.is_none() {
                tracing::trace!(target: targets::MANAGER, claimant = ?id, "session claimed");
                self.session.claimant = Some(id);
            }
        }
        events
    }

    /// Re-check every deferred emission against its sources.
    fn flush_deferred(&mut self) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        for index in 0..self.order.len() {
            let id = self.order[index];
            let waiting = self
                .recognizers
                .get(id)
                .is_some_and(|entry| !entry.deferred.is_empty());
            if !waiting {
                continue;
            }
            let verdict = self.verdict(id);
            let excluded = self
                .session
                .claimant
                .is_some_and(|claimant| claimant != id && !self.can_run_together(id, claimant));
            let Some(entry) = self.recognizers.get_mut(id) else {
                continue;
            };

            if entry.recognizer.state().is_unsuccessful() {
                entry.deferred.clear();
                continue;
            }
            match verdict {
                FailureVerdict::Emit if excluded => {
                    tracing::debug!(
                        target: targets::MANAGER,
                        name = entry.recognizer.name(),
                        "deferred emission lost to a competing gesture"
                    );
                    force_out(entry);
                }
                FailureVerdict::Emit => {
                    tracing::debug!(
                        target: targets::MANAGER,
                        name = entry.recognizer.name(),
                        count = entry.deferred.len(),
                        "deferred emission released"
                    );
                    events.append(&mut entry.deferred);
                    if self.session.claimant.is_none() {
                        self.session.claimant = Some(id);
                    }
                }
                FailureVerdict::Block => {
                    tracing::debug!(
                        target: targets::MANAGER,
                        name = entry.recognizer.name(),
                        "required failure did not happen"
                    );
                    force_out(entry);
                }
                FailureVerdict::Defer => {}
            }
        }
        events
    }

    /// Fire due timers in deadline order and arbitrate what they produce.
    fn fire_timers(&mut self, now: Duration) -> Vec<GestureEvent> {
        let mut due: Vec<(Duration, usize, RecognizerId)> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(index, &id)| {
                let deadline = self.recognizers.get(id)?.recognizer.next_deadline()?;
                (deadline <= now).then_some((deadline, index, id))
            })
            .collect();
        due.sort();

        let mut events = Vec::new();
        for (deadline, _, id) in due {
            let ctx = self.context(id);
            let Some(entry) = self.recognizers.get_mut(id) else {
                continue;
            };
            if let Some(state) = entry.recognizer.poll_timer(deadline, &ctx)
                && state.is_emittable()
                && !self.session.stopped
            {
                events.extend(self.arbitrate(vec![id]));
            }
        }
        events
    }

    fn deliver(&self, events: &[GestureEvent]) {
        if events.is_empty() {
            return;
        }
        let _span = tracing::trace_span!(target: targets::MANAGER, span_names::DELIVER, count = events.len())
            .entered();
        for event in events {
            for topic in event.topics() {
                if let Some(signal) = self.handlers.get(&topic) {
                    signal.emit(event);
                }
            }
        }
    }
}

static_assertions::assert_impl_all!(GestureManager: Send);
