//! Coordination rules between recognizers.
//!
//! Four pieces of explicit data decide who may emit when several recognizers
//! match the same input:
//!
//! - [`FailureGraph`]: directed require-failure edges. A waiting recognizer
//!   may only emit once every recognizer it depends on has failed.
//! - [`SimultaneousGesturePolicy`]: which gesture kinds may run at the same
//!   time. Kinds that may not are mutually exclusive: the first to emit in a
//!   session claims it and the rest are cancelled.
//! - [`SimultaneityOverrides`]: the same decision for one pair of
//!   recognizers, taking precedence over the kind policy.
//! - [`GesturePriority`]: when several recognizers become ready on the same
//!   sample, higher priority gets first claim.

use std::collections::HashMap;

use crate::event::{ALL_GESTURE_KINDS, GestureKind};
use crate::recognizer::RecognizerId;
use crate::state::GestureState;

/// Priority level for gesture recognition.
///
/// Higher priority recognizers get first claim when conflicts occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GesturePriority {
    /// Low priority - claims last.
    Low = 0,
    /// Normal priority - default for every recognizer.
    #[default]
    Normal = 1,
    /// High priority - claims first.
    High = 2,
}

/// Which gesture kinds may be recognized at the same time.
///
/// Stored as a symmetric mask per kind. A fresh policy lets recognizers of
/// the same kind coexist and keeps different kinds apart; either can be
/// changed, including forbidding a kind from running alongside itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimultaneousGesturePolicy {
    masks: [u8; KIND_COUNT],
}

const KIND_COUNT: usize = ALL_GESTURE_KINDS.len();

const fn kind_bit(kind: GestureKind) -> u8 {
    1 << kind as u8
}

impl Default for SimultaneousGesturePolicy {
    /// Pinch and rotate together, plus same-kind pairs.
    fn default() -> Self {
        let mut policy = Self::new();
        policy.allow(GestureKind::Pinch, GestureKind::Rotate);
        policy
    }
}

impl SimultaneousGesturePolicy {
    /// Same kinds coexist, different kinds are exclusive.
    pub fn new() -> Self {
        let mut masks = [0; KIND_COUNT];
        for &kind in ALL_GESTURE_KINDS {
            masks[kind as usize] = kind_bit(kind);
        }
        Self { masks }
    }

    /// Every kind coexists with every other.
    pub fn allow_all() -> Self {
        let all = ALL_GESTURE_KINDS.iter().fold(0, |mask, &kind| mask | kind_bit(kind));
        Self { masks: [all; KIND_COUNT] }
    }

    /// Let `a` and `b` run together.
    pub fn allow(&mut self, a: GestureKind, b: GestureKind) {
        self.masks[a as usize] |= kind_bit(b);
        self.masks[b as usize] |= kind_bit(a);
    }

    /// Keep `a` and `b` apart.
    pub fn forbid(&mut self, a: GestureKind, b: GestureKind) {
        self.masks[a as usize] &= !kind_bit(b);
        self.masks[b as usize] &= !kind_bit(a);
    }

    /// Whether `a` and `b` may run together.
    pub fn allows(&self, a: GestureKind, b: GestureKind) -> bool {
        self.masks[a as usize] & kind_bit(b) != 0
    }

    /// Allowed pairs of distinct kinds, each reported once.
    pub fn pairs(&self) -> impl Iterator<Item = (GestureKind, GestureKind)> + '_ {
        ALL_GESTURE_KINDS.iter().enumerate().flat_map(move |(index, &a)| {
            ALL_GESTURE_KINDS[index + 1..]
                .iter()
                .filter(move |&&b| self.allows(a, b))
                .map(move |&b| (a, b))
        })
    }
}

/// A dependency that requires one recognizer to fail before another emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FailureDependency {
    /// The recognizer that must wait.
    pub waiting: RecognizerId,
    /// The recognizer that must fail first.
    pub must_fail: RecognizerId,
}

impl FailureDependency {
    /// Creates a new failure dependency.
    pub fn new(waiting: RecognizerId, must_fail: RecognizerId) -> Self {
        Self { waiting, must_fail }
    }
}

/// The set of require-failure edges.
#[derive(Debug, Clone, Default)]
pub struct FailureGraph {
    dependencies: Vec<FailureDependency>,
}

impl FailureGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Returns `false` if it already existed.
    pub fn add(&mut self, dependency: FailureDependency) -> bool {
        if self.dependencies.contains(&dependency) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    /// Remove an edge. Returns `true` if it existed.
    pub fn remove(&mut self, dependency: FailureDependency) -> bool {
        let before = self.dependencies.len();
        self.dependencies.retain(|existing| *existing != dependency);
        self.dependencies.len() != before
    }

    /// Drop every edge touching `id`.
    pub fn remove_recognizer(&mut self, id: RecognizerId) {
        self.dependencies
            .retain(|dependency| dependency.waiting != id && dependency.must_fail != id);
    }

    /// Recognizers that must fail before `waiting` may emit.
    pub fn sources(&self, waiting: RecognizerId) -> impl Iterator<Item = RecognizerId> + '_ {
        self.dependencies
            .iter()
            .filter(move |dependency| dependency.waiting == waiting)
            .map(|dependency| dependency.must_fail)
    }

    /// Whether `waiting` has any require-failure edge.
    pub fn has_sources(&self, waiting: RecognizerId) -> bool {
        self.sources(waiting).next().is_some()
    }

    /// All edges in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FailureDependency> {
        self.dependencies.iter()
    }
}

/// Per-recognizer simultaneity overrides.
///
/// An entry decides for one pair of recognizers whether they may run
/// together, whatever the kind policy says about their kinds.
#[derive(Debug, Clone, Default)]
pub struct SimultaneityOverrides {
    pairs: HashMap<(RecognizerId, RecognizerId), bool>,
}

fn unordered(a: RecognizerId, b: RecognizerId) -> (RecognizerId, RecognizerId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl SimultaneityOverrides {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the pair. Returns the previous decision.
    pub fn set(&mut self, a: RecognizerId, b: RecognizerId, together: bool) -> Option<bool> {
        self.pairs.insert(unordered(a, b), together)
    }

    /// Forget the pair. Returns `true` if it had a decision.
    pub fn clear(&mut self, a: RecognizerId, b: RecognizerId) -> bool {
        self.pairs.remove(&unordered(a, b)).is_some()
    }

    /// The decision for a pair, if any.
    pub fn get(&self, a: RecognizerId, b: RecognizerId) -> Option<bool> {
        self.pairs.get(&unordered(a, b)).copied()
    }

    /// Drop every decision involving `id`.
    pub fn remove_recognizer(&mut self, id: RecognizerId) {
        self.pairs.retain(|&(a, b), _| a != id && b != id);
    }

    /// Number of decided pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no pair is decided.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Outcome of the require-failure check for a ready recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureVerdict {
    /// Every source has failed or is idle: emit now.
    Emit,
    /// A source is still deciding: hold the event.
    Defer,
    /// A source succeeded: the waiting recognizer must fail.
    Block,
}

/// What the verdict needs to know about one source recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceStatus {
    /// The source's state.
    pub state: GestureState,
    /// Whether the source still has a timer armed.
    pub pending_timer: bool,
}

/// Decide whether a waiting recognizer may emit, given its sources.
///
/// A source counts as failed when it is Failed or Cancelled, or when it sits
/// in Possible with nothing pending (it saw no matching input at all).
pub fn failure_verdict(sources: impl IntoIterator<Item = SourceStatus>) -> FailureVerdict {
    let mut verdict = FailureVerdict::Emit;
    for source in sources {
        match source.state {
            GestureState::Began | GestureState::Changed | GestureState::Recognized => {
                return FailureVerdict::Block;
            }
            GestureState::Possible if source.pending_timer => verdict = FailureVerdict::Defer,
            GestureState::Possible | GestureState::Failed | GestureState::Cancelled => {}
        }
    }
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(count: usize) -> Vec<RecognizerId> {
        let mut map: SlotMap<RecognizerId, ()> = SlotMap::with_key();
        (0..count).map(|_| map.insert(())).collect()
    }

    fn status(state: GestureState, pending_timer: bool) -> SourceStatus {
        SourceStatus { state, pending_timer }
    }

    // =========================================================================
    // SimultaneousGesturePolicy
    // =========================================================================

    #[test]
    fn test_default_policy_allows_pinch_rotate() {
        let policy = SimultaneousGesturePolicy::default();
        assert!(policy.allows(GestureKind::Pinch, GestureKind::Rotate));
        assert!(policy.allows(GestureKind::Rotate, GestureKind::Pinch));
        assert!(policy.allows(GestureKind::Tap, GestureKind::Tap));
        assert!(!policy.allows(GestureKind::Pan, GestureKind::Pinch));
        assert!(!policy.allows(GestureKind::Pan, GestureKind::Swipe));
        assert_eq!(
            policy.pairs().collect::<Vec<_>>(),
            vec![(GestureKind::Pinch, GestureKind::Rotate)]
        );
    }

    #[test]
    fn test_allow_and_forbid_are_symmetric() {
        let mut policy = SimultaneousGesturePolicy::new();
        policy.allow(GestureKind::Swipe, GestureKind::Pan);
        assert!(policy.allows(GestureKind::Pan, GestureKind::Swipe));
        assert_eq!(policy.pairs().count(), 1);

        policy.forbid(GestureKind::Pan, GestureKind::Swipe);
        assert!(!policy.allows(GestureKind::Swipe, GestureKind::Pan));
        assert_eq!(policy, SimultaneousGesturePolicy::new());
    }

    #[test]
    fn test_same_kind_can_be_forbidden() {
        let mut policy = SimultaneousGesturePolicy::new();
        policy.forbid(GestureKind::Pan, GestureKind::Pan);
        assert!(!policy.allows(GestureKind::Pan, GestureKind::Pan));
        assert!(policy.allows(GestureKind::Tap, GestureKind::Tap));
    }

    #[test]
    fn test_kind_list_matches_discriminants() {
        for (index, &kind) in ALL_GESTURE_KINDS.iter().enumerate() {
            assert_eq!(kind as usize, index);
        }
    }

    #[test]
    fn test_allow_all() {
        let policy = SimultaneousGesturePolicy::allow_all();
        for &a in ALL_GESTURE_KINDS {
            for &b in ALL_GESTURE_KINDS {
                assert!(policy.allows(a, b));
            }
        }
        assert_eq!(policy.pairs().count(), 15);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(GesturePriority::High > GesturePriority::Normal);
        assert!(GesturePriority::Normal > GesturePriority::Low);
        assert_eq!(GesturePriority::default(), GesturePriority::Normal);
    }

    // =========================================================================
    // FailureGraph
    // =========================================================================

    #[test]
    fn test_failure_graph_edges() {
        let ids = ids(3);
        let mut graph = FailureGraph::new();
        assert!(graph.add(FailureDependency::new(ids[0], ids[1])));
        assert!(!graph.add(FailureDependency::new(ids[0], ids[1])));
        assert!(graph.add(FailureDependency::new(ids[0], ids[2])));

        assert!(graph.has_sources(ids[0]));
        assert!(!graph.has_sources(ids[1]));
        assert_eq!(graph.sources(ids[0]).collect::<Vec<_>>(), vec![ids[1], ids[2]]);

        assert!(graph.remove(FailureDependency::new(ids[0], ids[1])));
        assert!(!graph.remove(FailureDependency::new(ids[0], ids[1])));

        graph.remove_recognizer(ids[2]);
        assert_eq!(graph.iter().count(), 0);
    }

    #[test]
    fn test_overrides_ignore_pair_order() {
        let ids = ids(3);
        let mut overrides = SimultaneityOverrides::new();
        assert_eq!(overrides.set(ids[0], ids[1], true), None);
        assert_eq!(overrides.get(ids[1], ids[0]), Some(true));
        assert_eq!(overrides.set(ids[1], ids[0], false), Some(true));
        assert_eq!(overrides.get(ids[0], ids[1]), Some(false));
        assert_eq!(overrides.get(ids[0], ids[2]), None);

        overrides.set(ids[2], ids[0], true);
        overrides.remove_recognizer(ids[1]);
        assert_eq!(overrides.len(), 1);
        assert!(overrides.clear(ids[0], ids[2]));
        assert!(!overrides.clear(ids[0], ids[2]));
        assert!(overrides.is_empty());
    }

    // =========================================================================
    // failure_verdict
    // =========================================================================

    #[test]
    fn test_verdict_emit_when_sources_failed_or_idle() {
        assert_eq!(failure_verdict([]), FailureVerdict::Emit);
        assert_eq!(
            failure_verdict([
                status(GestureState::Failed, false),
                status(GestureState::Cancelled, false),
                status(GestureState::Possible, false),
            ]),
            FailureVerdict::Emit
        );
    }

    #[test]
    fn test_verdict_defers_on_pending_source() {
        assert_eq!(
            failure_verdict([status(GestureState::Possible, true)]),
            FailureVerdict::Defer
        );
    }

    #[test]
    fn test_verdict_blocks_on_successful_source() {
        for state in [GestureState::Began, GestureState::Changed, GestureState::Recognized] {
            assert_eq!(
                failure_verdict([status(GestureState::Possible, true), status(state, false)]),
                FailureVerdict::Block
            );
        }
    }
}
