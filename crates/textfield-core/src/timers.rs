//! Scheduled Actions
//!
//! The core owns no thread and no clock. Recurring behavior (caret blink, drag auto-scroll,
//! step button repeat) is kept as a set of `(kind, deadline)` entries; the host asks for the
//! earliest deadline, sleeps until then and calls back with the current time. Each fired
//! action tells the set whether to re-arm or cancel itself.

use std::collections::BTreeMap;
use std::time::Duration;

/// Caret blink half-period.
pub const CARET_BLINK_INTERVAL: Duration = Duration::from_millis(500);

/// Auto-scroll period while dragging outside the viewport.
pub const AUTO_SCROLL_INTERVAL: Duration = Duration::from_millis(50);

/// Identity of a scheduled action. At most one entry per kind is armed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    /// Toggle caret visibility.
    CaretBlink,
    /// Scroll toward the pointer and extend the selection.
    AutoScroll,
    /// Repeat a held step button.
    SpinRepeat,
}

/// What a fired action wants next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Fire again after this delay.
    Rearm(Duration),
    /// Stop.
    Cancel,
}

/// Armed actions keyed by kind.
#[derive(Debug, Clone, Default)]
pub struct TimerSet {
    deadlines: BTreeMap<TimerKind, Duration>,
}

impl TimerSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` to fire at `deadline`, replacing any previous deadline.
    pub fn arm(&mut self, kind: TimerKind, deadline: Duration) {
        self.deadlines.insert(kind, deadline);
    }

    /// Disarm `kind`. Safe to call when it is not armed.
    pub fn cancel(&mut self, kind: TimerKind) {
        self.deadlines.remove(&kind);
    }

    /// Disarm everything.
    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    /// Whether `kind` is armed.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    /// Deadline of `kind`, if armed.
    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.deadlines.get(&kind).copied()
    }

    /// Earliest deadline across all armed actions.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn take_due(&mut self, now: Duration) -> Vec<(TimerKind, Duration)> {
        let mut due: Vec<(TimerKind, Duration)> = self
            .deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(kind, deadline)| (*kind, *deadline))
            .collect();
        due.sort_by_key(|(_, deadline)| *deadline);
        for (kind, _) in &due {
            self.deadlines.remove(kind);
        }
        due
    }

    /// Apply the outcome of a fired action.
    pub fn resolve(&mut self, kind: TimerKind, action: TimerAction, now: Duration) {
        match action {
            TimerAction::Rearm(delay) => self.arm(kind, now + delay),
            TimerAction::Cancel => self.cancel(kind),
        }
    }
}
