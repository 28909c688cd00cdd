//! Exercise counters with optimistic updates
//!
//! A change is applied to the displayed value immediately, then the server
//! call either confirms it (the server's count becomes authoritative) or
//! fails, in which case the change's delta is subtracted again.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Built-in exercises tracked by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseKind {
    Pushups,
    Pullups,
}

impl ExerciseKind {
    /// Path segment of the counter endpoint
    pub fn path(&self) -> &'static str {
        match self {
            ExerciseKind::Pushups => "pushups",
            ExerciseKind::Pullups => "pullups",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ExerciseKind::Pushups => "Pushups",
            ExerciseKind::Pullups => "Pull-ups",
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single counter adjustment, as understood by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExerciseChange {
    #[serde(rename = "increase")]
    Increase,
    #[serde(rename = "increase10")]
    IncreaseTen,
    #[serde(rename = "decrease")]
    Decrease,
    #[serde(rename = "decrease10")]
    DecreaseTen,
}

impl ExerciseChange {
    /// Wire name sent in the `change` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseChange::Increase => "increase",
            ExerciseChange::IncreaseTen => "increase10",
            ExerciseChange::Decrease => "decrease",
            ExerciseChange::DecreaseTen => "decrease10",
        }
    }

    /// Signed amount the change adds to the count
    pub fn delta(&self) -> i64 {
        match self {
            ExerciseChange::Increase => 1,
            ExerciseChange::IncreaseTen => 10,
            ExerciseChange::Decrease => -1,
            ExerciseChange::DecreaseTen => -10,
        }
    }

    /// Short label such as `+10`
    pub fn label(&self) -> &'static str {
        match self {
            ExerciseChange::Increase => "+1",
            ExerciseChange::IncreaseTen => "+10",
            ExerciseChange::Decrease => "-1",
            ExerciseChange::DecreaseTen => "-10",
        }
    }
}

impl fmt::Display for ExerciseChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A change that has been applied locally and awaits the server's answer
///
/// Not `Clone`: each pending change is settled exactly once.
#[derive(Debug)]
#[must_use = "a pending change must be confirmed or rolled back"]
pub struct PendingChange {
    change: ExerciseChange,
}

impl PendingChange {
    pub fn change(&self) -> ExerciseChange {
        self.change
    }
}

/// Displayed value of a counter plus its synchronization state
#[derive(Debug, Clone, Default)]
pub struct OptimisticCounter {
    value: i64,
    in_flight: usize,
    /// Summed delta of applied changes the server has not settled yet
    pending_delta: i64,
    last_synced: Option<DateTime<Utc>>,
}

impl OptimisticCounter {
    /// Counter initialised from a server count
    pub fn from_server(value: i64) -> Self {
        Self {
            value,
            in_flight: 0,
            pending_delta: 0,
            last_synced: Some(Utc::now()),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// Whether any applied change still awaits the server
    pub fn is_syncing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// When the value last came from the server
    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }

    /// Apply a change locally before the server has seen it
    pub fn apply(&mut self, change: ExerciseChange) -> PendingChange {
        self.value += change.delta();
        self.pending_delta += change.delta();
        self.in_flight += 1;
        PendingChange { change }
    }

    /// The server accepted the change and reported its count
    ///
    /// The server count becomes the base; changes still in flight stay
    /// applied on top of it.
    pub fn confirm(&mut self, pending: PendingChange, server_count: i64) {
        self.settle_one(&pending);
        self.value = server_count + self.pending_delta;
        self.last_synced = Some(Utc::now());
    }

    /// The server call failed; undo the change's delta
    pub fn rollback(&mut self, pending: PendingChange) {
        self.settle_one(&pending);
        self.value -= pending.change.delta();
    }

    fn settle_one(&mut self, pending: &PendingChange) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pending_delta = if self.in_flight == 0 {
            0
        } else {
            self.pending_delta - pending.change.delta()
        };
    }

    /// Settle a pending change with the outcome of its server call
    ///
    /// Returns the error back to the caller after rolling back.
    pub fn settle<E>(&mut self, pending: PendingChange, outcome: Result<i64, E>) -> Result<i64, E> {
        match outcome {
            Ok(count) => {
                self.confirm(pending, count);
                Ok(count)
            }
            Err(e) => {
                self.rollback(pending);
                Err(e)
            }
        }
    }

    /// Take a fresh server count unless local changes are in flight
    ///
    /// Returns whether the value was applied.
    pub fn refresh(&mut self, server_count: i64) -> bool {
        if self.is_syncing() {
            return false;
        }
        self.value = server_count;
        self.last_synced = Some(Utc::now());
        true
    }

    /// Overwrite the value unconditionally (initial load)
    pub fn reset(&mut self, server_count: i64) {
        self.value = server_count;
        self.in_flight = 0;
        self.pending_delta = 0;
        self.last_synced = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_wire_names_and_deltas() {
        assert_eq!(ExerciseChange::Increase.as_str(), "increase");
        assert_eq!(ExerciseChange::IncreaseTen.as_str(), "increase10");
        assert_eq!(ExerciseChange::Decrease.as_str(), "decrease");
        assert_eq!(ExerciseChange::DecreaseTen.as_str(), "decrease10");

        assert_eq!(ExerciseChange::IncreaseTen.delta(), 10);
        assert_eq!(ExerciseChange::DecreaseTen.delta(), -10);
        assert_eq!(
            serde_json::to_string(&ExerciseChange::DecreaseTen).unwrap(),
            "\"decrease10\""
        );
    }

    #[test]
    fn test_apply_is_visible_immediately() {
        let mut counter = OptimisticCounter::from_server(5);
        let pending = counter.apply(ExerciseChange::IncreaseTen);
        assert_eq!(counter.value(), 15);
        assert!(counter.is_syncing());

        counter.confirm(pending, 15);
        assert_eq!(counter.value(), 15);
        assert!(!counter.is_syncing());
    }

    #[test]
    fn test_server_count_is_authoritative() {
        let mut counter = OptimisticCounter::from_server(5);
        let pending = counter.apply(ExerciseChange::Increase);
        // Another device added ten in the meantime
        counter.confirm(pending, 16);
        assert_eq!(counter.value(), 16);
    }

    #[test]
    fn test_rollback_restores_previous_value() {
        let mut counter = OptimisticCounter::from_server(3);
        let pending = counter.apply(ExerciseChange::DecreaseTen);
        assert_eq!(counter.value(), -7);

        counter.rollback(pending);
        assert_eq!(counter.value(), 3);
        assert_eq!(counter.in_flight(), 0);
    }

    #[test]
    fn test_rollback_keeps_other_in_flight_changes() {
        let mut counter = OptimisticCounter::from_server(0);
        let first = counter.apply(ExerciseChange::Increase);
        let second = counter.apply(ExerciseChange::IncreaseTen);
        assert_eq!(counter.value(), 11);

        counter.rollback(first);
        assert_eq!(counter.value(), 10);
        assert!(counter.is_syncing());

        counter.confirm(second, 10);
        assert_eq!(counter.value(), 10);
        assert!(!counter.is_syncing());
    }

    #[test]
    fn test_confirm_keeps_later_change_until_it_settles() {
        let mut counter = OptimisticCounter::from_server(0);
        let first = counter.apply(ExerciseChange::Increase);
        let second = counter.apply(ExerciseChange::IncreaseTen);

        counter.confirm(first, 1);
        assert_eq!(counter.value(), 11);
        assert_eq!(counter.in_flight(), 1);

        counter.rollback(second);
        assert_eq!(counter.value(), 1);
        assert!(!counter.is_syncing());
    }

    #[test]
    fn test_confirms_in_any_order_end_at_server_count() {
        let mut counter = OptimisticCounter::from_server(20);
        let first = counter.apply(ExerciseChange::DecreaseTen);
        let second = counter.apply(ExerciseChange::Decrease);
        let third = counter.apply(ExerciseChange::Increase);
        assert_eq!(counter.value(), 10);

        counter.confirm(second, 19);
        assert_eq!(counter.value(), 10);
        counter.rollback(first);
        assert_eq!(counter.value(), 20);
        counter.confirm(third, 20);
        assert_eq!(counter.value(), 20);
        assert!(!counter.is_syncing());
    }

    #[test]
    fn test_settle_routes_outcome() {
        let mut counter = OptimisticCounter::from_server(1);
        let pending = counter.apply(ExerciseChange::Increase);
        let outcome: Result<i64, &str> = Err("offline");
        assert_eq!(counter.settle(pending, outcome), Err("offline"));
        assert_eq!(counter.value(), 1);

        let pending = counter.apply(ExerciseChange::Increase);
        assert_eq!(counter.settle::<&str>(pending, Ok(2)), Ok(2));
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn test_refresh_skipped_while_syncing() {
        let mut counter = OptimisticCounter::from_server(4);
        let pending = counter.apply(ExerciseChange::Increase);

        assert!(!counter.refresh(4));
        assert_eq!(counter.value(), 5);

        counter.confirm(pending, 5);
        assert!(counter.refresh(7));
        assert_eq!(counter.value(), 7);
    }

    #[test]
    fn test_default_counter_is_unsynced() {
        let counter = OptimisticCounter::default();
        assert_eq!(counter.value(), 0);
        assert!(counter.last_synced().is_none());
    }
}
