//! Focus timer state machine.
//!
//! There is exactly one timer slot for the whole organizer:
//!
//! ```text
//! Idle --toggle(x)--> Active(x) --toggle(x)--> Idle
//!                     Active(x) --toggle(y)--> Active(y)
//!                     Active(x) --complete(x) | delete(x)--> Idle
//! ```
//!
//! The engine does not touch records. It tracks which task is active and
//! the instant up to which focus time has been credited; the organizer turns
//! that into `elapsed_time` updates. Like the rest of the core it has no
//! internal thread: either call `take_tick` once per second or
//! `take_due_seconds` whenever wall-clock catch-up is needed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
enum Slot {
    Idle,
    Active {
        task_id: RecordId,
        /// Focus time up to this instant has been credited.
        credited_through: DateTime<Utc>,
    },
}

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggle {
    Started { previous: Option<RecordId> },
    Paused,
}

/// Single-slot focus timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusTimer {
    slot: Slot,
}

impl Default for FocusTimer {
    fn default() -> Self {
        Self { slot: Slot::Idle }
    }
}

impl FocusTimer {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        match self.slot {
            Slot::Idle => TimerState::Idle,
            Slot::Active { .. } => TimerState::Active,
        }
    }

    pub fn active_id(&self) -> Option<&RecordId> {
        match &self.slot {
            Slot::Active { task_id, .. } => Some(task_id),
            Slot::Idle => None,
        }
    }

    pub fn is_active(&self, id: &RecordId) -> bool {
        self.active_id() == Some(id)
    }

    pub fn credited_through(&self) -> Option<DateTime<Utc>> {
        match &self.slot {
            Slot::Active {
                credited_through, ..
            } => Some(*credited_through),
            Slot::Idle => None,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Pause `id` if it is active, otherwise make it the active task.
    ///
    /// Callers settle the currently active task before toggling; the
    /// previous task simply stops accruing here.
    pub fn toggle(&mut self, id: &RecordId, now: DateTime<Utc>) -> Toggle {
        if self.is_active(id) {
            self.slot = Slot::Idle;
            Toggle::Paused
        } else {
            let previous = self.activate(id.clone(), now);
            Toggle::Started { previous }
        }
    }

    /// Make `id` active from `now`, returning the task it replaced.
    pub fn activate(&mut self, id: RecordId, now: DateTime<Utc>) -> Option<RecordId> {
        let previous = self.deactivate();
        self.slot = Slot::Active {
            task_id: id,
            credited_through: now,
        };
        previous
    }

    /// Go idle, returning the task that was active.
    pub fn deactivate(&mut self) -> Option<RecordId> {
        match std::mem::replace(&mut self.slot, Slot::Idle) {
            Slot::Active { task_id, .. } => Some(task_id),
            Slot::Idle => None,
        }
    }

    /// Consume one tick for `target`.
    ///
    /// Returns `false` (and changes nothing) when `target` is no longer the
    /// active task, which is how stale ticks are discarded.
    pub fn take_tick(&mut self, target: &RecordId) -> bool {
        match &mut self.slot {
            Slot::Active {
                task_id,
                credited_through,
            } if task_id == target => {
                *credited_through += Duration::seconds(1);
                true
            }
            _ => false,
        }
    }

    /// Whole seconds of wall-clock time not yet credited, consumed.
    ///
    /// Sub-second remainders stay pending for the next call.
    pub fn take_due_seconds(&mut self, now: DateTime<Utc>) -> u64 {
        match &mut self.slot {
            Slot::Active {
                credited_through, ..
            } => {
                let due = now.signed_duration_since(*credited_through).num_seconds();
                if due <= 0 {
                    return 0;
                }
                *credited_through += Duration::seconds(due);
                due as u64
            }
            Slot::Idle => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        "2025-12-14T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn toggle_start_pause() {
        let mut timer = FocusTimer::new();
        let x = RecordId::from("x");
        assert_eq!(timer.state(), TimerState::Idle);

        assert_eq!(timer.toggle(&x, t0()), Toggle::Started { previous: None });
        assert_eq!(timer.state(), TimerState::Active);
        assert!(timer.is_active(&x));

        assert_eq!(timer.toggle(&x, t0()), Toggle::Paused);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.active_id().is_none());
    }

    #[test]
    fn toggle_other_switches_directly() {
        let mut timer = FocusTimer::new();
        let x = RecordId::from("x");
        let y = RecordId::from("y");
        timer.toggle(&x, t0());
        assert_eq!(
            timer.toggle(&y, t0()),
            Toggle::Started {
                previous: Some(x.clone())
            }
        );
        assert!(timer.is_active(&y));
        assert!(!timer.take_tick(&x));
        assert!(timer.take_tick(&y));
    }

    #[test]
    fn due_seconds_are_consumed_once() {
        let mut timer = FocusTimer::new();
        let x = RecordId::from("x");
        timer.activate(x, t0());
        let later = t0() + Duration::milliseconds(2_700);
        assert_eq!(timer.take_due_seconds(later), 2);
        assert_eq!(timer.take_due_seconds(later), 0);
        assert_eq!(timer.take_due_seconds(later + Duration::milliseconds(300)), 1);
    }

    #[test]
    fn ticks_advance_the_credit_mark() {
        let mut timer = FocusTimer::new();
        let x = RecordId::from("x");
        timer.activate(x.clone(), t0());
        assert!(timer.take_tick(&x));
        assert!(timer.take_tick(&x));
        // Two ticks already covered the first two seconds.
        assert_eq!(timer.take_due_seconds(t0() + Duration::seconds(3)), 1);
    }

    #[test]
    fn idle_timer_has_nothing_due() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.take_due_seconds(t0()), 0);
        assert!(!timer.take_tick(&RecordId::from("x")));
    }

    #[test]
    fn serde_roundtrip() {
        let mut timer = FocusTimer::new();
        timer.activate(RecordId::from("task-1"), t0());
        let json = serde_json::to_string(&timer).unwrap();
        let back: FocusTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, timer);
    }
}
