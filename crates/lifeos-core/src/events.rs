use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RecordId;
use crate::timer::TimerState;

/// Timer, ledger and bulk changes in the organizer produce an Event.
/// The CLI prints them; a GUI would poll for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    RecordDeleted {
        id: RecordId,
        /// The record was the active task and the timer went idle first.
        was_active: bool,
        at: DateTime<Utc>,
    },
    /// A task became active. `previous` stopped accruing if set.
    TimerStarted {
        task_id: RecordId,
        previous: Option<RecordId>,
        elapsed_time: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        task_id: RecordId,
        elapsed_time: u64,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: RecordId,
        earned_xp: u64,
        xp: u64,
        level: u64,
        leveled_up: bool,
        elapsed_time: u64,
        at: DateTime<Utc>,
    },
    DeadlineSnoozed {
        id: RecordId,
        deadline: NaiveDate,
        at: DateTime<Utc>,
    },
    ScheduleReordered {
        applied: usize,
        at: DateTime<Utc>,
    },
    SnapshotImported {
        records: usize,
        xp: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        active_task_id: Option<RecordId>,
        elapsed_time: Option<u64>,
        xp: u64,
        level: u64,
        at: DateTime<Utc>,
    },
}
