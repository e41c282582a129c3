//! Daily timetable packing.
//!
//! Tasks are laid end to end from a start time:
//! - ordered by `schedule_order` ascending when set (written by the advisory
//!   reorder), otherwise by importance descending
//! - each slot starts where the previous one ended, so there are no gaps and
//!   no overlaps
//! - times are wall-clock minutes and wrap past midnight without any day
//!   boundary handling
//!
//! The builder only reads records; slots are derived view data.

use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::record::{hhmm, Domain, Record, RecordId, DEFAULT_DURATION_MIN};

/// One packed slot of the timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableSlot {
    pub task_id: RecordId,
    pub text: String,
    pub domain: Domain,
    pub duration_min: u32,
    #[serde(with = "hhmm::time")]
    pub start: NaiveTime,
    #[serde(with = "hhmm::time")]
    pub end: NaiveTime,
    /// The slot crossed 24:00 and `end` is on the following day.
    pub wraps_midnight: bool,
}

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Minutes used for tasks whose duration is unset or zero
    pub default_duration_min: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            default_duration_min: DEFAULT_DURATION_MIN,
        }
    }
}

/// Builds timetables from task records.
#[derive(Debug, Clone, Default)]
pub struct TimetableBuilder {
    config: SchedulerConfig,
}

impl TimetableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Pending tasks in timetable order.
    ///
    /// Tasks with a `schedule_order` come first, ascending; the rest follow by
    /// importance, highest first. Equal keys keep input order.
    pub fn order<'a, I>(&self, records: I) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut tasks: Vec<&Record> = records
            .into_iter()
            .filter(|r| r.pending_task().is_some())
            .collect();
        tasks.sort_by(|a, b| compare_for_timetable(a, b));
        tasks
    }

    /// Pack `ordered` sequentially from `start`, skipping events and
    /// completed records.
    pub fn pack<'a, I>(&self, ordered: I, start: NaiveTime) -> Vec<TimetableSlot>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut clock = start;
        let mut slots = Vec::new();

        for record in ordered {
            let Some(task) = record.pending_task() else {
                continue;
            };
            let duration_min = if task.duration == 0 {
                self.config.default_duration_min
            } else {
                task.duration
            };

            let (end, wrapped_secs) =
                clock.overflowing_add_signed(Duration::minutes(duration_min as i64));
            slots.push(TimetableSlot {
                task_id: record.id.clone(),
                text: record.text.clone(),
                domain: record.domain,
                duration_min,
                start: clock,
                end,
                wraps_midnight: wrapped_secs != 0,
            });
            clock = end;
        }

        slots
    }

    /// Order then pack.
    pub fn build<'a, I>(&self, records: I, start: NaiveTime) -> Vec<TimetableSlot>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let ordered = self.order(records);
        self.pack(ordered, start)
    }
}

/// Pack an already ordered task list with default settings.
pub fn build_timetable<'a, I>(ordered: I, start: NaiveTime) -> Vec<TimetableSlot>
where
    I: IntoIterator<Item = &'a Record>,
{
    TimetableBuilder::new().pack(ordered, start)
}

fn compare_for_timetable(a: &Record, b: &Record) -> Ordering {
    let (Some(ta), Some(tb)) = (a.task(), b.task()) else {
        return Ordering::Equal;
    };
    match (ta.schedule_order, tb.schedule_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => tb
            .importance
            .partial_cmp(&ta.importance)
            .unwrap_or(Ordering::Equal),
    }
}
