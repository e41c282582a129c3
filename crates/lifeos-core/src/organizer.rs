//! The organizer controller.
//!
//! Owns the record store, the focus timer and the reward ledger, and is the
//! only writer of all three. Views (focus queue, matrix, timetable) are
//! recomputed from the store on every call.
//!
//! Timer operations on a record that no longer exists are silent no-ops
//! returning `Ok(None)`; stale ticks are reported as [`TickOutcome::Stale`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{debug, info, warn};

use crate::advisory::{Advisor, ScheduleCandidate};
use crate::clock::{Clock, SystemClock};
use crate::error::{AdvisoryError, CoreError, Result, ValidationError};
use crate::events::Event;
use crate::export::Snapshot;
use crate::ledger::{completion_xp, LevelProgress, RewardLedger};
use crate::ranking::{self, MatrixView, Ranked};
use crate::record::{NewRecord, Record, RecordId, RecordPatch};
use crate::scheduler::{SchedulerConfig, TimetableBuilder, TimetableSlot};
use crate::storage::RecordStore;
use crate::timer::{FocusTimer, TimerState, Toggle};

const XP_KEY: &str = "xp";
const TIMER_KEY: &str = "focus_timer";

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One second was added; `elapsed_time` is the new total.
    Credited { elapsed_time: u64 },
    /// The tick's target is no longer the active task. Nothing changed.
    Stale,
}

pub struct Organizer<S: RecordStore> {
    store: S,
    timer: FocusTimer,
    ledger: RewardLedger,
    clock: Arc<dyn Clock>,
    builder: TimetableBuilder,
}

impl<S: RecordStore> Organizer<S> {
    /// Load xp and timer state from `store`.
    ///
    /// A persisted active task that no longer exists, or has been completed,
    /// resets the timer to idle.
    pub fn load(store: S, clock: Arc<dyn Clock>) -> Result<Self> {
        let xp = match store.kv_get(XP_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| CoreError::Custom(format!("stored xp '{raw}' is invalid: {e}")))?,
            None => 0,
        };
        let timer = match store.kv_get(TIMER_KEY)? {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                warn!("discarding unreadable timer state: {e}");
                FocusTimer::new()
            }),
            None => FocusTimer::new(),
        };

        let mut organizer = Self {
            store,
            timer,
            ledger: RewardLedger::restore(xp),
            clock,
            builder: TimetableBuilder::new(),
        };
        organizer.repair_timer()?;
        Ok(organizer)
    }

    pub fn with_system_clock(store: S) -> Result<Self> {
        Self::load(store, Arc::new(SystemClock))
    }

    pub fn with_scheduler_config(mut self, config: SchedulerConfig) -> Self {
        self.builder = TimetableBuilder::with_config(config);
        self
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Every record in insertion order.
    pub fn records(&self) -> Result<Vec<Record>> {
        self.store.list()
    }

    pub fn get(&self, id: &RecordId) -> Result<Record> {
        self.store.get(id)?.ok_or_else(|| CoreError::not_found(id))
    }

    pub fn active_task_id(&self) -> Option<&RecordId> {
        self.timer.active_id()
    }

    pub fn timer_state(&self) -> TimerState {
        self.timer.state()
    }

    pub fn xp(&self) -> u64 {
        self.ledger.xp()
    }

    pub fn level(&self) -> u64 {
        self.ledger.level()
    }

    pub fn progress(&self) -> LevelProgress {
        self.ledger.progress()
    }

    /// Timer and ledger summary.
    pub fn status(&self) -> Result<Event> {
        let active = self.timer.active_id().cloned();
        let elapsed_time = match &active {
            Some(id) => self.store.get(id)?.map(|r| r.elapsed_time),
            None => None,
        };
        Ok(Event::StateSnapshot {
            state: self.timer.state(),
            active_task_id: active,
            elapsed_time,
            xp: self.ledger.xp(),
            level: self.ledger.level(),
            at: self.clock.now_utc(),
        })
    }

    // ── Records ──────────────────────────────────────────────────────

    pub fn create(&mut self, draft: NewRecord) -> Result<Record> {
        let record = self.store.create(draft, self.clock.now_utc())?;
        info!(id = %record.id, kind = record.kind.name(), "record created");
        Ok(record)
    }

    pub fn update(&mut self, id: &RecordId, patch: &RecordPatch) -> Result<Record> {
        let record = self.store.update(id, patch)?;
        debug!(id = %id, "record updated");
        Ok(record)
    }

    /// Push the deadline one day out, counting from today when unset.
    pub fn snooze(&mut self, id: &RecordId) -> Result<Event> {
        let mut record = self.get(id)?;
        if record.is_completed() {
            return Err(ValidationError::RecordCompleted(id.to_string()).into());
        }
        let base = record.deadline.unwrap_or_else(|| self.clock.today());
        let deadline = base
            .succ_opt()
            .ok_or_else(|| ValidationError::InvalidDate(base.to_string()))?;
        record.deadline = Some(deadline);
        self.store.save(&record)?;
        info!(id = %id, %deadline, "deadline snoozed");
        Ok(Event::DeadlineSnoozed {
            id: id.clone(),
            deadline,
            at: self.clock.now_utc(),
        })
    }

    /// Remove a record, idling the timer first if it was the active task.
    pub fn delete(&mut self, id: &RecordId) -> Result<Option<Event>> {
        if self.store.get(id)?.is_none() {
            debug!(id = %id, "delete of missing record ignored");
            return Ok(None);
        }
        let was_active = self.timer.is_active(id);
        if was_active {
            self.timer.deactivate();
            self.persist_timer()?;
        }
        self.store.delete(id)?;
        info!(id = %id, was_active, "record deleted");
        Ok(Some(Event::RecordDeleted {
            id: id.clone(),
            was_active,
            at: self.clock.now_utc(),
        }))
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Start or pause focus time on a pending task.
    ///
    /// Starting a task while another is active switches directly; the
    /// previous task is settled up to now and stops accruing.
    pub fn toggle(&mut self, id: &RecordId) -> Result<Option<Event>> {
        let Some(record) = self.store.get(id)? else {
            debug!(id = %id, "toggle on missing record ignored");
            return Ok(None);
        };
        if record.pending_task().is_none() {
            debug!(id = %id, "toggle ignored: not a pending task");
            return Ok(None);
        }

        let now = self.clock.now_utc();
        self.settle_at(now)?;
        let transition = self.timer.toggle(id, now);
        self.persist_timer()?;

        let elapsed_time = self.store.get(id)?.map_or(record.elapsed_time, |r| r.elapsed_time);
        let event = match transition {
            Toggle::Paused => {
                info!(task_id = %id, elapsed_time, "timer paused");
                Event::TimerPaused {
                    task_id: id.clone(),
                    elapsed_time,
                    at: now,
                }
            }
            Toggle::Started { previous } => {
                info!(task_id = %id, previous = ?previous, "timer started");
                Event::TimerStarted {
                    task_id: id.clone(),
                    previous,
                    elapsed_time,
                    at: now,
                }
            }
        };
        Ok(Some(event))
    }

    /// Credit one second to `target` if it is still the active task.
    pub fn tick(&mut self, target: &RecordId) -> Result<TickOutcome> {
        if !self.timer.is_active(target) {
            debug!(task_id = %target, "stale tick discarded");
            return Ok(TickOutcome::Stale);
        }
        let Some(mut record) = self.store.get(target)?.filter(Record::is_pending) else {
            warn!(task_id = %target, "active task vanished; timer reset");
            self.timer.deactivate();
            self.persist_timer()?;
            return Ok(TickOutcome::Stale);
        };

        self.timer.take_tick(target);
        record.elapsed_time += 1;
        self.store.save(&record)?;
        self.persist_timer()?;
        Ok(TickOutcome::Credited {
            elapsed_time: record.elapsed_time,
        })
    }

    /// Credit wall-clock time not yet covered by ticks to the active task.
    ///
    /// Returns the seconds credited.
    pub fn settle(&mut self) -> Result<u64> {
        let now = self.clock.now_utc();
        self.settle_at(now)
    }

    /// Mark a record done and credit its reward. Completing an already
    /// completed or missing record is a no-op.
    pub fn complete(&mut self, id: &RecordId) -> Result<Option<Event>> {
        let now = self.clock.now_utc();
        if self.timer.is_active(id) {
            self.settle_at(now)?;
        }
        let Some(mut record) = self.store.get(id)? else {
            debug!(id = %id, "complete on missing record ignored");
            return Ok(None);
        };
        if record.is_completed() {
            debug!(id = %id, "record already completed");
            return Ok(None);
        }
        if self.timer.is_active(id) {
            self.timer.deactivate();
            self.persist_timer()?;
        }

        let earned_xp = completion_xp(&record);
        record.completed_at = Some(now);
        record.earned_xp = Some(earned_xp);
        self.store.save(&record)?;

        let credit = self
            .ledger
            .add_xp(i64::try_from(earned_xp).unwrap_or(i64::MAX))?;
        self.persist_xp()?;
        info!(id = %id, earned_xp, xp = credit.xp, level = credit.level, "record completed");

        Ok(Some(Event::TaskCompleted {
            task_id: id.clone(),
            earned_xp,
            xp: credit.xp,
            level: credit.level,
            leveled_up: credit.leveled_up(),
            elapsed_time: record.elapsed_time,
            at: now,
        }))
    }

    fn settle_at(&mut self, now: DateTime<Utc>) -> Result<u64> {
        let Some(active) = self.timer.active_id().cloned() else {
            return Ok(0);
        };
        let due = self.timer.take_due_seconds(now);
        if due == 0 {
            return Ok(0);
        }
        match self.store.get(&active)?.filter(Record::is_pending) {
            Some(mut record) => {
                record.elapsed_time += due;
                self.store.save(&record)?;
                debug!(task_id = %active, due, "focus time settled");
            }
            None => {
                warn!(task_id = %active, "active task vanished; timer reset");
                self.timer.deactivate();
            }
        }
        self.persist_timer()?;
        Ok(due)
    }

    fn repair_timer(&mut self) -> Result<()> {
        let Some(id) = self.timer.active_id().cloned() else {
            return Ok(());
        };
        let valid = self
            .store
            .get(&id)?
            .is_some_and(|r| r.pending_task().is_some());
        if !valid {
            warn!(task_id = %id, "persisted active task is gone; timer reset");
            self.timer.deactivate();
            self.persist_timer()?;
        }
        Ok(())
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Pending tasks, most pressing first.
    pub fn focus_queue(&self) -> Result<Vec<Ranked<Record>>> {
        let records = self.store.list()?;
        Ok(ranking::rank(&records, self.clock.now_local())
            .iter()
            .map(Ranked::to_owned_record)
            .collect())
    }

    pub fn matrix(&self) -> Result<MatrixView<Record>> {
        let records = self.store.list()?;
        Ok(ranking::matrix(&records, self.clock.now_local()).map(|r| r.to_owned_record()))
    }

    pub fn timetable(&self, start: NaiveTime) -> Result<Vec<TimetableSlot>> {
        let records = self.store.list()?;
        Ok(self.builder.build(&records, start))
    }

    // ── Schedule order ───────────────────────────────────────────────

    /// Pending tasks in current timetable order, as sent for reordering.
    pub fn schedule_candidates(&self) -> Result<Vec<ScheduleCandidate>> {
        let records = self.store.list()?;
        Ok(self
            .builder
            .order(&records)
            .into_iter()
            .filter_map(ScheduleCandidate::from_record)
            .collect())
    }

    /// Write `schedule_order` 0, 1, 2... following `ids`.
    ///
    /// Ids that are not pending tasks are skipped. Pending tasks left out
    /// of `ids` lose any previous order and fall back to importance. When no
    /// id matches, nothing changes.
    pub fn apply_schedule_order(&mut self, ids: &[RecordId]) -> Result<Event> {
        let records = self.store.list()?;
        let pending: HashSet<&RecordId> = records
            .iter()
            .filter(|r| r.pending_task().is_some())
            .map(|r| &r.id)
            .collect();

        let mut positions: HashMap<&RecordId, u32> = HashMap::new();
        for id in ids {
            if !pending.contains(id) {
                debug!(id = %id, "reorder names unknown task; skipped");
                continue;
            }
            let next = positions.len() as u32;
            positions.entry(id).or_insert(next);
        }

        let applied = positions.len();
        if applied > 0 {
            for record in &records {
                let Some(task) = record.pending_task() else {
                    continue;
                };
                let order = positions.get(&record.id).copied();
                if task.schedule_order != order {
                    let mut changed = record.clone();
                    if let Some(details) = changed.task_mut() {
                        details.schedule_order = order;
                    }
                    self.store.save(&changed)?;
                }
            }
        }
        info!(applied, "schedule order applied");
        Ok(Event::ScheduleReordered {
            applied,
            at: self.clock.now_utc(),
        })
    }

    /// Drop every manual order. Returns how many tasks had one.
    pub fn clear_schedule_order(&mut self) -> Result<usize> {
        let mut cleared = 0;
        for mut record in self.store.list()? {
            if record.is_completed() {
                continue;
            }
            let Some(details) = record.task_mut() else {
                continue;
            };
            if details.schedule_order.take().is_some() {
                self.store.save(&record)?;
                cleared += 1;
            }
        }
        Ok(cleared)
    }

    /// Ask `advisor` for a new order and apply it.
    ///
    /// On any advisory failure the stored order is left untouched.
    pub async fn optimize_schedule<A: Advisor>(
        &mut self,
        advisor: &A,
        start: NaiveTime,
    ) -> Result<Event> {
        let candidates = self.schedule_candidates()?;
        if candidates.is_empty() {
            return Ok(Event::ScheduleReordered {
                applied: 0,
                at: self.clock.now_utc(),
            });
        }

        let ids = advisor.reorder(&candidates, start).await?;
        let known = ids
            .iter()
            .filter(|id| candidates.iter().any(|c| &c.id == *id))
            .count();
        if known == 0 {
            return Err(AdvisoryError::Malformed(
                "reorder answer names none of the pending tasks".into(),
            )
            .into());
        }
        self.apply_schedule_order(&ids)
    }

    // ── Backup ───────────────────────────────────────────────────────

    pub fn export(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(
            self.store.list()?,
            self.ledger.xp(),
            self.clock.now_utc(),
        ))
    }

    /// Replace every record with the snapshot's.
    ///
    /// The timer goes idle. xp never decreases: the ledger keeps the larger of
    /// its own total and the snapshot's.
    pub fn import(&mut self, snapshot: Snapshot) -> Result<Event> {
        snapshot.validate()?;

        self.timer.deactivate();
        self.persist_timer()?;
        self.store.clear()?;
        for record in &snapshot.records {
            self.store.save(record)?;
        }
        self.ledger = RewardLedger::restore(self.ledger.xp().max(snapshot.xp));
        self.persist_xp()?;

        info!(records = snapshot.records.len(), xp = self.ledger.xp(), "snapshot imported");
        Ok(Event::SnapshotImported {
            records: snapshot.records.len(),
            xp: self.ledger.xp(),
            at: self.clock.now_utc(),
        })
    }

    /// Delete every record. The timer goes idle; xp is kept.
    ///
    /// Returns how many records were removed.
    pub fn reset(&mut self) -> Result<usize> {
        let removed = self.store.list()?.len();
        self.timer.deactivate();
        self.persist_timer()?;
        self.store.clear()?;
        info!(removed, xp = self.ledger.xp(), "all records deleted");
        Ok(removed)
    }

    // ── Persistence ──────────────────────────────────────────────────

    fn persist_timer(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.timer)?;
        self.store.kv_set(TIMER_KEY, &json)
    }

    fn persist_xp(&mut self) -> Result<()> {
        let xp = self.ledger.xp().to_string();
        self.store.kv_set(XP_KEY, &xp)
    }
}
