//! Priority-ordered views of pending tasks.
//!
//! Both views are recomputed from the records on every call; nothing about
//! the ordering is cached or persisted.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;

use crate::record::Record;
use crate::scoring::{self, ScoreBreakdown};

/// A task together with the score it was ranked by.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<R> {
    pub record: R,
    pub score: ScoreBreakdown,
}

/// Ranking entry borrowing from the record list it was computed from.
pub type RankedTask<'a> = Ranked<&'a Record>;

impl Ranked<&Record> {
    pub fn to_owned_record(&self) -> Ranked<Record> {
        Ranked {
            record: self.record.clone(),
            score: self.score,
        }
    }
}

/// Pending tasks ordered by score, highest first.
///
/// Events and completed records are dropped. Ties keep the input (insertion)
/// order because the sort is stable.
pub fn rank<'a, I>(records: I, now: NaiveDateTime) -> Vec<RankedTask<'a>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut ranked: Vec<RankedTask<'a>> = records
        .into_iter()
        .filter_map(|record| {
            let task = record.pending_task()?;
            Some(Ranked {
                record,
                score: scoring::score_task(record.deadline, task, now),
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total
            .partial_cmp(&a.score.total)
            .unwrap_or(Ordering::Equal)
    });
    ranked
}

/// Eisenhower quadrant of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    /// Important and urgent.
    DoNow,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither.
    Eliminate,
}

impl Quadrant {
    pub fn of(record: &Record) -> Option<Quadrant> {
        let task = record.task()?;
        Some(match (task.importance.is_high(), task.urgency.is_high()) {
            (true, true) => Quadrant::DoNow,
            (true, false) => Quadrant::Schedule,
            (false, true) => Quadrant::Delegate,
            (false, false) => Quadrant::Eliminate,
        })
    }
}

/// Pending tasks split into quadrants, each in ranking order.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixView<R> {
    pub do_now: Vec<Ranked<R>>,
    pub schedule: Vec<Ranked<R>>,
    pub delegate: Vec<Ranked<R>>,
    pub eliminate: Vec<Ranked<R>>,
}

impl<R> Default for MatrixView<R> {
    fn default() -> Self {
        Self {
            do_now: Vec::new(),
            schedule: Vec::new(),
            delegate: Vec::new(),
            eliminate: Vec::new(),
        }
    }
}

impl<R> MatrixView<R> {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[Ranked<R>] {
        match quadrant {
            Quadrant::DoNow => &self.do_now,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Eliminate => &self.eliminate,
        }
    }

    pub fn len(&self) -> usize {
        self.do_now.len() + self.schedule.len() + self.delegate.len() + self.eliminate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transform every entry, keeping quadrant membership and order.
    pub fn map<U>(self, mut f: impl FnMut(Ranked<R>) -> Ranked<U>) -> MatrixView<U> {
        MatrixView {
            do_now: self.do_now.into_iter().map(&mut f).collect(),
            schedule: self.schedule.into_iter().map(&mut f).collect(),
            delegate: self.delegate.into_iter().map(&mut f).collect(),
            eliminate: self.eliminate.into_iter().map(&mut f).collect(),
        }
    }
}

pub fn matrix<'a, I>(records: I, now: NaiveDateTime) -> MatrixView<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut view = MatrixView::default();
    for ranked in rank(records, now) {
        let bucket = match Quadrant::of(ranked.record) {
            Some(Quadrant::DoNow) => &mut view.do_now,
            Some(Quadrant::Schedule) => &mut view.schedule,
            Some(Quadrant::Delegate) => &mut view.delegate,
            Some(Quadrant::Eliminate) => &mut view.eliminate,
            None => continue,
        };
        bucket.push(ranked);
    }
    view
}
