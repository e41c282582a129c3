//! Task scoring for the "what to do now" ranking.
//!
//! ```text
//! score = date_score + matrix_score
//!
//! date_score   = 1000                  if days_left < 0   (overdue)
//!              = 100 / (days_left + 1) otherwise
//! matrix_score = importance * 1.5 + urgency
//! ```
//!
//! `days_left` is measured from `now` to the start (00:00) of the deadline
//! date in local wall-clock time. A task without a deadline is treated as due
//! one year out. The overdue cliff is deliberate: the best non-overdue total
//! is `100 + 12.5`, so any overdue task outranks every task that is not.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::record::{Record, TaskDetails};

/// Flat date score for overdue tasks.
pub const OVERDUE_DATE_SCORE: f64 = 1000.0;
/// Numerator of the non-overdue date score; also its value when due now.
pub const DUE_NOW_DATE_SCORE: f64 = 100.0;
pub const IMPORTANCE_WEIGHT: f64 = 1.5;
pub const URGENCY_WEIGHT: f64 = 1.0;
/// Horizon used in place of a missing deadline.
pub const NO_DEADLINE_HORIZON_DAYS: i64 = 365;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Explainable score of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub days_left: f64,
    pub overdue: bool,
    pub date_score: f64,
    pub matrix_score: f64,
    pub total: f64,
}

/// Fractional days from `now` until the deadline date begins.
pub fn days_left(deadline: Option<NaiveDate>, now: NaiveDateTime) -> f64 {
    let due = match deadline {
        Some(date) => date.and_time(NaiveTime::MIN),
        None => now + Duration::days(NO_DEADLINE_HORIZON_DAYS),
    };
    let delta = due.signed_duration_since(now);
    delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
}

pub fn date_score(days_left: f64) -> f64 {
    if days_left < 0.0 {
        OVERDUE_DATE_SCORE
    } else {
        DUE_NOW_DATE_SCORE / (days_left + 1.0)
    }
}

pub fn matrix_score(task: &TaskDetails) -> f64 {
    task.importance.value() * IMPORTANCE_WEIGHT + task.urgency.value() * URGENCY_WEIGHT
}

/// Score a task's fields directly.
pub fn score_task(deadline: Option<NaiveDate>, task: &TaskDetails, now: NaiveDateTime) -> ScoreBreakdown {
    let days_left = days_left(deadline, now);
    let date_score = date_score(days_left);
    let matrix_score = matrix_score(task);
    ScoreBreakdown {
        days_left,
        overdue: days_left < 0.0,
        date_score,
        matrix_score,
        total: date_score + matrix_score,
    }
}

/// Breakdown for a record, `None` for events.
pub fn breakdown(record: &Record, now: NaiveDateTime) -> Option<ScoreBreakdown> {
    record
        .task()
        .map(|task| score_task(record.deadline, task, now))
}

/// Ranking score for a record, `None` for events.
pub fn score(record: &Record, now: NaiveDateTime) -> Option<f64> {
    breakdown(record, now).map(|b| b.total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Rating;

    fn task(importance: f64, urgency: f64) -> TaskDetails {
        TaskDetails::new(Rating::new(importance).unwrap(), Rating::new(urgency).unwrap())
    }

    fn at(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn date(s: &str) -> Option<NaiveDate> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn due_exactly_now_scores_one_hundred() {
        let b = score_task(date("2025-12-14"), &task(1.0, 1.0), at("2025-12-14T00:00:00"));
        assert_eq!(b.days_left, 0.0);
        assert_eq!(b.date_score, 100.0);
        assert!(!b.overdue);
        assert_eq!(b.total, 100.0 + 2.5);
    }

    #[test]
    fn date_score_halves_one_day_out() {
        let b = score_task(date("2025-12-15"), &task(3.0, 3.0), at("2025-12-14T00:00:00"));
        assert_eq!(b.days_left, 1.0);
        assert_eq!(b.date_score, 50.0);
        assert_eq!(b.matrix_score, 7.5);
    }

    #[test]
    fn just_past_deadline_jumps_to_overdue() {
        let b = score_task(date("2025-12-14"), &task(1.0, 1.0), at("2025-12-14T00:00:01"));
        assert!(b.overdue);
        assert_eq!(b.date_score, OVERDUE_DATE_SCORE);
    }

    #[test]
    fn overdue_is_flat_regardless_of_degree() {
        let now = at("2025-12-20T12:00:00");
        let a = score_task(date("2025-12-19"), &task(2.0, 2.0), now);
        let b = score_task(date("2025-01-01"), &task(2.0, 2.0), now);
        assert_eq!(a.total, b.total);
    }

    #[test]
    fn missing_deadline_is_one_year_out() {
        let b = score_task(None, &task(5.0, 5.0), at("2025-12-14T09:30:00"));
        assert_eq!(b.days_left, 365.0);
        assert!((b.date_score - 100.0 / 366.0).abs() < 1e-12);
    }

    #[test]
    fn matrix_weights_importance_over_urgency() {
        assert!(matrix_score(&task(4.0, 2.0)) > matrix_score(&task(2.0, 4.0)));
        assert_eq!(matrix_score(&task(5.0, 5.0)), 12.5);
    }
}
