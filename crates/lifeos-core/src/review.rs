//! Read-only reports over the record list: history, domain balance,
//! upcoming events and a single day's agenda.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::{Domain, Record};

/// Weight of a completed record in the domain balance.
pub const COMPLETED_WEIGHT: f64 = 1.0;
/// Weight of a pending record in the domain balance.
pub const PENDING_WEIGHT: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct History<'a> {
    /// Completed records, newest completion first.
    pub records: Vec<&'a Record>,
    pub total_focus_seconds: u64,
    pub total_xp: u64,
}

impl History<'_> {
    pub fn completed(&self) -> usize {
        self.records.len()
    }
}

pub fn history<'a, I>(records: I) -> History<'a>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut done: Vec<&Record> = records.into_iter().filter(|r| r.is_completed()).collect();
    done.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    History {
        total_focus_seconds: done.iter().map(|r| r.elapsed_time).sum(),
        total_xp: done.iter().filter_map(|r| r.earned_xp).sum(),
        records: done,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DomainWeight {
    pub domain: Domain,
    pub weight: f64,
    pub completed: usize,
    pub pending: usize,
}

/// Per-domain activity, one entry per domain in fixed order.
pub fn domain_balance<'a, I>(records: I) -> Vec<DomainWeight>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut balance: Vec<DomainWeight> = Domain::ALL
        .into_iter()
        .map(|domain| DomainWeight {
            domain,
            weight: 0.0,
            completed: 0,
            pending: 0,
        })
        .collect();

    for record in records {
        let Some(entry) = balance.iter_mut().find(|w| w.domain == record.domain) else {
            continue;
        };
        if record.is_completed() {
            entry.completed += 1;
            entry.weight += COMPLETED_WEIGHT;
        } else {
            entry.pending += 1;
            entry.weight += PENDING_WEIGHT;
        }
    }
    balance
}

/// Pending events on or after `today`, by date then start time.
///
/// Events without a start time sort first within their day.
pub fn upcoming_events<'a, I>(records: I, today: NaiveDate) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut events: Vec<&Record> = records
        .into_iter()
        .filter(|r| r.is_pending() && r.is_event())
        .filter(|r| r.deadline.is_some_and(|d| d >= today))
        .collect();
    events.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| start_of(a).cmp(&start_of(b))));
    events
}

/// Pending records dated `date`: events by start time, then tasks in
/// insertion order.
pub fn agenda<'a, I>(records: I, date: NaiveDate) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut items: Vec<&Record> = records
        .into_iter()
        .filter(|r| r.is_pending() && r.deadline == Some(date))
        .collect();
    items.sort_by(|a, b| match (a.is_event(), b.is_event()) {
        (true, true) => start_of(a).cmp(&start_of(b)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    });
    items
}

fn start_of(record: &Record) -> Option<chrono::NaiveTime> {
    record.event().and_then(|e| e.start_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{hhmm, EventDetails, NewRecord, TaskDetails};
    use chrono::{DateTime, Duration, Utc};

    fn t0() -> DateTime<Utc> {
        "2025-12-14T09:00:00Z".parse().unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        hhmm::parse_date(s).unwrap()
    }

    fn event(text: &str, on: &str, start: Option<&str>) -> Record {
        NewRecord::event(
            text,
            date(on),
            EventDetails {
                start_time: start.map(|s| hhmm::parse_time(s).unwrap()),
                ..Default::default()
            },
        )
        .into_record(t0())
    }

    fn task(text: &str, domain: Domain) -> Record {
        NewRecord::task(text, TaskDetails::default())
            .with_domain(domain)
            .into_record(t0())
    }

    #[test]
    fn history_is_newest_first_with_totals() {
        let mut older = task("older", Domain::Work);
        older.completed_at = Some(t0());
        older.elapsed_time = 600;
        older.earned_xp = Some(140);
        let mut newer = task("newer", Domain::Study);
        newer.completed_at = Some(t0() + Duration::hours(2));
        newer.elapsed_time = 1500;
        newer.earned_xp = Some(60);
        let records = vec![older, task("open", Domain::Work), newer];

        let report = history(&records);
        let texts: Vec<&str> = report.records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, ["newer", "older"]);
        assert_eq!(report.completed(), 2);
        assert_eq!(report.total_focus_seconds, 2100);
        assert_eq!(report.total_xp, 200);
    }

    #[test]
    fn balance_weights_completed_over_pending() {
        let mut done = task("done", Domain::Household);
        done.completed_at = Some(t0());
        let records = vec![done, task("a", Domain::Household), task("b", Domain::Family)];
        let balance = domain_balance(&records);
        assert_eq!(balance.len(), 4);
        let household = balance.iter().find(|w| w.domain == Domain::Household).unwrap();
        assert_eq!(household.weight, 1.5);
        assert_eq!(household.completed, 1);
        assert_eq!(household.pending, 1);
        let study = balance.iter().find(|w| w.domain == Domain::Study).unwrap();
        assert_eq!(study.weight, 0.0);
    }

    #[test]
    fn upcoming_sorted_by_date_then_time() {
        let records = vec![
            event("past", "2025-12-10", Some("09:00")),
            event("late", "2025-12-15", Some("18:00")),
            event("early", "2025-12-15", Some("07:30")),
            event("today", "2025-12-14", None),
        ];
        let texts: Vec<&str> = upcoming_events(&records, date("2025-12-14"))
            .iter()
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(texts, ["today", "early", "late"]);
    }

    #[test]
    fn agenda_puts_events_before_tasks() {
        let mut due = task("due today", Domain::Work);
        due.deadline = Some(date("2025-12-14"));
        let records = vec![
            due,
            event("lunch", "2025-12-14", Some("12:00")),
            event("standup", "2025-12-14", Some("09:30")),
            event("tomorrow", "2025-12-15", Some("09:00")),
        ];
        let texts: Vec<&str> = agenda(&records, date("2025-12-14"))
            .iter()
            .map(|r| r.text.as_str())
            .collect();
        assert_eq!(texts, ["standup", "lunch", "due today"]);
    }
}
