//! Task and event records.
//!
//! A record is a tagged union: the shared base (id, text, deadline, focus
//! time, completion) lives on [`Record`] and the variant-specific fields sit
//! in [`RecordKind`], so task-only data such as importance cannot be read off
//! an event without matching on the kind first.

pub mod hhmm;
mod rating;

pub use rating::Rating;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Default estimated duration for tasks, in minutes.
pub const DEFAULT_DURATION_MIN: u32 = 60;

/// Life-area tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    #[default]
    Work,
    Study,
    Household,
    Family,
}

impl Domain {
    pub const ALL: [Domain; 4] = [Domain::Work, Domain::Study, Domain::Household, Domain::Family];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Work => "work",
            Domain::Study => "study",
            Domain::Household => "household",
            Domain::Family => "family",
        }
    }

    /// Human-readable label, sent to the advisory service.
    pub fn label(self) -> &'static str {
        match self {
            Domain::Work => "Work",
            Domain::Study => "Study",
            Domain::Household => "Household",
            Domain::Family => "Family & friends",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|d| d.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "domain".into(),
                message: format!("unknown domain '{s}' (work, study, household, family)"),
            })
    }
}

/// Calendar event category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Meeting,
    Lecture,
    Workout,
    Social,
    Health,
    #[default]
    Other,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Meeting,
        EventType::Lecture,
        EventType::Workout,
        EventType::Social,
        EventType::Health,
        EventType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventType::Meeting => "meeting",
            EventType::Lecture => "lecture",
            EventType::Workout => "workout",
            EventType::Social => "social",
            EventType::Health => "health",
            EventType::Other => "other",
        }
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "event_type".into(),
                message: format!("unknown event type '{s}'"),
            })
    }
}

/// Opaque, immutable record identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Time-derived id with a random suffix, e.g. `task-1734170000123-9f2c1a7b`.
    pub fn generate(prefix: &str, now: DateTime<Utc>) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{prefix}-{}-{}", now.timestamp_millis(), &suffix[..8]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MIN
}

/// Fields that only tasks carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDetails {
    pub importance: Rating,
    pub urgency: Rating,
    /// Estimated minutes, used for timetable packing.
    #[serde(default = "default_duration")]
    pub duration: u32,
    /// Manual timetable position written by the advisory reorder.
    #[serde(default)]
    pub schedule_order: Option<u32>,
}

impl TaskDetails {
    pub fn new(importance: Rating, urgency: Rating) -> Self {
        Self {
            importance,
            urgency,
            duration: DEFAULT_DURATION_MIN,
            schedule_order: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }
}

impl Default for TaskDetails {
    fn default() -> Self {
        Self::new(Rating::default(), Rating::default())
    }
}

/// Fields that only events carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventDetails {
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default, with = "hhmm::option_time")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "hhmm::option_time")]
    pub end_time: Option<NaiveTime>,
}

/// Variant discriminant plus variant-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RecordKind {
    Task(TaskDetails),
    Event(EventDetails),
}

impl RecordKind {
    pub fn name(&self) -> &'static str {
        match self {
            RecordKind::Task(_) => "task",
            RecordKind::Event(_) => "event",
        }
    }
}

/// A stored task or event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: RecordId,
    pub text: String,
    #[serde(default)]
    pub domain: Domain,
    /// Due date for tasks, occurrence date for events.
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    /// Accumulated focus seconds.
    #[serde(default)]
    pub elapsed_time: u64,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub earned_xp: Option<u64>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: RecordKind,
}

impl Record {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.completed_at.is_none()
    }

    pub fn is_task(&self) -> bool {
        matches!(self.kind, RecordKind::Task(_))
    }

    pub fn is_event(&self) -> bool {
        matches!(self.kind, RecordKind::Event(_))
    }

    /// Pending task details, if this is a task that is not completed.
    pub fn pending_task(&self) -> Option<&TaskDetails> {
        match &self.kind {
            RecordKind::Task(details) if self.is_pending() => Some(details),
            _ => None,
        }
    }

    pub fn task(&self) -> Option<&TaskDetails> {
        match &self.kind {
            RecordKind::Task(details) => Some(details),
            RecordKind::Event(_) => None,
        }
    }

    pub fn task_mut(&mut self) -> Option<&mut TaskDetails> {
        match &mut self.kind {
            RecordKind::Task(details) => Some(details),
            RecordKind::Event(_) => None,
        }
    }

    pub fn event(&self) -> Option<&EventDetails> {
        match &self.kind {
            RecordKind::Event(details) => Some(details),
            RecordKind::Task(_) => None,
        }
    }

    /// Check every invariant that must hold before a record is stored.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_shape(&self.text, self.deadline, &self.kind)
    }
}

fn validate_shape(
    text: &str,
    deadline: Option<NaiveDate>,
    kind: &RecordKind,
) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    match kind {
        RecordKind::Task(task) => {
            if task.duration == 0 {
                return Err(ValidationError::InvalidDuration(0));
            }
        }
        RecordKind::Event(event) => {
            if deadline.is_none() {
                return Err(ValidationError::MissingEventDate);
            }
            if let (Some(start), Some(end)) = (event.start_time, event.end_time) {
                if end < start {
                    return Err(ValidationError::InvalidValue {
                        field: "end_time".into(),
                        message: format!(
                            "{} is before start {}",
                            hhmm::format_time(end),
                            hhmm::format_time(start)
                        ),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Input for creating a record; the store assigns id, timestamps and counters.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub text: String,
    pub domain: Domain,
    pub deadline: Option<NaiveDate>,
    pub kind: RecordKind,
}

impl NewRecord {
    pub fn task(text: impl Into<String>, details: TaskDetails) -> Self {
        Self {
            text: text.into(),
            domain: Domain::default(),
            deadline: None,
            kind: RecordKind::Task(details),
        }
    }

    pub fn event(text: impl Into<String>, date: NaiveDate, details: EventDetails) -> Self {
        Self {
            text: text.into(),
            domain: Domain::default(),
            deadline: Some(date),
            kind: RecordKind::Event(details),
        }
    }

    pub fn with_domain(mut self, domain: Domain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_shape(&self.text, self.deadline, &self.kind)
    }

    /// Materialize into a pending record with a fresh id.
    pub fn into_record(self, now: DateTime<Utc>) -> Record {
        Record {
            id: RecordId::generate(self.kind.name(), now),
            text: self.text.trim().to_string(),
            domain: self.domain,
            deadline: self.deadline,
            elapsed_time: 0,
            completed_at: None,
            earned_xp: None,
            created_at: now,
            kind: self.kind,
        }
    }
}

/// Partial update. `None` leaves a field untouched; the nested options on
/// clearable fields distinguish "clear" (`Some(None)`) from "keep".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub text: Option<String>,
    pub domain: Option<Domain>,
    pub deadline: Option<Option<NaiveDate>>,
    pub importance: Option<Rating>,
    pub urgency: Option<Rating>,
    pub duration: Option<u32>,
    pub schedule_order: Option<Option<u32>>,
    pub event_type: Option<EventType>,
    pub start_time: Option<Option<NaiveTime>>,
    pub end_time: Option<Option<NaiveTime>>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    /// Apply onto `record`, leaving it untouched if the result would be invalid.
    pub fn apply(&self, record: &mut Record) -> Result<(), ValidationError> {
        if record.is_completed() {
            return Err(ValidationError::RecordCompleted(record.id.to_string()));
        }

        let mut next = record.clone();
        if let Some(text) = &self.text {
            next.text = text.trim().to_string();
        }
        if let Some(domain) = self.domain {
            next.domain = domain;
        }
        if let Some(deadline) = self.deadline {
            next.deadline = deadline;
        }

        let kind_name = next.kind.name();
        match &mut next.kind {
            RecordKind::Task(task) => {
                if self.event_type.is_some() {
                    return Err(not_applicable("event_type", kind_name));
                }
                if self.start_time.is_some() {
                    return Err(not_applicable("start_time", kind_name));
                }
                if self.end_time.is_some() {
                    return Err(not_applicable("end_time", kind_name));
                }
                if let Some(importance) = self.importance {
                    task.importance = importance;
                }
                if let Some(urgency) = self.urgency {
                    task.urgency = urgency;
                }
                if let Some(duration) = self.duration {
                    task.duration = duration;
                }
                if let Some(order) = self.schedule_order {
                    task.schedule_order = order;
                }
            }
            RecordKind::Event(event) => {
                if self.importance.is_some() {
                    return Err(not_applicable("importance", kind_name));
                }
                if self.urgency.is_some() {
                    return Err(not_applicable("urgency", kind_name));
                }
                if self.duration.is_some() {
                    return Err(not_applicable("duration", kind_name));
                }
                if self.schedule_order.is_some() {
                    return Err(not_applicable("schedule_order", kind_name));
                }
                if let Some(event_type) = self.event_type {
                    event.event_type = event_type;
                }
                if let Some(start) = self.start_time {
                    event.start_time = start;
                }
                if let Some(end) = self.end_time {
                    event.end_time = end;
                }
            }
        }

        next.validate()?;
        *record = next;
        Ok(())
    }
}

fn not_applicable(field: &'static str, kind: &'static str) -> ValidationError {
    ValidationError::FieldNotApplicable { field, kind }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(v: f64) -> Rating {
        Rating::new(v).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2025-12-14T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn new_task_gets_defaults() {
        let record = NewRecord::task("  Write report ", TaskDetails::new(rating(4.0), rating(2.5)))
            .into_record(now());
        assert!(record.id.as_str().starts_with("task-"));
        assert_eq!(record.text, "Write report");
        assert_eq!(record.elapsed_time, 0);
        assert!(record.is_pending());
        assert_eq!(record.task().unwrap().duration, DEFAULT_DURATION_MIN);
    }

    #[test]
    fn empty_text_rejected() {
        let draft = NewRecord::task("   ", TaskDetails::default());
        assert_eq!(draft.validate(), Err(ValidationError::EmptyText));
    }

    #[test]
    fn event_requires_date() {
        let mut draft = NewRecord::event(
            "Standup",
            NaiveDate::from_ymd_opt(2025, 12, 15).unwrap(),
            EventDetails::default(),
        );
        assert!(draft.validate().is_ok());
        draft.deadline = None;
        assert_eq!(draft.validate(), Err(ValidationError::MissingEventDate));
    }

    #[test]
    fn record_serializes_with_kind_tag() {
        let record = NewRecord::task("Read", TaskDetails::new(rating(5.0), rating(3.0)))
            .with_domain(Domain::Study)
            .into_record(now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "task");
        assert_eq!(json["domain"], "study");
        assert_eq!(json["importance"], 5.0);
        assert_eq!(json["elapsedTime"], 0);
        assert!(json["completedAt"].is_null());

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn event_times_serialize_as_hhmm() {
        let details = EventDetails {
            event_type: EventType::Lecture,
            start_time: Some(hhmm::parse_time("10:00").unwrap()),
            end_time: Some(hhmm::parse_time("11:30").unwrap()),
        };
        let record = NewRecord::event(
            "Algorithms",
            NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(),
            details,
        )
        .into_record(now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["kind"], "event");
        assert_eq!(json["startTime"], "10:00");
        assert_eq!(json["endTime"], "11:30");
        assert_eq!(json["eventType"], "lecture");
        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn out_of_range_rating_in_json_is_rejected() {
        let json = serde_json::json!({
            "id": "task-1",
            "text": "Bad",
            "createdAt": "2025-12-14T09:00:00Z",
            "kind": "task",
            "importance": 7,
            "urgency": 3
        });
        assert!(serde_json::from_value::<Record>(json).is_err());
    }

    #[test]
    fn patch_rejects_task_fields_on_events() {
        let mut record = NewRecord::event(
            "Gym",
            NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(),
            EventDetails::default(),
        )
        .into_record(now());
        let patch = RecordPatch {
            importance: Some(rating(4.0)),
            ..Default::default()
        };
        assert_eq!(
            patch.apply(&mut record),
            Err(ValidationError::FieldNotApplicable {
                field: "importance",
                kind: "event"
            })
        );
    }

    #[test]
    fn invalid_patch_leaves_record_untouched() {
        let mut record = NewRecord::task("Plan trip", TaskDetails::default()).into_record(now());
        let before = record.clone();
        let patch = RecordPatch {
            text: Some(String::new()),
            duration: Some(30),
            ..Default::default()
        };
        assert!(patch.apply(&mut record).is_err());
        assert_eq!(record, before);
    }

    #[test]
    fn patch_on_completed_record_is_rejected() {
        let mut record = NewRecord::task("Done", TaskDetails::default()).into_record(now());
        record.completed_at = Some(now());
        let patch = RecordPatch {
            text: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(matches!(
            patch.apply(&mut record),
            Err(ValidationError::RecordCompleted(_))
        ));
    }

    #[test]
    fn domain_parses_case_insensitively() {
        assert_eq!("Household".parse::<Domain>().unwrap(), Domain::Household);
        assert!("garden".parse::<Domain>().is_err());
    }
}
