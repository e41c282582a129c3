//! Advisory service boundary.
//!
//! The organizer consumes an external service that estimates ratings for a
//! new task and proposes a timetable order. Outputs are only suggestions:
//! nothing here touches stored records, and every failure leaves the caller
//! with its prior values.

mod gemini;

pub use gemini::GeminiAdvisor;

use std::collections::HashSet;
use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AdvisoryError;
use crate::record::{Domain, Rating, Record, RecordId, TaskDetails};

/// Environment variable checked before the keyring.
pub const API_KEY_ENV: &str = "LIFEOS_GEMINI_API_KEY";
/// Keyring entry holding the API key.
pub const API_KEY_ENTRY: &str = "gemini_api_key";

/// Input for a rating estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimateRequest {
    pub text: String,
    pub domain: Domain,
    pub today: NaiveDate,
}

/// Suggested task fields. Absent values mean "no opinion".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub importance: Option<Rating>,
    pub urgency: Option<Rating>,
    pub duration: Option<u32>,
    pub reasoning: String,
}

impl Estimate {
    /// Decode a loosely typed service answer.
    ///
    /// Ratings are clamped into range and snapped to half steps; numbers may
    /// arrive as JSON numbers or numeric strings. Non-positive durations are
    /// dropped.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, AdvisoryError> {
        let obj = value
            .as_object()
            .ok_or_else(|| AdvisoryError::Malformed(format!("expected an object, got {value}")))?;

        let number = |key: &str| -> Option<f64> {
            match obj.get(key)? {
                serde_json::Value::Number(n) => n.as_f64(),
                serde_json::Value::String(s) => s.trim().parse().ok(),
                _ => None,
            }
        };

        let duration = number("duration")
            .filter(|d| d.is_finite() && *d >= 1.0)
            .map(|d| d.round().min(u32::MAX as f64) as u32);

        Ok(Self {
            importance: number("importance").map(Rating::clamped),
            urgency: number("urgency").map(Rating::clamped),
            duration,
            reasoning: obj
                .get("reasoning")
                .and_then(|r| r.as_str())
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// Overwrite the fields the estimate has an opinion on.
    pub fn apply_to(&self, details: &mut TaskDetails) {
        if let Some(importance) = self.importance {
            details.importance = importance;
        }
        if let Some(urgency) = self.urgency {
            details.urgency = urgency;
        }
        if let Some(duration) = self.duration {
            details.duration = duration;
        }
    }
}

/// What the reorder request sees of a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleCandidate {
    pub id: RecordId,
    pub text: String,
    pub domain: Domain,
    pub importance: f64,
    pub urgency: f64,
    pub duration: u32,
}

impl ScheduleCandidate {
    pub fn from_record(record: &Record) -> Option<Self> {
        let task = record.pending_task()?;
        Some(Self {
            id: record.id.clone(),
            text: record.text.clone(),
            domain: record.domain,
            importance: task.importance.value(),
            urgency: task.urgency.value(),
            duration: task.duration,
        })
    }
}

/// Port to the advisory service.
pub trait Advisor {
    fn estimate(
        &self,
        request: &EstimateRequest,
    ) -> impl Future<Output = Result<Estimate, AdvisoryError>> + Send;

    /// Task ids in the proposed order, starting at `start`.
    fn reorder(
        &self,
        candidates: &[ScheduleCandidate],
        start: chrono::NaiveTime,
    ) -> impl Future<Output = Result<Vec<RecordId>, AdvisoryError>> + Send;
}

/// Outcome of asking for an estimate with a fallback.
#[derive(Debug)]
pub struct Suggestion {
    pub details: TaskDetails,
    pub reasoning: Option<String>,
    pub error: Option<AdvisoryError>,
}

/// Ask `advisor` for an estimate and merge it onto `prior`.
///
/// On failure `details` is exactly `prior` and the error is handed back for
/// the caller to report.
pub async fn suggest<A: Advisor>(
    advisor: &A,
    request: &EstimateRequest,
    prior: TaskDetails,
) -> Suggestion {
    match advisor.estimate(request).await {
        Ok(estimate) => {
            let mut details = prior;
            estimate.apply_to(&mut details);
            Suggestion {
                details,
                reasoning: Some(estimate.reasoning).filter(|r| !r.is_empty()),
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!("estimate failed, keeping prior values: {e}");
            Suggestion {
                details: prior,
                reasoning: None,
                error: Some(e),
            }
        }
    }
}

/// Strip Markdown code fences around a JSON answer.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Decode a reorder answer: an array of ids given as strings or numbers.
///
/// Duplicates keep their first position.
pub fn parse_reorder(value: &serde_json::Value) -> Result<Vec<RecordId>, AdvisoryError> {
    let items = value
        .as_array()
        .ok_or_else(|| AdvisoryError::Malformed(format!("expected an array of ids, got {value}")))?;

    let mut seen = HashSet::new();
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        let id = match item {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(AdvisoryError::Malformed(format!(
                    "unexpected id {other} in reorder answer"
                )))
            }
        };
        if seen.insert(id.clone()) {
            ids.push(RecordId::new(id));
        }
    }
    Ok(ids)
}

/// Resolve the API key from the environment, then the keyring.
pub fn api_key() -> Option<String> {
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Some(key.trim().to_string());
        }
    }
    match keyring_store::get(API_KEY_ENTRY) {
        Ok(key) => key.filter(|k| !k.is_empty()),
        Err(e) => {
            tracing::debug!("keyring unavailable: {e}");
            None
        }
    }
}

/// Thin wrapper around the OS keyring for credential storage.
pub mod keyring_store {
    const SERVICE: &str = "lifeos";

    pub fn get(key: &str) -> Result<Option<String>, keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.get_password() {
            Ok(pw) => Ok(Some(pw)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn set(key: &str, value: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        entry.set_password(value)
    }

    pub fn delete(key: &str) -> Result<(), keyring::Error> {
        let entry = keyring::Entry::new(SERVICE, key)?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn estimate_clamps_and_snaps() {
        let estimate = Estimate::from_json(&json!({
            "importance": 7,
            "urgency": "2.3",
            "duration": 44.6,
            "reasoning": "due soon"
        }))
        .unwrap();
        assert_eq!(estimate.importance.unwrap().value(), 5.0);
        assert_eq!(estimate.urgency.unwrap().value(), 2.5);
        assert_eq!(estimate.duration, Some(45));
        assert_eq!(estimate.reasoning, "due soon");
    }

    #[test]
    fn estimate_missing_fields_keep_prior() {
        let estimate = Estimate::from_json(&json!({ "urgency": 4, "duration": 0 })).unwrap();
        let mut details = TaskDetails::new(Rating::new(2.0).unwrap(), Rating::new(1.0).unwrap())
            .with_duration(25);
        estimate.apply_to(&mut details);
        assert_eq!(details.importance.value(), 2.0);
        assert_eq!(details.urgency.value(), 4.0);
        assert_eq!(details.duration, 25);
    }

    #[test]
    fn estimate_rejects_non_object() {
        assert!(matches!(
            Estimate::from_json(&json!([1, 2])),
            Err(AdvisoryError::Malformed(_))
        ));
    }

    #[test]
    fn reorder_accepts_strings_and_numbers() {
        let ids = parse_reorder(&json!(["task-b", 17, "task-b", "task-a"])).unwrap();
        let ids: Vec<&str> = ids.iter().map(RecordId::as_str).collect();
        assert_eq!(ids, ["task-b", "17", "task-a"]);
    }

    #[test]
    fn reorder_rejects_objects() {
        assert!(parse_reorder(&json!({ "order": [] })).is_err());
        assert!(parse_reorder(&json!([{ "id": 1 }])).is_err());
    }

    #[test]
    fn fences_are_stripped() {
        assert_eq!(strip_fences("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(strip_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
