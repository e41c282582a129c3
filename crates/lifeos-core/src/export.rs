//! JSON backup format.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::record::Record;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Full organizer state: every record plus the xp total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_version")]
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub records: Vec<Record>,
}

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

impl Snapshot {
    pub fn new(records: Vec<Record>, xp: u64, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at,
            xp,
            records,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and check a backup. Ratings are range-checked while decoding.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Versions from the future and duplicate ids are refused, as is any
    /// record that would fail validation on its own.
    pub fn validate(&self) -> Result<()> {
        if self.version > SNAPSHOT_VERSION {
            return Err(CoreError::Custom(format!(
                "snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                self.version
            )));
        }
        let mut seen = std::collections::HashSet::new();
        for record in &self.records {
            record.validate()?;
            if !seen.insert(record.id.as_str()) {
                return Err(ValidationError::InvalidValue {
                    field: "id".into(),
                    message: format!("duplicate record id {}", record.id),
                }
                .into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{NewRecord, TaskDetails};

    fn now() -> DateTime<Utc> {
        "2025-12-14T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn json_roundtrip() {
        let record = NewRecord::task("Backup me", TaskDetails::default()).into_record(now());
        let snapshot = Snapshot::new(vec![record], 420, now());
        let back = Snapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let record = NewRecord::task("Twice", TaskDetails::default()).into_record(now());
        let snapshot = Snapshot::new(vec![record.clone(), record], 0, now());
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn future_version_is_rejected() {
        let json = r#"{"version": 99, "exportedAt": "2025-12-14T09:00:00Z", "xp": 0, "records": []}"#;
        assert!(Snapshot::from_json(json).is_err());
    }

    #[test]
    fn missing_optional_fields_default() {
        let json = r#"{"exportedAt": "2025-12-14T09:00:00Z"}"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        assert_eq!(snapshot.version, SNAPSHOT_VERSION);
        assert_eq!(snapshot.xp, 0);
        assert!(snapshot.records.is_empty());
    }
}
