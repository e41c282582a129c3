mod config;
pub mod database;
mod memory;

pub use config::{AdvisoryConfig, Config, DefaultsConfig, ScheduleConfig};
pub use database::SqliteStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use std::path::PathBuf;

use crate::error::{ConfigError, CoreError, Result};
use crate::record::{NewRecord, Record, RecordId, RecordPatch};

/// Returns the data directory, creating it if needed.
///
/// `LIFEOS_HOME` wins when set. Otherwise `~/.config/lifeos`, or
/// `~/.config/lifeos-dev` with `LIFEOS_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("LIFEOS_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("LIFEOS_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("lifeos-dev")
            } else {
                base_dir.join("lifeos")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

/// Persistence boundary for records plus a small key-value area for
/// process-wide state (xp, timer).
///
/// Implementations keep records in insertion order; `save` on an existing id
/// replaces it in place.
pub trait RecordStore {
    fn list(&self) -> Result<Vec<Record>>;

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        Ok(self.list()?.into_iter().find(|r| &r.id == id))
    }

    /// Insert or replace by id.
    fn save(&mut self, record: &Record) -> Result<()>;

    /// Remove by id. Returns whether anything was removed.
    fn delete(&mut self, id: &RecordId) -> Result<bool>;

    fn kv_get(&self, key: &str) -> Result<Option<String>>;

    fn kv_set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Validate and store a new record with a fresh id and zeroed counters.
    fn create(&mut self, draft: NewRecord, now: DateTime<Utc>) -> Result<Record> {
        draft.validate()?;
        let record = draft.into_record(now);
        self.save(&record)?;
        Ok(record)
    }

    /// Apply a partial update and return the new state.
    ///
    /// The id never changes; completed records are rejected.
    fn update(&mut self, id: &RecordId, patch: &RecordPatch) -> Result<Record> {
        let mut record = self.get(id)?.ok_or_else(|| CoreError::not_found(id))?;
        patch.apply(&mut record)?;
        self.save(&record)?;
        Ok(record)
    }

    /// Remove every record. Key-value state is left alone.
    fn clear(&mut self) -> Result<()> {
        for record in self.list()? {
            self.delete(&record.id)?;
        }
        Ok(())
    }
}
