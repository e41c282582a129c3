use std::collections::HashMap;

use super::RecordStore;
use crate::error::Result;
use crate::record::{Record, RecordId};

/// In-process store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<Record>,
    kv: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn list(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        Ok(self.records.iter().find(|r| &r.id == id).cloned())
    }

    fn save(&mut self, record: &Record) -> Result<()> {
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => *slot = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(())
    }

    fn delete(&mut self, id: &RecordId) -> Result<bool> {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        Ok(self.records.len() != before)
    }

    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.kv.get(key).cloned())
    }

    fn kv_set(&mut self, key: &str, value: &str) -> Result<()> {
        self.kv.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CoreError, ValidationError};
    use crate::record::{NewRecord, RecordPatch, TaskDetails};

    fn now() -> chrono::DateTime<chrono::Utc> {
        "2025-12-14T09:00:00Z".parse().unwrap()
    }

    #[test]
    fn create_then_update_keeps_position_and_id() {
        let mut store = MemoryStore::new();
        let a = store
            .create(NewRecord::task("a", TaskDetails::default()), now())
            .unwrap();
        let b = store
            .create(NewRecord::task("b", TaskDetails::default()), now())
            .unwrap();

        let patch = RecordPatch {
            text: Some("a2".into()),
            ..Default::default()
        };
        let updated = store.update(&a.id, &patch).unwrap();
        assert_eq!(updated.id, a.id);

        let texts: Vec<_> = store.list().unwrap().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, ["a2", "b"]);
        assert!(store.get(&b.id).unwrap().is_some());
    }

    #[test]
    fn create_rejects_invalid_draft() {
        let mut store = MemoryStore::new();
        let err = store
            .create(NewRecord::task("  ", TaskDetails::default()), now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::EmptyText)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn update_missing_is_not_found() {
        let mut store = MemoryStore::new();
        let err = store
            .update(&RecordId::from("nope"), &RecordPatch::default())
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn delete_reports_removal() {
        let mut store = MemoryStore::new();
        let a = store
            .create(NewRecord::task("a", TaskDetails::default()), now())
            .unwrap();
        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());
    }
}
