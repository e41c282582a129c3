//! SQLite-backed record store.
//!
//! Provides persistent storage for:
//! - Task and event records, one row each, in insertion order
//! - Key-value store for application state (xp ledger, focus timer)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{data_dir, RecordStore};
use crate::error::{DatabaseError, Result};
use crate::record::{
    hhmm, Domain, EventDetails, EventType, Rating, Record, RecordId, RecordKind, TaskDetails,
};

const RECORD_COLUMNS: &str = "id, kind, text, domain, deadline, elapsed_time, completed_at, \
     earned_xp, created_at, importance, urgency, duration, schedule_order, event_type, \
     start_time, end_time";

/// SQLite database holding records and kv state.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/lifeos.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("lifeos.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    seq            INTEGER PRIMARY KEY AUTOINCREMENT,
                    id             TEXT NOT NULL UNIQUE,
                    kind           TEXT NOT NULL,
                    text           TEXT NOT NULL,
                    domain         TEXT NOT NULL DEFAULT 'work',
                    deadline       TEXT,
                    elapsed_time   INTEGER NOT NULL DEFAULT 0,
                    completed_at   TEXT,
                    earned_xp      INTEGER,
                    created_at     TEXT NOT NULL,
                    importance     REAL,
                    urgency        REAL,
                    duration       INTEGER,
                    schedule_order INTEGER,
                    event_type     TEXT,
                    start_time     TEXT,
                    end_time       TEXT
                );

                CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_records_completed_at ON records(completed_at);
                CREATE INDEX IF NOT EXISTS idx_records_deadline ON records(deadline);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }
}

/// Raw column values of one `records` row.
struct RecordRow {
    id: String,
    kind: String,
    text: String,
    domain: String,
    deadline: Option<String>,
    elapsed_time: u64,
    completed_at: Option<String>,
    earned_xp: Option<u64>,
    created_at: String,
    importance: Option<f64>,
    urgency: Option<f64>,
    duration: Option<u32>,
    schedule_order: Option<u32>,
    event_type: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
}

impl RecordRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            kind: row.get(1)?,
            text: row.get(2)?,
            domain: row.get(3)?,
            deadline: row.get(4)?,
            elapsed_time: row.get(5)?,
            completed_at: row.get(6)?,
            earned_xp: row.get(7)?,
            created_at: row.get(8)?,
            importance: row.get(9)?,
            urgency: row.get(10)?,
            duration: row.get(11)?,
            schedule_order: row.get(12)?,
            event_type: row.get(13)?,
            start_time: row.get(14)?,
            end_time: row.get(15)?,
        })
    }

    fn into_record(self) -> Result<Record, DatabaseError> {
        let id = self.id;
        let corrupt = |message: String| DatabaseError::CorruptRow {
            id: id.clone(),
            message,
        };

        let kind = match self.kind.as_str() {
            "task" => RecordKind::Task(TaskDetails {
                importance: parse_rating("importance", self.importance).map_err(corrupt)?,
                urgency: parse_rating("urgency", self.urgency).map_err(corrupt)?,
                duration: self.duration.unwrap_or(crate::record::DEFAULT_DURATION_MIN),
                schedule_order: self.schedule_order,
            }),
            "event" => RecordKind::Event(EventDetails {
                event_type: match self.event_type.as_deref() {
                    Some(s) => s.parse::<EventType>().map_err(|e| corrupt(e.to_string()))?,
                    None => EventType::default(),
                },
                start_time: parse_opt_time(self.start_time.as_deref()).map_err(corrupt)?,
                end_time: parse_opt_time(self.end_time.as_deref()).map_err(corrupt)?,
            }),
            other => return Err(corrupt(format!("unknown kind '{other}'"))),
        };

        let record = Record {
            domain: self
                .domain
                .parse::<Domain>()
                .map_err(|e| corrupt(e.to_string()))?,
            deadline: self
                .deadline
                .as_deref()
                .map(parse_date)
                .transpose()
                .map_err(corrupt)?,
            elapsed_time: self.elapsed_time,
            completed_at: self
                .completed_at
                .as_deref()
                .map(parse_instant)
                .transpose()
                .map_err(corrupt)?,
            earned_xp: self.earned_xp,
            created_at: parse_instant(&self.created_at).map_err(corrupt)?,
            text: self.text,
            kind,
            id: RecordId::new(id.clone()),
        };
        Ok(record)
    }
}

fn parse_rating(field: &'static str, value: Option<f64>) -> Result<Rating, String> {
    match value {
        Some(v) => Rating::for_field(field, v).map_err(|e| e.to_string()),
        None => Ok(Rating::default()),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    hhmm::parse_date(s).map_err(|e| e.to_string())
}

fn parse_opt_time(s: Option<&str>) -> Result<Option<chrono::NaiveTime>, String> {
    s.filter(|s| !s.is_empty())
        .map(|s| hhmm::parse_time(s).map_err(|e| e.to_string()))
        .transpose()
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{s}': {e}"))
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

impl RecordStore for SqliteStore {
    fn list(&self) -> Result<Vec<Record>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY seq"))?;
        let rows = stmt.query_map([], RecordRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }

    fn get(&self, id: &RecordId) -> Result<Option<Record>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
                params![id.as_str()],
                RecordRow::from_row,
            )
            .optional()?;
        Ok(row.map(RecordRow::into_record).transpose()?)
    }

    fn save(&mut self, record: &Record) -> Result<()> {
        let (task, event) = match &record.kind {
            RecordKind::Task(task) => (Some(task), None),
            RecordKind::Event(event) => (None, Some(event)),
        };
        self.conn.execute(
            &format!(
                "INSERT INTO records ({RECORD_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
                 ON CONFLICT(id) DO UPDATE SET
                    kind = excluded.kind,
                    text = excluded.text,
                    domain = excluded.domain,
                    deadline = excluded.deadline,
                    elapsed_time = excluded.elapsed_time,
                    completed_at = excluded.completed_at,
                    earned_xp = excluded.earned_xp,
                    created_at = excluded.created_at,
                    importance = excluded.importance,
                    urgency = excluded.urgency,
                    duration = excluded.duration,
                    schedule_order = excluded.schedule_order,
                    event_type = excluded.event_type,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time"
            ),
            params![
                record.id.as_str(),
                record.kind.name(),
                record.text,
                record.domain.as_str(),
                record.deadline.map(format_date),
                record.elapsed_time,
                record.completed_at.map(|t| t.to_rfc3339()),
                record.earned_xp,
                record.created_at.to_rfc3339(),
                task.map(|t| t.importance.value()),
                task.map(|t| t.urgency.value()),
                task.map(|t| t.duration),
                task.and_then(|t| t.schedule_order),
                event.map(|e| e.event_type.as_str()),
                event.and_then(|e| e.start_time).map(hhmm::format_time),
                event.and_then(|e| e.end_time).map(hhmm::format_time),
            ],
        )?;
        Ok(())
    }

    fn delete(&mut self, id: &RecordId) -> Result<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM records WHERE id = ?1", params![id.as_str()])?;
        Ok(removed > 0)
    }

    /// Get a value from the kv store.
    fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    fn kv_set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute("DELETE FROM records", [])?;
        Ok(())
    }
}
