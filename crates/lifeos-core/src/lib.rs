//! # LifeOS Core Library
//!
//! This library provides the core logic for the LifeOS personal organizer:
//! tasks and calendar events, a "what to do now" ranking, a packed daily
//! timetable, and a single-slot focus timer that rewards completions with XP.
//! The `lifeos` CLI is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Records**: tasks and events as one tagged record type, validated on
//!   every write
//! - **Scoring / Ranking**: deadline-plus-matrix score and the views built on it
//! - **Scheduler**: sequential timetable packing from a start time
//! - **Timer**: a wall-clock-based state machine, optionally driven by an
//!   async one-second ticker
//! - **Storage**: SQLite-based record storage and TOML-based configuration
//! - **Advisory**: port to an external estimate/reorder service with a Gemini
//!   adapter
//!
//! ## Key Components
//!
//! - [`Organizer`]: controller owning the store, timer and ledger
//! - [`SqliteStore`]: record persistence
//! - [`Config`]: application configuration management
//! - [`Advisor`]: trait for the advisory service

pub mod advisory;
pub mod clock;
pub mod error;
pub mod events;
pub mod export;
pub mod ledger;
pub mod organizer;
pub mod ranking;
pub mod record;
pub mod review;
pub mod scheduler;
pub mod scoring;
pub mod storage;
pub mod timer;

pub use advisory::{Advisor, Estimate, EstimateRequest, GeminiAdvisor, ScheduleCandidate};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{AdvisoryError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use export::Snapshot;
pub use ledger::{LevelProgress, RewardLedger};
pub use organizer::{Organizer, TickOutcome};
pub use ranking::{MatrixView, Quadrant, Ranked};
pub use record::{
    Domain, EventDetails, EventType, NewRecord, Rating, Record, RecordId, RecordKind, RecordPatch,
    TaskDetails,
};
pub use scheduler::{SchedulerConfig, TimetableBuilder, TimetableSlot};
pub use scoring::ScoreBreakdown;
pub use storage::{Config, MemoryStore, RecordStore, SqliteStore};
pub use timer::{FocusTimer, LiveSession, TickHandle, TimerState};
