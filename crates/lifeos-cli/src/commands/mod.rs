pub mod advise;
pub mod config;
pub mod data;
pub mod event;
pub mod focus;
pub mod matrix;
pub mod schedule;
pub mod stats;
pub mod task;
pub mod timer;

use std::sync::Arc;

use lifeos_core::record::hhmm;
use lifeos_core::{Config, CoreError, Organizer, Rating, SqliteStore, SystemClock};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Open the on-disk organizer.
///
/// Focus time that passed while no process was running is credited before
/// anything else happens.
pub fn open_organizer(config: &Config) -> Result<Organizer<SqliteStore>, CoreError> {
    let store = SqliteStore::open()?;
    let mut organizer = Organizer::load(store, Arc::new(SystemClock))?
        .with_scheduler_config(config.scheduler());
    let credited = organizer.settle()?;
    if credited > 0 {
        tracing::debug!(credited, "credited focus time since last run");
    }
    Ok(organizer)
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Single-threaded runtime for commands that talk to the network or tick.
pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

pub fn rating(field: &'static str, value: Option<f64>) -> Result<Option<Rating>, CoreError> {
    Ok(value.map(|v| Rating::for_field(field, v)).transpose()?)
}

pub fn start_time(arg: Option<&str>, config: &Config) -> Result<chrono::NaiveTime, CoreError> {
    match arg {
        Some(s) => Ok(hhmm::parse_time(s)?),
        None => Ok(config.start_time()),
    }
}

/// `--deadline none` clears, anything else is a date.
pub fn optional_date(arg: &str) -> Result<Option<chrono::NaiveDate>, CoreError> {
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(hhmm::parse_date(arg)?))
}

/// `--start none` clears, anything else is a time.
pub fn optional_time(arg: &str) -> Result<Option<chrono::NaiveTime>, CoreError> {
    if arg.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(hhmm::parse_time(arg)?))
}
