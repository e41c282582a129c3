//! Experience, history and balance reports.

use clap::Subcommand;
use lifeos_core::record::hhmm;
use lifeos_core::review::{agenda, domain_balance, history, upcoming_events};
use lifeos_core::{Clock, Config};
use serde_json::json;

use super::{open_organizer, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// XP, level and progress to the next level
    Xp,
    /// Completed records, newest first
    History {
        /// Show only the first N records
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Activity weight per domain
    Balance,
    /// Pending events from today on
    Upcoming,
    /// Everything due on one day (default: today)
    Agenda {
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
}

pub fn run(action: StatsAction) -> CmdResult {
    let config = Config::load()?;
    let organizer = open_organizer(&config)?;
    let records = organizer.records()?;

    match action {
        StatsAction::Xp => {
            print_json(&json!({
                "xp": organizer.xp(),
                "level": organizer.level(),
                "progress": organizer.progress(),
            }))?;
        }
        StatsAction::History { limit } => {
            let mut report = history(&records);
            if let Some(limit) = limit {
                report.records.truncate(limit);
            }
            print_json(&report)?;
        }
        StatsAction::Balance => print_json(&domain_balance(&records))?,
        StatsAction::Upcoming => {
            print_json(&upcoming_events(&records, organizer.clock().today()))?;
        }
        StatsAction::Agenda { date } => {
            let date = match date {
                Some(d) => hhmm::parse_date(&d)?,
                None => organizer.clock().today(),
            };
            print_json(&agenda(&records, date))?;
        }
    }
    Ok(())
}
