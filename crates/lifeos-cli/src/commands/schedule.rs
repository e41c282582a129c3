//! Timetable commands.

use clap::Subcommand;
use lifeos_core::{Config, GeminiAdvisor};

use super::{open_organizer, print_json, runtime, start_time, CmdResult};

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Show the packed timetable (default)
    Show,
    /// Ask the advisory service for a better order, then show the result
    Optimize,
    /// Forget any advisory order
    Clear,
}

pub fn run(action: Option<ScheduleAction>, start: Option<String>) -> CmdResult {
    let config = Config::load()?;
    let mut organizer = open_organizer(&config)?;
    let start = start_time(start.as_deref(), &config)?;

    match action.unwrap_or(ScheduleAction::Show) {
        ScheduleAction::Show => {}
        ScheduleAction::Optimize => {
            let advisor = GeminiAdvisor::from_config(&config.advisory)?;
            let event = runtime()?.block_on(organizer.optimize_schedule(&advisor, start))?;
            eprintln!("{}", serde_json::to_string(&event)?);
        }
        ScheduleAction::Clear => {
            let cleared = organizer.clear_schedule_order()?;
            eprintln!("cleared order on {cleared} task(s)");
        }
    }

    print_json(&organizer.timetable(start)?)?;
    Ok(())
}
