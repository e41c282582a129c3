//! Ranked "what to do now" queue.

use lifeos_core::Config;

use super::{open_organizer, print_json, CmdResult};

pub fn run(limit: Option<usize>) -> CmdResult {
    let config = Config::load()?;
    let organizer = open_organizer(&config)?;

    let mut queue = organizer.focus_queue()?;
    if let Some(limit) = limit {
        queue.truncate(limit);
    }
    print_json(&queue)?;
    Ok(())
}
