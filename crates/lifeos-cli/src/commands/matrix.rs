use lifeos_core::Config;

use super::{open_organizer, print_json, CmdResult};

pub fn run() -> CmdResult {
    let config = Config::load()?;
    let organizer = open_organizer(&config)?;
    print_json(&organizer.matrix()?)?;
    Ok(())
}
