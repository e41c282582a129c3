//! Backup commands.

use std::path::PathBuf;

use clap::Subcommand;
use lifeos_core::{Config, Snapshot};

use super::{open_organizer, print_json, CmdResult};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write every record and the XP total as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Replace all data with a previously exported file
    Import {
        /// Snapshot file
        path: PathBuf,
    },
    /// Delete every task and event. XP is kept.
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: DataAction) -> CmdResult {
    let config = Config::load()?;
    let mut organizer = open_organizer(&config)?;

    match action {
        DataAction::Export { output } => {
            let snapshot = organizer.export()?;
            match output {
                Some(path) => {
                    snapshot.write_to(&path)?;
                    println!("exported {} record(s) to {}", snapshot.records.len(), path.display());
                }
                None => println!("{}", snapshot.to_json()?),
            }
        }
        DataAction::Import { path } => {
            let snapshot = Snapshot::read_from(&path)?;
            let event = organizer.import(snapshot)?;
            print_json(&event)?;
        }
        DataAction::Reset { yes } => {
            if !yes {
                return Err("refusing to delete all data without --yes".into());
            }
            let removed = organizer.reset()?;
            println!("deleted {removed} record(s)");
        }
    }
    Ok(())
}
