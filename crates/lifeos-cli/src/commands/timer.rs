use clap::Subcommand;
use lifeos_core::{Config, LiveSession, Organizer, RecordId, SqliteStore};

use super::{open_organizer, print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start focusing on a task, or pause it if it is already running
    Toggle {
        /// Task ID
        id: String,
    },
    /// Pause whatever is running
    Pause,
    /// Print current timer state as JSON
    Status,
    /// Tick live until Ctrl-C, printing the elapsed time each second
    Watch,
}

pub fn run(action: TimerAction) -> CmdResult {
    let config = Config::load()?;
    let mut organizer = open_organizer(&config)?;

    match action {
        TimerAction::Toggle { id } => match organizer.toggle(&RecordId::new(id))? {
            Some(event) => print_json(&event)?,
            None => println!("nothing to toggle"),
        },
        TimerAction::Pause => match organizer.active_task_id().cloned() {
            Some(active) => {
                if let Some(event) = organizer.toggle(&active)? {
                    print_json(&event)?;
                }
            }
            None => println!("timer is idle"),
        },
        TimerAction::Status => print_json(&organizer.status()?)?,
        TimerAction::Watch => {
            let Some(active) = organizer.active_task_id().cloned() else {
                println!("timer is idle");
                return Ok(());
            };
            runtime()?.block_on(watch(organizer, active))?;
        }
    }
    Ok(())
}

async fn watch(organizer: Organizer<SqliteStore>, active: RecordId) -> CmdResult {
    let session = LiveSession::start(organizer);
    let shared = session.organizer();
    let mut report = tokio::time::interval(std::time::Duration::from_secs(1));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = report.tick() => {
                let guard = shared.lock().await;
                if guard.active_task_id() != Some(&active) {
                    break;
                }
                let elapsed = guard.get(&active)?.elapsed_time;
                eprint!("\r{active} {:02}:{:02}:{:02}", elapsed / 3600, elapsed / 60 % 60, elapsed % 60);
            }
        }
    }
    eprintln!();
    session.shutdown().await?;
    print_json(&shared.lock().await.status()?)?;
    Ok(())
}
