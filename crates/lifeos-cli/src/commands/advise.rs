//! Advisory service commands.

use clap::Subcommand;
use lifeos_core::advisory::{keyring_store, EstimateRequest, API_KEY_ENTRY};
use lifeos_core::{Advisor, Clock, Config, Domain, GeminiAdvisor, SystemClock};

use super::{print_json, runtime, CmdResult};

#[derive(Subcommand)]
pub enum AdviseAction {
    /// Estimate importance, urgency and duration for a task text
    Estimate {
        /// Task text
        text: String,
        #[arg(long)]
        domain: Option<Domain>,
    },
    /// Manage the stored API key
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Store the API key in the OS keyring
    Set {
        /// API key
        value: String,
    },
    /// Remove the stored API key
    Delete,
    /// Report whether a key is available
    Status,
}

pub fn run(action: AdviseAction) -> CmdResult {
    let config = Config::load()?;

    match action {
        AdviseAction::Estimate { text, domain } => {
            let advisor = GeminiAdvisor::from_config(&config.advisory)?;
            let request = EstimateRequest {
                text,
                domain: domain.unwrap_or(config.defaults.domain),
                today: SystemClock.today(),
            };
            let estimate = runtime()?.block_on(advisor.estimate(&request))?;
            print_json(&estimate)?;
        }
        AdviseAction::Key { action } => match action {
            KeyAction::Set { value } => {
                keyring_store::set(API_KEY_ENTRY, value.trim())?;
                println!("API key stored");
            }
            KeyAction::Delete => {
                keyring_store::delete(API_KEY_ENTRY)?;
                println!("API key removed");
            }
            KeyAction::Status => {
                let advisor = GeminiAdvisor::from_config(&config.advisory)?;
                if advisor.has_credentials() {
                    println!("configured");
                } else {
                    println!("not configured");
                }
            }
        },
    }
    Ok(())
}
