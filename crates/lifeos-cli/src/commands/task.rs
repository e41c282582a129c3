//! Task management commands for CLI.

use clap::Subcommand;
use lifeos_core::advisory::{suggest, EstimateRequest};
use lifeos_core::{
    Clock, Config, Domain, GeminiAdvisor, NewRecord, RecordId, RecordPatch, TaskDetails,
};

use super::{open_organizer, optional_date, print_json, rating, runtime, CmdResult};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        /// Task text
        text: String,
        /// Importance 1-5 in steps of 0.5 (default: defaults.importance)
        #[arg(long)]
        importance: Option<f64>,
        /// Urgency 1-5 in steps of 0.5 (default: defaults.urgency)
        #[arg(long)]
        urgency: Option<f64>,
        /// Estimated minutes (default: schedule.default_duration)
        #[arg(long)]
        duration: Option<u32>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
        /// work, study, household or family (default: defaults.domain)
        #[arg(long)]
        domain: Option<Domain>,
        /// Ask the advisory service for ratings and duration first
        #[arg(long)]
        suggest: bool,
    },
    /// List tasks
    List {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
    /// Show one task
    Show {
        /// Task ID
        id: String,
    },
    /// Edit a pending task
    Edit {
        /// Task ID
        id: String,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        importance: Option<f64>,
        #[arg(long)]
        urgency: Option<f64>,
        #[arg(long)]
        duration: Option<u32>,
        /// Due date (YYYY-MM-DD), or "none" to clear
        #[arg(long)]
        deadline: Option<String>,
        #[arg(long)]
        domain: Option<Domain>,
    },
    /// Mark a task done and collect its XP
    Done {
        /// Task ID
        id: String,
    },
    /// Delete a task or event
    Delete {
        /// Record ID
        id: String,
    },
    /// Push the deadline back one day
    Snooze {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction) -> CmdResult {
    let config = Config::load()?;
    let mut organizer = open_organizer(&config)?;

    match action {
        TaskAction::Add {
            text,
            importance,
            urgency,
            duration,
            deadline,
            domain,
            suggest: ask,
        } => {
            let domain = domain.unwrap_or(config.defaults.domain);
            let mut details = TaskDetails::new(
                rating("importance", importance)?.unwrap_or_else(|| config.default_importance()),
                rating("urgency", urgency)?.unwrap_or_else(|| config.default_urgency()),
            )
            .with_duration(duration.unwrap_or(config.schedule.default_duration));

            if ask {
                let advisor = GeminiAdvisor::from_config(&config.advisory)?;
                let request = EstimateRequest {
                    text: text.clone(),
                    domain,
                    today: organizer.clock().today(),
                };
                let suggestion = runtime()?.block_on(suggest(&advisor, &request, details.clone()));
                match (&suggestion.error, &suggestion.reasoning) {
                    (Some(e), _) => eprintln!("advisory unavailable, keeping your values: {e}"),
                    (None, Some(reasoning)) => eprintln!("advisory: {reasoning}"),
                    (None, None) => {}
                }
                // Explicit flags win over the estimate.
                let mut estimated = suggestion.details;
                if importance.is_some() {
                    estimated.importance = details.importance;
                }
                if urgency.is_some() {
                    estimated.urgency = details.urgency;
                }
                if duration.is_some() {
                    estimated.duration = details.duration;
                }
                details = estimated;
            }

            let draft = NewRecord::task(text, details)
                .with_domain(domain)
                .with_deadline(deadline.as_deref().map(optional_date).transpose()?.flatten());
            let record = organizer.create(draft)?;
            println!("Task created: {}", record.id);
            print_json(&record)?;
        }
        TaskAction::List { all } => {
            let tasks: Vec<_> = organizer
                .records()?
                .into_iter()
                .filter(|r| r.is_task() && (all || r.is_pending()))
                .collect();
            print_json(&tasks)?;
        }
        TaskAction::Show { id } => {
            let record = organizer.get(&RecordId::new(id))?;
            print_json(&record)?;
        }
        TaskAction::Edit {
            id,
            text,
            importance,
            urgency,
            duration,
            deadline,
            domain,
        } => {
            let patch = RecordPatch {
                text,
                domain,
                deadline: deadline.as_deref().map(optional_date).transpose()?,
                importance: rating("importance", importance)?,
                urgency: rating("urgency", urgency)?,
                duration,
                ..Default::default()
            };
            if patch.is_empty() {
                return Err("nothing to change".into());
            }
            let record = organizer.update(&RecordId::new(id), &patch)?;
            print_json(&record)?;
        }
        TaskAction::Done { id } => match organizer.complete(&RecordId::new(id))? {
            Some(event) => print_json(&event)?,
            None => println!("nothing to complete"),
        },
        TaskAction::Delete { id } => match organizer.delete(&RecordId::new(id))? {
            Some(event) => print_json(&event)?,
            None => println!("nothing to delete"),
        },
        TaskAction::Snooze { id } => {
            let event = organizer.snooze(&RecordId::new(id))?;
            print_json(&event)?;
        }
    }
    Ok(())
}
