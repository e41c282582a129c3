//! Calendar event commands.

use clap::Subcommand;
use lifeos_core::record::hhmm;
use lifeos_core::review::{agenda, upcoming_events};
use lifeos_core::{Clock, Config, Domain, EventDetails, EventType, NewRecord, RecordId, RecordPatch};

use super::{open_organizer, optional_time, print_json, CmdResult};

#[derive(Subcommand)]
pub enum EventAction {
    /// Create a calendar event
    Add {
        /// Event text
        text: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// End time (HH:MM)
        #[arg(long)]
        end: Option<String>,
        /// meeting, lecture, workout, social, health or other
        #[arg(long, default_value = "other")]
        event_type: EventType,
        #[arg(long)]
        domain: Option<Domain>,
    },
    /// Upcoming events, or one day's agenda with --date
    List {
        /// Show the agenda for this date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },
    /// Edit a pending event
    Edit {
        /// Event ID
        id: String,
        #[arg(long)]
        text: Option<String>,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
        /// Start time (HH:MM), or "none" to clear
        #[arg(long)]
        start: Option<String>,
        /// End time (HH:MM), or "none" to clear
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        event_type: Option<EventType>,
    },
    /// Mark an event attended
    Done {
        /// Event ID
        id: String,
    },
}

pub fn run(action: EventAction) -> CmdResult {
    let config = Config::load()?;
    let mut organizer = open_organizer(&config)?;

    match action {
        EventAction::Add {
            text,
            date,
            start,
            end,
            event_type,
            domain,
        } => {
            let details = EventDetails {
                event_type,
                start_time: start.as_deref().map(hhmm::parse_time).transpose()?,
                end_time: end.as_deref().map(hhmm::parse_time).transpose()?,
            };
            let draft = NewRecord::event(text, hhmm::parse_date(&date)?, details)
                .with_domain(domain.unwrap_or(config.defaults.domain));
            let record = organizer.create(draft)?;
            println!("Event created: {}", record.id);
            print_json(&record)?;
        }
        EventAction::List { date } => {
            let records = organizer.records()?;
            let listed = match date {
                Some(date) => agenda(&records, hhmm::parse_date(&date)?),
                None => upcoming_events(&records, organizer.clock().today()),
            };
            print_json(&listed)?;
        }
        EventAction::Edit {
            id,
            text,
            date,
            start,
            end,
            event_type,
        } => {
            let patch = RecordPatch {
                text,
                deadline: date
                    .as_deref()
                    .map(hhmm::parse_date)
                    .transpose()?
                    .map(Some),
                start_time: start.as_deref().map(optional_time).transpose()?,
                end_time: end.as_deref().map(optional_time).transpose()?,
                event_type,
                ..Default::default()
            };
            if patch.is_empty() {
                return Err("nothing to change".into());
            }
            let record = organizer.update(&RecordId::new(id), &patch)?;
            print_json(&record)?;
        }
        EventAction::Done { id } => match organizer.complete(&RecordId::new(id))? {
            Some(event) => print_json(&event)?,
            None => println!("nothing to complete"),
        },
    }
    Ok(())
}
