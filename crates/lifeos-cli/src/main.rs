use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lifeos", version, about = "LifeOS personal organizer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Calendar events
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Pending tasks ranked by what to do now
    Focus {
        /// Show only the first N tasks
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Pending tasks in Eisenhower quadrants
    Matrix,
    /// Today's packed timetable
    Schedule {
        #[command(subcommand)]
        action: Option<commands::schedule::ScheduleAction>,
        /// Start time (HH:MM), defaults to schedule.start_time
        #[arg(long, global = true)]
        start: Option<String>,
    },
    /// Focus timer control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Experience, history and reports
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Advisory service
    Advise {
        #[command(subcommand)]
        action: commands::advise::AdviseAction,
    },
    /// Export and import all data
    Data {
        #[command(subcommand)]
        action: commands::data::DataAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Event { action } => commands::event::run(action),
        Commands::Focus { limit } => commands::focus::run(limit),
        Commands::Matrix => commands::matrix::run(),
        Commands::Schedule { action, start } => commands::schedule::run(action, start),
        Commands::Timer { action } => commands::timer::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Advise { action } => commands::advise::run(action),
        Commands::Data { action } => commands::data::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
