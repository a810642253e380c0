//! studyos CLI
//!
//! Command-line interface for studyos - subjects, topics, schedule, habits,
//! journal and saved content, stored locally.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use studyos_core::{Config, CoreError, Platform, Priority, Store, SubjectStatus, SubjectUpdate};

mod commands;
mod output;

use commands::parse_date;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "studyos")]
#[command(about = "studyos - Local-first study tracking")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage subjects
    Subject {
        #[command(subcommand)]
        command: SubjectCommands,
    },
    /// Manage topics within a subject
    Topic {
        #[command(subcommand)]
        command: TopicCommands,
    },
    /// Plan the day
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
    /// Daily journal
    Journal {
        #[command(subcommand)]
        command: JournalCommands,
    },
    /// Daily habits
    Habit {
        #[command(subcommand)]
        command: HabitCommands,
    },
    /// User profile and study streak
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Overall progress across active subjects
    Progress,
    /// Detailed metrics for one subject
    Metrics {
        /// Subject ID
        subject: String,
    },
    /// Saved posts and videos
    Content {
        #[command(subcommand)]
        command: ContentCommands,
    },
    /// Import saved content
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Export or restore all data
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// Show storage usage and counts
    Status,
    /// Print overall progress whenever it changes
    Watch,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum SubjectCommands {
    /// Add a subject
    #[command(alias = "create")]
    Add {
        /// Subject name
        name: String,
        /// Exam date (YYYY-MM-DD, today, +N)
        #[arg(short, long, value_parser = parse_date)]
        exam: NaiveDate,
        /// Start date (defaults to today)
        #[arg(short, long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        /// Initial status (upcoming or active)
        #[arg(long)]
        status: Option<SubjectStatus>,
        /// Target score, 0-100
        #[arg(short, long)]
        target: Option<u32>,
        /// Planned study hours
        #[arg(long, default_value_t = 0.0)]
        hours: f64,
        /// Display color
        #[arg(long)]
        color: Option<String>,
        /// Subject type (exam, course, ...)
        #[arg(long = "type", default_value = "")]
        kind: String,
        #[arg(long, default_value = "")]
        semester: String,
        #[arg(long, default_value = "medium")]
        importance: Priority,
        /// Topics to create with the subject
        #[arg(long = "topic")]
        topics: Vec<String>,
    },
    /// List subjects
    #[command(alias = "ls")]
    List {
        /// Filter by status
        #[arg(short, long)]
        status: Option<SubjectStatus>,
    },
    /// Show a subject and its topics
    Show {
        /// Subject ID
        id: String,
    },
    /// Update subject fields
    Update {
        /// Subject ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long, value_parser = parse_date)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date)]
        exam: Option<NaiveDate>,
        #[arg(long)]
        target: Option<u32>,
        /// Achieved score
        #[arg(long)]
        score: Option<u32>,
        #[arg(long)]
        hours: Option<f64>,
        #[arg(long)]
        hours_completed: Option<f64>,
        #[arg(long = "type")]
        kind: Option<String>,
        #[arg(long)]
        semester: Option<String>,
        #[arg(long)]
        importance: Option<Priority>,
    },
    /// Change status (upcoming → active → archived → active)
    Status {
        /// Subject ID
        id: String,
        /// New status
        status: SubjectStatus,
    },
    /// Archive a subject
    Archive {
        /// Subject ID
        id: String,
    },
    /// Delete a subject and its topics
    #[command(alias = "rm")]
    Delete {
        /// Subject ID
        id: String,
    },
}

#[derive(Subcommand)]
enum TopicCommands {
    /// Add a topic
    Add {
        /// Subject ID
        subject: String,
        /// Topic name
        name: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
        /// Starting mastery, 0-100
        #[arg(short, long, allow_negative_numbers = true)]
        mastery: Option<i64>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Set mastery (0-100)
    Mastery {
        subject: String,
        topic: String,
        #[arg(allow_negative_numbers = true)]
        mastery: i64,
    },
    /// Mark a revision pass done (r1, r2 or r3)
    Revise {
        subject: String,
        topic: String,
        level: String,
    },
    /// Log hours studied
    Study {
        subject: String,
        topic: String,
        hours: f64,
    },
    /// Replace a topic's notes
    Notes {
        subject: String,
        topic: String,
        notes: String,
    },
    /// Delete a topic
    #[command(alias = "rm")]
    Delete { subject: String, topic: String },
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Plan a block
    Add {
        /// Start time (HH:mm)
        time: String,
        /// What to do
        activity: String,
        /// Length in minutes
        #[arg(short, long, default_value_t = 60)]
        duration: u32,
        /// Block type (study, review, break, ...)
        #[arg(long = "type", default_value = "study")]
        kind: String,
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
    /// Show a day's plan
    #[command(alias = "ls")]
    List {
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
    /// Mark a block done
    Complete {
        /// Block ID (full or prefix)
        id: String,
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
    /// Remove a block
    #[command(alias = "rm")]
    Delete {
        /// Block ID (full or prefix)
        id: String,
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum JournalCommands {
    /// Write the day's entry from key=value fields
    Save {
        /// Fields, e.g. mood=focused wins='["set 3"]'
        #[arg(required = true)]
        fields: Vec<String>,
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
    /// Show the day's entry
    Show {
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum HabitCommands {
    /// Check off a habit
    Log {
        name: String,
        /// Record the habit as missed
        #[arg(long)]
        missed: bool,
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
    /// Show a day's habits
    #[command(alias = "ls")]
    List {
        #[arg(long, value_parser = parse_date, default_value = "today")]
        date: NaiveDate,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the profile
    Show,
    /// Set a profile field (name, total_study_hours or any custom key)
    Set { key: String, value: String },
    /// Count today as a study day
    Streak,
}

#[derive(Subcommand)]
enum ContentCommands {
    /// List saved items
    #[command(alias = "ls")]
    List {
        #[arg(short, long)]
        platform: Option<Platform>,
        /// Only items not yet watched
        #[arg(short, long)]
        unwatched: bool,
    },
    /// Mark an item watched
    Watched {
        platform: Platform,
        id: String,
        /// Mark as unwatched instead
        #[arg(long)]
        unset: bool,
    },
    /// Remove an item
    #[command(alias = "rm")]
    Delete { platform: Platform, id: String },
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Import a JSON array of YouTube videos
    Youtube { file: PathBuf },
    /// Import saved-post scraper output
    Scraped { file: PathBuf },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Write all data to a file (`-` for stdout)
    Export { file: PathBuf },
    /// Restore data from a backup file
    Import { file: PathBuf },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, quota_bytes, refresh_interval_ms, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(e) = run(cli.command, &output).await {
        report_error(&e, &output);
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: &Output) -> Result<()> {
    // Config commands work even when the data directory is unusable
    if let Commands::Config { command } = command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(output),
            Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, output),
        };
    }

    let config = Config::load()?;
    init_logging(&config);
    config.ensure_data_dir()?;
    let store = Store::open_with_config(config);

    match command {
        Commands::Subject { command } => handle_subject_command(command, &store, output),
        Commands::Topic { command } => handle_topic_command(command, &store, output),
        Commands::Schedule { command } => handle_schedule_command(command, &store, output),
        Commands::Journal { command } => match command {
            JournalCommands::Save { fields, date } => {
                commands::journal::save(&store, date, &fields, output)
            }
            JournalCommands::Show { date } => commands::journal::show(&store, date, output),
        },
        Commands::Habit { command } => match command {
            HabitCommands::Log { name, missed, date } => {
                commands::journal::log_habit(&store, date, &name, missed, output)
            }
            HabitCommands::List { date } => commands::journal::list_habits(&store, date, output),
        },
        Commands::Profile { command } => match command {
            Some(ProfileCommands::Show) | None => commands::profile::show(&store, output),
            Some(ProfileCommands::Set { key, value }) => {
                commands::profile::set(&store, &key, &value, output)
            }
            Some(ProfileCommands::Streak) => commands::profile::streak(&store, output),
        },
        Commands::Progress => commands::progress::overall(&store, output),
        Commands::Metrics { subject } => commands::progress::metrics(&store, &subject, output),
        Commands::Content { command } => match command {
            ContentCommands::List {
                platform,
                unwatched,
            } => commands::content::list(&store, platform, unwatched, output),
            ContentCommands::Watched {
                platform,
                id,
                unset,
            } => commands::content::watched(&store, platform, &id, unset, output),
            ContentCommands::Delete { platform, id } => {
                commands::content::delete(&store, platform, &id, output)
            }
        },
        Commands::Import { command } => match command {
            ImportCommands::Youtube { file } => commands::import::youtube(&store, &file, output),
            ImportCommands::Scraped { file } => commands::import::scraped(&store, &file, output),
        },
        Commands::Backup { command } => match command {
            BackupCommands::Export { file } => commands::backup::export(&store, &file, output),
            BackupCommands::Import { file } => commands::backup::import(&store, &file, output),
        },
        Commands::Status => commands::status::show(&store, output),
        Commands::Watch => commands::progress::watch(store, output).await,
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

fn handle_subject_command(command: SubjectCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        SubjectCommands::Add {
            name,
            exam,
            start,
            status,
            target,
            hours,
            color,
            kind,
            semester,
            importance,
            topics,
        } => commands::subject::add(
            store,
            commands::subject::AddArgs {
                name,
                exam,
                start,
                status,
                target,
                hours,
                color,
                kind,
                semester,
                importance,
                topics,
            },
            output,
        ),
        SubjectCommands::List { status } => commands::subject::list(store, status, output),
        SubjectCommands::Show { id } => commands::subject::show(store, &id, output),
        SubjectCommands::Update {
            id,
            name,
            color,
            start,
            exam,
            target,
            score,
            hours,
            hours_completed,
            kind,
            semester,
            importance,
        } => {
            let update = SubjectUpdate {
                name,
                color,
                start_date: start,
                exam_date: exam,
                target_score: target,
                actual_score: score,
                total_hours: hours,
                hours_completed,
                subject_type: kind,
                semester,
                importance,
            };
            commands::subject::update(store, &id, update, output)
        }
        SubjectCommands::Status { id, status } => {
            commands::subject::set_status(store, &id, status, output)
        }
        SubjectCommands::Archive { id } => {
            commands::subject::set_status(store, &id, SubjectStatus::Archived, output)
        }
        SubjectCommands::Delete { id } => commands::subject::delete(store, &id, output),
    }
}

fn handle_topic_command(command: TopicCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        TopicCommands::Add {
            subject,
            name,
            priority,
            mastery,
            notes,
        } => commands::topic::add(store, &subject, name, priority, mastery, notes, output),
        TopicCommands::Mastery {
            subject,
            topic,
            mastery,
        } => commands::topic::mastery(store, &subject, &topic, mastery, output),
        TopicCommands::Revise {
            subject,
            topic,
            level,
        } => commands::topic::revise(store, &subject, &topic, &level, output),
        TopicCommands::Study {
            subject,
            topic,
            hours,
        } => commands::topic::study(store, &subject, &topic, hours, output),
        TopicCommands::Notes {
            subject,
            topic,
            notes,
        } => commands::topic::notes(store, &subject, &topic, &notes, output),
        TopicCommands::Delete { subject, topic } => {
            commands::topic::delete(store, &subject, &topic, output)
        }
    }
}

fn handle_schedule_command(command: ScheduleCommands, store: &Store, output: &Output) -> Result<()> {
    match command {
        ScheduleCommands::Add {
            time,
            activity,
            duration,
            kind,
            date,
        } => commands::schedule::add(store, date, time, activity, duration, kind, output),
        ScheduleCommands::List { date } => commands::schedule::list(store, date, output),
        ScheduleCommands::Complete { id, date } => {
            commands::schedule::complete(store, date, &id, output)
        }
        ScheduleCommands::Delete { id, date } => commands::schedule::delete(store, date, &id, output),
    }
}

/// Print a failure inline, as `{success: false, ...}` in JSON mode
fn report_error(error: &anyhow::Error, output: &Output) {
    if output.is_json() {
        let failure = match error.chain().find_map(|e| e.downcast_ref::<CoreError>()) {
            Some(core) => serde_json::json!(core.to_failure()),
            None => serde_json::json!({"success": false, "kind": "cli", "error": format!("{:#}", error)}),
        };
        println!("{}", failure);
        return;
    }

    eprintln!("Error: {:#}", error);
    if let Some(hint) = error
        .chain()
        .find_map(|e| e.downcast_ref::<CoreError>())
        .and_then(|e| match e {
            CoreError::Storage(storage) => storage.recovery_suggestion(),
            _ => None,
        })
    {
        eprintln!("  {}", hint);
    }
}

/// Initialize logging
///
/// Only initializes if STUDYOS_LOG is set. Logs to `config.log_file` when
/// configured, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("STUDYOS_LOG") else {
        return;
    };

    let env_filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| {
        EnvFilter::new(format!("studyos_core={},studyos={}", log_level, log_level))
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    match &config.log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let _ = builder.with_ansi(false).with_writer(file).try_init();
            }
            Err(e) => {
                eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                return;
            }
        },
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }

    info!("Logging initialized on {}", Local::now().format("%Y-%m-%d %H:%M"));
}
