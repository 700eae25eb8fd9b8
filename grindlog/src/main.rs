//! grindlog - coding practice tracker
//!
//! Log solved problems and see your contribution calendar, streaks,
//! weekly pace and time-of-day habits.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/grindlog/data.db (~/.local/share/grindlog/data.db)
//! - Config: $XDG_CONFIG_HOME/grindlog/config.toml (~/.config/grindlog/config.toml)
//! - Logs: $XDG_STATE_HOME/grindlog/

mod output;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use grindlog_core::analytics::{Dashboard, UserAnalytics};
use grindlog_core::{Config, Database, Difficulty, NewProblem, ProblemFilter, ProblemUpdate};

use output::Printer;

#[derive(Parser, Debug)]
#[command(name = "grindlog")]
#[command(about = "Track coding practice: problems, streaks and activity")]
#[command(version)]
struct Args {
    /// User whose problems to read and write (default: from config)
    #[arg(long, global = true)]
    user: Option<i64>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Database file (default: from config, else the XDG data dir)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a solved problem
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        topic: String,

        /// Easy, Medium or Hard (case-sensitive)
        #[arg(short, long)]
        difficulty: String,

        #[arg(long)]
        notes: Option<String>,

        /// Flag the problem for revision
        #[arg(long)]
        revise: bool,

        /// When it was solved: RFC 3339 or YYYY-MM-DD (default: now)
        #[arg(long)]
        solved_at: Option<String>,
    },

    /// List logged problems, newest first
    List {
        #[arg(long)]
        topic: Option<String>,

        /// Only problems flagged for revision
        #[arg(long)]
        revision: bool,

        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show one problem
    Show { id: i64 },

    /// Edit a problem
    Update {
        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        topic: Option<String>,

        #[arg(short, long)]
        difficulty: Option<String>,

        #[arg(long, conflicts_with = "clear_notes")]
        notes: Option<String>,

        #[arg(long)]
        clear_notes: bool,

        #[arg(long, conflicts_with = "no_revise")]
        revise: bool,

        #[arg(long)]
        no_revise: bool,
    },

    /// Delete a problem
    Delete { id: i64 },

    /// Totals, difficulty split, period counts and streaks
    Summary,

    /// Current and best streak
    Streak,

    /// Daily counts for the trailing year
    Contributions {
        /// Include days with no solves (text output)
        #[arg(long)]
        all: bool,
    },

    /// Solve counts for every day with activity
    Daily,

    /// Solves per topic
    Topics,

    /// Hour-of-day distribution
    Activity,

    /// Everything at once
    Dashboard,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        grindlog_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let db_path = args
        .db
        .clone()
        .unwrap_or_else(|| config.resolved_database_path());
    let db = Database::open(&db_path)
        .with_context(|| format!("failed to open database at {}", db_path.display()))?;
    db.migrate().context("failed to run database migrations")?;

    let user_id = args.user.unwrap_or(config.user.id);
    if user_id <= 0 {
        bail!("user id must be positive, got {}", user_id);
    }

    tracing::debug!(user_id, command = ?args.command, "Running command");

    let printer = Printer::new(args.format);
    run(args.command, &db, user_id, &printer)
}

fn run(command: Command, db: &Database, user_id: i64, printer: &Printer) -> Result<()> {
    let now = Local::now();
    let analytics = UserAnalytics::new(db, user_id);

    match command {
        Command::Add {
            title,
            topic,
            difficulty,
            notes,
            revise,
            solved_at,
        } => {
            let new = NewProblem {
                notes,
                needs_revision: revise,
                solved_at: solved_at.as_deref().map(parse_solved_at).transpose()?,
                ..NewProblem::new(title, topic, parse_difficulty(&difficulty)?)
            };
            let problem = db
                .create_problem(user_id, &new)
                .context("failed to log problem")?;
            printer.problem(&problem)
        }

        Command::List {
            topic,
            revision,
            limit,
        } => {
            let filter = ProblemFilter {
                topic,
                needs_revision: revision.then_some(true),
                limit,
            };
            let problems = db
                .list_problems(user_id, &filter)
                .context("failed to list problems")?;
            printer.problems(&problems)
        }

        Command::Show { id } => {
            let problem = db
                .get_problem(user_id, id)?
                .ok_or(grindlog_core::Error::ProblemNotFound(id))?;
            printer.problem(&problem)
        }

        Command::Update {
            id,
            title,
            topic,
            difficulty,
            notes,
            clear_notes,
            revise,
            no_revise,
        } => {
            let update = ProblemUpdate {
                title,
                topic,
                difficulty: difficulty.as_deref().map(parse_difficulty).transpose()?,
                notes: if clear_notes { Some(None) } else { notes.map(Some) },
                needs_revision: if revise {
                    Some(true)
                } else if no_revise {
                    Some(false)
                } else {
                    None
                },
            };
            if update.is_empty() {
                bail!("nothing to update; pass at least one field");
            }
            let problem = db.update_problem(user_id, id, &update)?;
            printer.problem(&problem)
        }

        Command::Delete { id } => {
            db.delete_problem(user_id, id)?;
            printer.deleted(id)
        }

        Command::Summary => printer.summary(&analytics.summary(&now)?),
        Command::Streak => printer.streak(&analytics.streak(&now)?),
        Command::Contributions { all } => {
            printer.contributions(&analytics.contributions(&now)?, all)
        }
        Command::Daily => printer.daily(&analytics.daily(&Local)?),
        Command::Topics => printer.topics(&analytics.topics()?),
        Command::Activity => printer.activity(&analytics.activity(&Local)?),
        Command::Dashboard => printer.dashboard(&Dashboard::build(db, user_id, &now)?),
    }
}

fn parse_difficulty(raw: &str) -> Result<Difficulty> {
    Ok(raw.parse::<Difficulty>()?)
}

/// RFC 3339 instant, or a bare date meaning local noon on that day.
fn parse_solved_at(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid --solved-at {:?}: use RFC 3339 or YYYY-MM-DD", raw))?;
    let noon = date
        .and_hms_opt(12, 0, 0)
        .context("invalid time of day")?;
    match Local.from_local_datetime(&noon).earliest() {
        Some(local) => Ok(local.with_timezone(&Utc)),
        None => bail!("{} has no local noon", raw),
    }
}
