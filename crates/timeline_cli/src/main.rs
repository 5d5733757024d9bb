//! `timeline` command-line front end.
//!
//! # Responsibility
//! - Load config, start logging and pick the table store.
//! - Resolve `--as` against the user directory.
//! - Map subcommands onto repository and directory operations and print the views.

mod args;
mod render;

use anyhow::{anyhow, bail, Context, Result};
use args::{
    parse_caller, parse_instant, parse_month, parse_priority_arg, parse_role_arg,
    parse_status_arg, CallerArg,
};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use timeline_core::db::open_db;
use timeline_core::directory::departments;
use timeline_core::model::fields::Priority;
use timeline_core::repo::LogSink;
use timeline_core::{
    can_manage_users, init_logging, EntryDraft, ProjectDraft, ProjectField, ProjectPatch,
    ProjectStatus, Role, SqliteTableStore, TableStore, TimelineRepository, TrackerConfig,
    UnconfiguredStore, UserDirectory, UserDraft, UserLoadOutcome, Visibility,
};

#[derive(Parser)]
#[command(name = "timeline")]
#[command(about = "Departmental timeline: entries, projects and their deadlines")]
#[command(version)]
struct Cli {
    /// TOML config file (store_path, log_level, log_dir, upcoming_window_days)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Act as a known username or `head:<department>`; omitted means signed out
    #[arg(long = "as", global = true, value_parser = parse_caller)]
    caller: Option<CallerArg>,

    /// Reference instant for deadline buckets (YYYY-MM-DD or RFC 3339)
    #[arg(long, global = true, value_parser = parse_instant)]
    now: Option<DateTime<Utc>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Visible entries grouped by month, newest first
    Timeline,
    /// An entry's projects by deadline urgency
    Projects { entry_id: String },
    /// Entries active on a day
    On { date: NaiveDate },
    /// Calendar grid for a month (YYYY-MM)
    Month {
        #[arg(value_parser = parse_month)]
        month: (i32, u32),
    },
    AddEntry(AddEntryArgs),
    AddProject(AddProjectArgs),
    /// Change a project's status
    SetStatus {
        project_id: String,
        #[arg(value_parser = parse_status_arg)]
        status: ProjectStatus,
        /// Reason, kept only for on_hold
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete an entry and all of its projects
    DeleteEntry { entry_id: String },
    DeleteProject { project_id: String },
    /// List departments and their divisions
    Departments,
    /// List users (admins only)
    Users,
    AddUser(AddUserArgs),
}

#[derive(Args)]
struct AddEntryArgs {
    title: String,
    #[arg(long, value_parser = parse_instant)]
    start: DateTime<Utc>,
    /// Defaults to the start; earlier values are raised to the start
    #[arg(long, value_parser = parse_instant)]
    end: Option<DateTime<Utc>>,
    #[arg(long, default_value = "")]
    pic: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, value_parser = parse_priority_arg, default_value = "Mid")]
    hmif_priority: Priority,
    #[arg(long, value_parser = parse_priority_arg, default_value = "Mid")]
    department_priority: Priority,
    #[arg(long)]
    private: bool,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    division: Option<String>,
}

#[derive(Args)]
struct AddProjectArgs {
    entry_id: String,
    title: String,
    #[arg(long, value_parser = parse_instant)]
    start: DateTime<Utc>,
    #[arg(long, value_parser = parse_instant)]
    deadline: DateTime<Utc>,
    #[arg(long, default_value = "")]
    pic: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, value_parser = parse_priority_arg, default_value = "Mid")]
    hmif_priority: Priority,
    #[arg(long, value_parser = parse_priority_arg, default_value = "Mid")]
    department_priority: Priority,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    division: Option<String>,
    #[arg(long, value_parser = parse_status_arg, default_value = "ongoing")]
    status: ProjectStatus,
    #[arg(long)]
    reason: Option<String>,
}

/// Add a user (admins only)
#[derive(Args)]
struct AddUserArgs {
    username: String,
    #[arg(long)]
    password: String,
    #[arg(long, value_parser = parse_role_arg, default_value = "head_department")]
    role: Role,
    /// Required for head_department users
    #[arg(long)]
    department: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(log_dir) = &config.log_dir {
        init_logging(config.log_level(), log_dir).context("failed to start logging")?;
    }

    match config.store_path.clone() {
        Some(path) => {
            let conn = open_db(&path)
                .with_context(|| format!("failed to open store `{}`", path.display()))?;
            run(SqliteTableStore::new(&conn), &config, cli)
        }
        None => run(UnconfiguredStore, &config, cli),
    }
}

fn run<S: TableStore>(store: S, config: &TrackerConfig, cli: Cli) -> Result<()> {
    let mut directory = UserDirectory::new(&store, LogSink);
    if let UserLoadOutcome::Unchanged { error } = directory.load() {
        eprintln!("warning: {error}; only built-in users are available");
    }
    let caller = match &cli.caller {
        Some(arg) => Some(arg.resolve(directory.users()).map_err(|err| anyhow!(err))?),
        None => None,
    };
    let caller = caller.as_ref();

    let mut repo =
        TimelineRepository::new(&store, LogSink).with_upcoming_window(config.upcoming_window());
    let outcome = repo.load_all();
    if let Some(err) = outcome.error() {
        eprintln!("warning: {err}; showing built-in sample entries");
    }

    let now = cli.now.unwrap_or_else(Utc::now);
    info!(
        "event=cli_command module=cli status=start signed_in={}",
        caller.is_some()
    );

    let lines = match cli.command {
        Command::Timeline => {
            render::timeline(&repo.timeline(caller), now, repo.upcoming_window())
        }
        Command::Projects { entry_id } => {
            render::buckets(&repo.project_buckets(caller, &entry_id, now)?)
        }
        Command::On { date } => {
            let entries = repo.entries_on(caller, date);
            if entries.is_empty() {
                vec![format!("no entries on {date}")]
            } else {
                entries.into_iter().map(render::entry_line).collect()
            }
        }
        Command::Month { month: (year, month) } => match repo.month_grid(caller, year, month) {
            Some(days) => render::month_grid(&days),
            None => bail!("month out of range: {year}-{month:02}"),
        },
        Command::AddEntry(args) => {
            let end = args.end.unwrap_or(args.start);
            let mut draft = EntryDraft::new(args.title, args.start, end);
            draft.person_in_charge = args.pic;
            draft.description = args.description;
            draft.hmif_priority = args.hmif_priority;
            draft.department_priority = args.department_priority;
            draft.visibility = if args.private {
                Visibility::Private
            } else {
                Visibility::Public
            };
            draft.department_id = args.department;
            draft.division_id = args.division;

            let outcome = repo.create_entry(caller, draft)?;
            render::write_outcome(
                &outcome,
                &format!("added {}", render::entry_line(&outcome.value)),
            )
        }
        Command::AddProject(args) => {
            let mut draft = ProjectDraft::new(args.title, args.start, args.deadline);
            draft.person_in_charge = args.pic;
            draft.description = args.description;
            draft.hmif_priority = args.hmif_priority;
            draft.department_priority = args.department_priority;
            draft.department_id = args.department;
            draft.division_id = args.division;
            draft.status = args.status;
            draft.on_hold_reason = args.reason;

            let outcome = repo.create_project(caller, &args.entry_id, draft)?;
            render::write_outcome(
                &outcome,
                &format!("added {}", render::project_line(&outcome.value)),
            )
        }
        Command::SetStatus {
            project_id,
            status,
            reason,
        } => {
            let mut patch = ProjectPatch::new().with(ProjectField::Status(status));
            if reason.is_some() {
                patch.set(ProjectField::OnHoldReason(reason));
            }
            let outcome = repo.update_project(caller, &project_id, &patch)?;
            render::write_outcome(
                &outcome,
                &format!("updated {}", render::project_line(&outcome.value)),
            )
        }
        Command::DeleteEntry { entry_id } => {
            let outcome = repo.delete_entry(caller, &entry_id)?;
            render::write_outcome(
                &outcome,
                &format!(
                    "deleted entry {} and {} project(s)",
                    outcome.value.id,
                    outcome.value.projects.len()
                ),
            )
        }
        Command::DeleteProject { project_id } => {
            let outcome = repo.delete_project(caller, &project_id)?;
            render::write_outcome(&outcome, &format!("deleted project {}", outcome.value.id))
        }
        Command::Departments => render::departments(departments()),
        Command::Users => {
            if !can_manage_users(caller) {
                bail!("only admins can list users");
            }
            directory.users().iter().map(render::user_line).collect()
        }
        Command::AddUser(args) => {
            let draft = UserDraft {
                username: args.username,
                secret: args.password,
                role: args.role,
                department_id: args.department,
            };
            let outcome = directory.add_user(caller, draft)?;
            render::write_outcome(
                &outcome,
                &format!("added {}", render::user_line(&outcome.value)),
            )
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}
