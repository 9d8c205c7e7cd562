mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use chrono::NaiveDate;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::WriteLock;
use crate::io::sync::{Git, VersionControl};
use crate::model::config::{Config, DisplayConfig};
use crate::model::task::Task;
use crate::ops::task_ops::{self, Outcome, TaskError, TodoFiles, command};
use crate::ops::view::{self, Basis, View};
use crate::ops::search;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Everything a command needs, resolved once from flags, environment and
/// config file.
pub struct Context {
    pub config: Config,
    /// The configured display options with command-line toggles applied
    pub display: DisplayConfig,
    pub files: TodoFiles,
    pub json: bool,
    /// Set when `[sync] enabled`; every change is committed through it
    pub vcs: Option<Box<dyn VersionControl>>,
}

impl Context {
    pub fn load(cli: &Cli) -> Result<Self, config_io::ConfigError> {
        let dir = config_io::resolve_todo_dir(cli.dir.as_deref());
        let config_path = config_io::resolve_config_path(&dir, cli.config.as_deref());
        let config = config_io::load_config(&config_path)?;
        tracing::debug!(dir = %dir.display(), config = %config_path.display(), "resolved todo directory");

        let display = apply_toggles(config.display, &cli.toggles);
        let files = TodoFiles::new(&dir, &config);
        let vcs: Option<Box<dyn VersionControl>> = if config.sync.enabled {
            Some(Box::new(Git::new(&dir)))
        } else {
            None
        };
        Ok(Context {
            config,
            display,
            files,
            json: cli.json,
            vcs,
        })
    }
}

/// Flip each configured display option whose flag was given.
pub fn apply_toggles(mut display: DisplayConfig, toggles: &DisplayToggles) -> DisplayConfig {
    display.plain ^= toggles.plain;
    display.hide_priority ^= toggles.hide_priority;
    display.prepend_date ^= toggles.prepend_date;
    display.invert ^= toggles.invert;
    display.legacy_sort ^= toggles.legacy_sort;
    display.hide_projects ^= toggles.hide_projects;
    display.hide_contexts ^= toggles.hide_contexts;
    display.hide_dates ^= toggles.hide_dates;
    display
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    if let Some(Commands::Init(ref args)) = cli.command {
        let dir = config_io::resolve_todo_dir(cli.dir.as_deref());
        let config_path = config_io::resolve_config_path(&dir, cli.config.as_deref());
        return cmd_init(args, &dir, &config_path);
    }

    if let Some(ref cmd) = cli.command {
        check_arguments(cmd)?;
    }
    let ctx = Context::load(&cli)?;
    let today = chrono::Local::now().date_naive();

    match cli.command {
        // No subcommand lists everything
        None => cmd_list(&ctx, ListArgs::default()),
        Some(cmd) => match cmd {
            Commands::Init(_) => Ok(()),

            // Views
            Commands::List(args) => cmd_list(&ctx, args),
            Commands::Listdate => cmd_view(&ctx, Basis::Date),
            Commands::Listproj => cmd_view(&ctx, Basis::Project),
            Commands::Listcon => cmd_view(&ctx, Basis::Context),

            // Changes
            Commands::Add(args) => cmd_add(&ctx, args, today),
            Commands::Addm(args) => cmd_addm(&ctx, args, today),
            Commands::Append(args) => {
                mutate(&ctx, |f| task_ops::append(f, &args.line, &args.text.join(" ")))
            }
            Commands::Prepend(args) => {
                mutate(&ctx, |f| task_ops::prepend(f, &args.line, &args.text.join(" ")))
            }
            Commands::Do(args) => mutate(&ctx, |f| task_ops::complete(f, &args.line, today)),
            Commands::Del(args) => mutate(&ctx, |f| task_ops::delete(f, &args.line)),
            Commands::Pri(args) => mutate(&ctx, |f| {
                task_ops::prioritize(f, &args.line, args.priority.as_deref())
            }),
            Commands::Depri(args) => mutate(&ctx, |f| task_ops::deprioritize(f, &args.line)),

            // Repository
            Commands::Push => cmd_git(&ctx, |git| git.push()),
            Commands::Pull => cmd_git(&ctx, |git| git.pull()),
            Commands::Status => cmd_git(&ctx, |git| git.status()),
            Commands::Log => cmd_log(&ctx),
        },
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reject malformed line numbers and priorities before anything touches the
/// todo directory. Range and text checks need the store and happen later.
fn check_arguments(cmd: &Commands) -> Result<(), TaskError> {
    match cmd {
        Commands::Append(args) => task_ops::parse_line(command::APPEND, &args.line).map(drop),
        Commands::Prepend(args) => task_ops::parse_line(command::PREPEND, &args.line).map(drop),
        Commands::Do(args) => task_ops::parse_line(command::DO, &args.line).map(drop),
        Commands::Del(args) => task_ops::parse_line(command::DEL, &args.line).map(drop),
        Commands::Depri(args) => task_ops::parse_line(command::DEPRI, &args.line).map(drop),
        Commands::Pri(args) => {
            task_ops::parse_line(command::PRI, &args.line)?;
            task_ops::parse_priority(command::PRI, args.priority.as_deref()).map(drop)
        }
        _ => Ok(()),
    }
}

fn require_dir(ctx: &Context) -> CmdResult {
    if !ctx.files.dir.is_dir() {
        return Err(format!(
            "todo directory {} does not exist (run `todo init`)",
            ctx.files.dir.display()
        )
        .into());
    }
    Ok(())
}

fn load_tasks(ctx: &Context) -> Result<Vec<Task>, task_ops::TaskError> {
    let lines = ctx.files.todo.load_or_empty()?;
    Ok(lines.iter().map(|l| Task::parse(l)).collect())
}

/// Commit the files a change touched. A failed commit is a warning; the
/// change itself already happened.
pub fn sync_outcome(
    vcs: Option<&dyn VersionControl>,
    files: &TodoFiles,
    outcome: &Outcome,
) -> Option<String> {
    let vcs = vcs?;
    let request = outcome.sync_request(files);
    match vcs.commit(&request.files, &request.message) {
        Ok(true) => Some(format_archived(&request.files)),
        Ok(false) => None,
        Err(e) => {
            tracing::warn!(error = %e, "could not commit change");
            None
        }
    }
}

fn report(ctx: &Context, outcome: &Outcome) {
    for line in format_outcome(outcome) {
        println!("{}", line);
    }
    if let Some(line) = sync_outcome(ctx.vcs.as_deref(), &ctx.files, outcome) {
        println!("{}", line);
    }
}

/// Run one change under the directory lock and report it.
fn mutate(
    ctx: &Context,
    op: impl FnOnce(&TodoFiles) -> Result<Outcome, task_ops::TaskError>,
) -> CmdResult {
    require_dir(ctx)?;
    let _lock = WriteLock::acquire_default(&ctx.files.dir)?;
    let outcome = op(&ctx.files)?;
    report(ctx, &outcome);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn print_view(ctx: &Context, view: &View) -> CmdResult {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&view_to_json(view))?);
        return Ok(());
    }
    for line in view::render_view(view, &ctx.display, &ctx.config.colors) {
        println!("{}", line);
    }
    for line in view::footer(view) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_list(ctx: &Context, args: ListArgs) -> CmdResult {
    let tasks = load_tasks(ctx)?;
    let view = if args.terms.is_empty() {
        view::build_view(&tasks, Basis::Priority, &ctx.display)
    } else {
        search::filter_view(&tasks, &args.terms, &ctx.display)?
    };
    print_view(ctx, &view)
}

fn cmd_view(ctx: &Context, basis: Basis) -> CmdResult {
    let tasks = load_tasks(ctx)?;
    let view = view::build_view(&tasks, basis, &ctx.display);
    print_view(ctx, &view)
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: TextArgs, today: NaiveDate) -> CmdResult {
    let text = args.text.join(" ");
    mutate(ctx, |f| task_ops::add(f, &text, &ctx.display, today))
}

fn cmd_addm(ctx: &Context, args: TextArgs, today: NaiveDate) -> CmdResult {
    require_dir(ctx)?;
    let _lock = WriteLock::acquire_default(&ctx.files.dir)?;
    let text = args.text.join(" ");
    for outcome in task_ops::add_multi(&ctx.files, &text, &ctx.display, today)? {
        report(ctx, &outcome);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Repository commands
// ---------------------------------------------------------------------------

fn cmd_git(
    ctx: &Context,
    run: impl FnOnce(&Git) -> Result<String, crate::io::sync::SyncError>,
) -> CmdResult {
    require_dir(ctx)?;
    let output = run(&Git::new(&ctx.files.dir))?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

fn cmd_log(ctx: &Context) -> CmdResult {
    require_dir(ctx)?;
    let log = Git::new(&ctx.files.dir).log(2)?;
    for line in format_log(&log, ctx.display.plain) {
        println!("{}", line);
    }
    Ok(())
}

/// Paths `init --git` commits first.
fn initial_files(dir: &std::path::Path, config: &Config, config_path: PathBuf) -> Vec<PathBuf> {
    let files = TodoFiles::new(dir, config);
    vec![
        files.todo.path().to_path_buf(),
        files.done.path().to_path_buf(),
        config_path,
    ]
}
