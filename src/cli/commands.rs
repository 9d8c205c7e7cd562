use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "todo",
    about = concat!("todo v", env!("CARGO_PKG_VERSION"), " - a todo.txt manager"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output listings as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Todo directory (default: $TODO_DIR, then ~/.todo)
    #[arg(short = 'd', long = "dir", global = true)]
    pub dir: Option<String>,

    /// Config file (default: <todo dir>/config.toml)
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    #[command(flatten)]
    pub toggles: DisplayToggles,
}

/// Flags that flip the configured display options for one run
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct DisplayToggles {
    /// Toggle plain mode (no colors)
    #[arg(short = 'p', long = "plain-mode", global = true)]
    pub plain: bool,
    /// Toggle hiding of priority markers
    #[arg(short = 'P', long = "no-priority", global = true)]
    pub hide_priority: bool,
    /// Toggle stamping new tasks with today's date
    #[arg(short = 't', long = "prepend-date", global = true)]
    pub prepend_date: bool,
    /// Toggle reverse-video colors
    #[arg(short = 'i', long = "invert-colors", global = true)]
    pub invert: bool,
    /// Toggle alphabetical order inside each group
    #[arg(short = 'l', long = "legacy", global = true)]
    pub legacy_sort: bool,
    /// Toggle hiding of +project tags
    #[arg(short = '+', long = "hide-projects", global = true)]
    pub hide_projects: bool,
    /// Toggle hiding of @context tags
    #[arg(short = '@', long = "hide-contexts", global = true)]
    pub hide_contexts: bool,
    /// Toggle hiding of #{date} tags
    #[arg(short = '#', long = "hide-dates", global = true)]
    pub hide_dates: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the todo directory, empty task files and a config file
    Init(InitArgs),
    /// Add a task as the last line
    #[command(visible_alias = "a")]
    Add(TextArgs),
    /// Add several tasks, one per line of text
    Addm(TextArgs),
    /// Add text to the end of a task
    #[command(visible_alias = "app")]
    Append(EditArgs),
    /// Add text to the start of a task, after its priority
    #[command(visible_alias = "pre")]
    Prepend(EditArgs),
    /// Mark a task done and move it to the done file
    Do(LineArgs),
    /// Delete a task
    #[command(visible_alias = "rm")]
    Del(LineArgs),
    /// Set a task's priority
    #[command(visible_alias = "p")]
    Pri(PriArgs),
    /// Remove a task's priority
    #[command(visible_alias = "dp")]
    Depri(LineArgs),
    /// List tasks by priority, keeping those matching every term
    #[command(visible_alias = "ls")]
    List(ListArgs),
    /// List tasks grouped by due date
    #[command(visible_alias = "lsd")]
    Listdate,
    /// List tasks grouped by project
    #[command(visible_alias = "lsp")]
    Listproj,
    /// List tasks grouped by context
    #[command(visible_alias = "lsc")]
    Listcon,
    /// Push the todo repository to its remote
    Push,
    /// Pull the todo repository from its remote
    Pull,
    /// Show the todo repository's status
    Status,
    /// Show the last two commits
    Log,
}

#[derive(Args)]
pub struct InitArgs {
    /// Also create a git repository and commit after every change
    #[arg(long)]
    pub git: bool,
}

#[derive(Args)]
pub struct TextArgs {
    /// Task text
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct LineArgs {
    /// Line number
    pub line: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Line number
    pub line: String,
    /// Text to add
    #[arg(num_args = 0.., allow_hyphen_values = true)]
    pub text: Vec<String>,
}

#[derive(Args)]
pub struct PriArgs {
    /// Line number
    pub line: String,
    /// Priority letter, A-X
    pub priority: Option<String>,
}

#[derive(Args, Default)]
pub struct ListArgs {
    /// Only show tasks matching every term
    pub terms: Vec<String>,
}
