use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kb", about = concat!("kb v", env!("CARGO_PKG_VERSION"), " - a kanban board in your repo"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,

    /// Operate on this workspace instead of the active one
    #[arg(short = 'w', long = "workspace", global = true)]
    pub workspace: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// Show the board, column by column
    Board(BoardArgs),
    /// Show task details
    Show(ShowArgs),
    /// Add a task
    Add(AddArgs),
    /// Edit a task's fields
    Edit(EditArgs),
    /// Delete a task
    Rm(RmArgs),
    /// Move a task to a column (or onto another task's column)
    Mv(MvArgs),
    /// Add or remove tags
    Tag(TagArgs),
    /// Manage a task's checklist
    Sub(SubCmd),
    /// Column management
    Col(ColCmd),
    /// Workspace management
    Workspace(WorkspaceCmd),
    /// Show board statistics
    Stats,
    /// List every tag in use
    Tags,
    /// Check for tasks due soon
    Remind(RemindArgs),
    /// Export the board to a JSON file
    Export(ExportArgs),
    /// Replace the board with a JSON export
    Import(ImportArgs),
    /// Write the board snapshot used by git sync
    Snapshot,
    /// Commit and push the project
    Sync(SyncArgs),
    /// Watch the snapshot file and sync every change
    Watch,
    /// Show or change the color theme
    Theme(ThemeArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Create an extra workspace: --add-workspace <id> "name" (repeatable)
    #[arg(long = "add-workspace", num_args = 2, value_names = ["ID", "NAME"], action = clap::ArgAction::Append)]
    pub workspaces: Vec<String>,
    /// Start with empty columns instead of the sample tasks
    #[arg(long)]
    pub empty: bool,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct BoardArgs {
    /// Match title, description, or tag text (case-insensitive)
    #[arg(long, short = 's')]
    pub search: Option<String>,
    /// Filter by priority (low, medium, high, all)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// Filter by tag
    #[arg(long, short = 't')]
    pub tag: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Task ID (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct RemindArgs {
    /// Keep checking on the configured interval until interrupted
    #[arg(long)]
    pub watch: bool,
    /// Reminder window in hours (default from kanban.toml)
    #[arg(long)]
    pub hours: Option<i64>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    pub title: String,
    /// Column (id, title, or id prefix; default: first column)
    #[arg(long, short = 'c')]
    pub column: Option<String>,
    /// Description
    #[arg(long, short = 'd')]
    pub desc: Option<String>,
    /// Priority (low, medium, high)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,
    /// Tag (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long, short = 'd')]
    pub desc: Option<String>,
    /// Priority (low, medium, high)
    #[arg(long, short = 'p')]
    pub priority: Option<String>,
    /// Due date (YYYY-MM-DD)
    #[arg(long, conflicts_with = "no_due")]
    pub due: Option<String>,
    /// Clear the due date
    #[arg(long)]
    pub no_due: bool,
}

#[derive(Args)]
pub struct RmArgs {
    /// Task ID (or unique prefix)
    pub id: String,
}

#[derive(Args)]
pub struct MvArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// Target column, or a task whose column to drop into
    pub target: String,
}

#[derive(Args)]
pub struct TagArgs {
    /// Task ID (or unique prefix)
    pub id: String,
    /// add or rm
    pub action: String,
    /// Tag text
    pub tag: String,
}

#[derive(Args)]
pub struct SubCmd {
    /// Task ID (or unique prefix)
    pub id: String,
    #[command(subcommand)]
    pub action: SubAction,
}

#[derive(Subcommand)]
pub enum SubAction {
    /// Add a checklist item
    Add { text: String },
    /// Toggle an item (id, id prefix, or 1-based position)
    Toggle { sub: String },
    /// Delete an item (id, id prefix, or 1-based position)
    Rm { sub: String },
}

// ---------------------------------------------------------------------------
// Column args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ColCmd {
    #[command(subcommand)]
    pub action: ColAction,
}

#[derive(Subcommand)]
pub enum ColAction {
    /// List columns
    List,
    /// Add a column at the right edge
    Add(ColAddArgs),
    /// Change a column's title or color
    Edit(ColEditArgs),
    /// Delete a column; its tasks move to the first column
    Rm(ColIdArg),
    /// Move a column one step left or right
    Mv(ColMvArgs),
}

#[derive(Args)]
pub struct ColAddArgs {
    pub title: String,
    /// Hex color (default: next palette color)
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ColEditArgs {
    /// Column (id, title, or id prefix)
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ColIdArg {
    /// Column (id, title, or id prefix)
    pub id: String,
}

#[derive(Args)]
pub struct ColMvArgs {
    /// Column (id, title, or id prefix)
    pub id: String,
    /// left or right
    pub direction: String,
}

// ---------------------------------------------------------------------------
// Workspace args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct WorkspaceCmd {
    #[command(subcommand)]
    pub action: Option<WorkspaceAction>,
}

#[derive(Subcommand)]
pub enum WorkspaceAction {
    /// List workspaces (default)
    List,
    /// Make a workspace the active one
    Switch(WorkspaceIdArg),
    /// Add a workspace to kanban.toml
    Add(WorkspaceAddArgs),
    /// Rename a workspace
    Rename(WorkspaceRenameArgs),
}

#[derive(Args)]
pub struct WorkspaceIdArg {
    pub id: String,
}

#[derive(Args)]
pub struct WorkspaceAddArgs {
    pub id: String,
    pub name: String,
    #[arg(long, default_value = "📋")]
    pub icon: String,
}

#[derive(Args)]
pub struct WorkspaceRenameArgs {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Transfer and sync args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (default: kanban-<workspace>-<date>.json; "-" for stdout)
    pub path: Option<String>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file with "columns" and "tasks"
    pub path: String,
}

#[derive(Args)]
pub struct SyncArgs {
    /// Commit message (default from kanban.toml)
    pub message: Option<String>,
}

#[derive(Args)]
pub struct ThemeArgs {
    /// dark, light, or toggle (omit to show the current theme)
    pub theme: Option<String>,
}
