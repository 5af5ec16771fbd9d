mod init;
pub use init::cmd_init;

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::board::{Board, BoardError, BoardRoles};
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::FileLock;
use crate::io::project_io::{self, Project, ProjectError};
use crate::io::state::Theme;
use crate::io::storage::{atomic_write, DirStorage};
use crate::io::timer::{Periodic, Tick};
use crate::model::column::{ColumnPatch, Direction};
use crate::model::config::BoardConfig;
use crate::model::task::{NewTask, Priority, Tag, TaskPatch};
use crate::model::toast::Toast;
use crate::model::workspace::Workspace;
use crate::ops::column_ops::ColumnError;
use crate::ops::filter::{self, PriorityFilter, TagFilter, TaskFilter};
use crate::ops::task_ops::TaskError;
use crate::ops::transfer;
use crate::sync::{self, SyncOutcome, SystemGit, WatchEvent};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Global override for project directory (set by -C flag)
static PROJECT_DIR_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Flags shared by every command
struct Ctx {
    json: bool,
    workspace: Option<String>,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    if let Some(ref dir) = cli.project_dir {
        let abs = fs::canonicalize(dir).map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?;
        let _ = PROJECT_DIR_OVERRIDE.set(abs);
    }
    let ctx = Ctx {
        json: cli.json,
        workspace: cli.workspace,
    };

    match cli.command {
        Commands::Init(args) => cmd_init(args),

        // Read commands
        Commands::Board(args) => cmd_board(args, &ctx),
        Commands::Show(args) => cmd_show(args, &ctx),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Tags => cmd_tags(&ctx),
        Commands::Remind(args) => cmd_remind(args, &ctx),

        // Write commands
        Commands::Add(args) => cmd_add(args, &ctx),
        Commands::Edit(args) => cmd_edit(args, &ctx),
        Commands::Rm(args) => cmd_rm(args, &ctx),
        Commands::Mv(args) => cmd_mv(args, &ctx),
        Commands::Tag(args) => cmd_tag(args, &ctx),
        Commands::Sub(args) => cmd_sub(args, &ctx),

        // Structure
        Commands::Col(args) => cmd_col(args, &ctx),
        Commands::Workspace(args) => cmd_workspace(args, &ctx),
        Commands::Theme(args) => cmd_theme(args, &ctx),

        // Transfer and sync
        Commands::Export(args) => cmd_export(args, &ctx),
        Commands::Import(args) => cmd_import(args, &ctx),
        Commands::Snapshot => cmd_snapshot(&ctx),
        Commands::Sync(args) => cmd_sync(args),
        Commands::Watch => cmd_watch(),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_project_cwd() -> Result<Project, ProjectError> {
    let start = match PROJECT_DIR_OVERRIDE.get() {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().map_err(ProjectError::IoError)?,
    };
    let root = project_io::discover_project(&start)?;
    project_io::load_project(&root)
}

fn board_roles(config: &BoardConfig) -> BoardRoles {
    BoardRoles {
        terminal_column: config.board.terminal_column.clone(),
        in_progress_column: config.board.in_progress_column.clone(),
    }
}

/// Open the workspace named by -w, or the active one
fn open_board(project: &Project, ctx: &Ctx) -> Result<Board<DirStorage>, BoardError> {
    let active = match ctx.workspace.as_deref() {
        Some(ws) if project.config.find_workspace(ws).is_none() => {
            return Err(BoardError::UnknownWorkspace(ws.to_string()));
        }
        Some(ws) => ws.to_string(),
        None => project.active_workspace(),
    };
    Ok(Board::open(
        project.board_store(),
        project.config.workspaces.clone(),
        &active,
        board_roles(&project.config),
    ))
}

/// Show queued notifications on stderr (suppressed in JSON mode)
fn print_toasts(board: &mut Board<DirStorage>, json: bool) {
    for toast in board.toasts_mut().drain() {
        if !json {
            eprintln!("{}", format_toast(&toast));
        }
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::parse(s).ok_or_else(|| format!("invalid priority '{}': use low, medium, or high", s))
}

fn parse_due(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| format!("invalid date '{}': use YYYY-MM-DD", s))
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_board(args: BoardArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let board = open_board(&project, ctx)?;
    let priority = match args.priority.as_deref() {
        Some(p) => PriorityFilter::parse(p)
            .ok_or_else(|| format!("invalid priority '{}': use low, medium, high, or all", p))?,
        None => PriorityFilter::All,
    };
    let filter = TaskFilter {
        search_query: args.search.unwrap_or_default(),
        priority,
        tag: TagFilter::from_option(args.tag),
    };
    let tasks = board.filtered(&filter);
    let today = today();

    if ctx.json {
        let output = board_to_json(board.state(), &tasks, today);
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(ws) = project.config.find_workspace(board.active_workspace()) {
            println!("{} {}", ws.icon, ws.name);
            println!();
        }
        print_lines(&format_board(board.state(), &tasks, today));
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;
    let task = board
        .state()
        .find_task(&id)
        .ok_or_else(|| TaskError::NotFound(id.clone()))?;
    let today = today();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&task_to_json(task, today))?);
    } else {
        let column_title = board
            .state()
            .find_column(&task.column_id)
            .map(|c| c.title.as_str())
            .unwrap_or(&task.column_id);
        print_lines(&format_task_detail(task, column_title, today));
    }
    Ok(())
}

fn cmd_stats(ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let board = open_board(&project, ctx)?;
    let stats = board.stats(today());
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_lines(&format_stats(&stats, &board.state().columns));
    }
    Ok(())
}

fn cmd_tags(ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let board = open_board(&project, ctx)?;
    let tags = filter::all_tags(&board.state().tasks);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
    } else {
        for tag in tags {
            println!("#{}", tag);
        }
    }
    Ok(())
}

fn print_reminders(toasts: &[Toast], json: bool) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string(toasts)?);
    } else {
        for toast in toasts {
            println!("{}", format_toast(toast));
        }
    }
    Ok(())
}

fn cmd_remind(args: RemindArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let mut board = open_board(&project, ctx)?;
    let window = args.hours.unwrap_or(project.config.reminders.window_hours);
    let json = ctx.json;

    if !args.watch {
        let toasts = board.check_reminders(window, &Local::now());
        if toasts.is_empty() && !json {
            println!("No tasks due in the next {} hours", window);
            return Ok(());
        }
        print_reminders(&toasts, json)?;
        return Ok(());
    }

    let interval = Duration::from_secs(project.config.reminders.interval_secs.max(1));
    tracing::info!(?interval, window, "reminder loop started");
    let timer = Periodic::start("reminders", interval, move || {
        board.reload();
        let toasts = board.check_reminders(window, &Local::now());
        if let Err(e) = print_reminders(&toasts, json) {
            tracing::warn!(error = %e, "could not print reminders");
        }
        Tick::Continue
    })?;
    timer.wait();
    Ok(())
}

// ---------------------------------------------------------------------------
// Task commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;

    let column = match args.column.as_deref() {
        Some(c) => board.resolve_column(c)?,
        None => board
            .state()
            .columns
            .first()
            .map(|c| c.id.clone())
            .ok_or("board has no columns")?,
    };
    let fields = NewTask {
        title: args.title,
        description: args.desc.unwrap_or_default(),
        priority: args.priority.as_deref().map(parse_priority).transpose()?.unwrap_or_default(),
        due_date: args.due.as_deref().map(parse_due).transpose()?,
        tags: args
            .tags
            .iter()
            .enumerate()
            .map(|(i, t)| Tag::for_position(t.trim(), i))
            .collect(),
        subtasks: Vec::new(),
    };
    let id = board.add_task(&column, fields)?;
    print_toasts(&mut board, ctx.json);
    if ctx.json {
        println!("{}", serde_json::json!({ "id": id, "columnId": column }));
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;

    let due_date = if args.no_due {
        Some(None)
    } else {
        args.due.as_deref().map(parse_due).transpose()?.map(Some)
    };
    let patch = TaskPatch {
        title: args.title,
        description: args.desc,
        priority: args.priority.as_deref().map(parse_priority).transpose()?,
        due_date,
        ..Default::default()
    };
    if patch.is_empty() {
        return Err("nothing to change: pass --title, --desc, --priority, --due, or --no-due".into());
    }
    board.update_task(&id, patch)?;
    print_toasts(&mut board, ctx.json);
    Ok(())
}

fn cmd_rm(args: RmArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;
    let removed = board.delete_task(&id)?;
    print_toasts(&mut board, ctx.json);
    println!("{}", removed.id);
    Ok(())
}

fn cmd_mv(args: MvArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;

    let moved = if let Ok(column) = board.resolve_column(&args.target) {
        board.move_task(&id, &column)?
    } else if let Ok(over) = board.resolve_task(&args.target) {
        board.drop_task(&id, &over)?
    } else {
        return Err(ColumnError::NotFound(args.target).into());
    };

    let column = board
        .state()
        .find_task(&id)
        .map(|t| t.column_id.clone())
        .unwrap_or_default();
    if !moved && !ctx.json {
        eprintln!("already in {}", column);
    }
    if ctx.json {
        println!("{}", serde_json::json!({ "id": id, "columnId": column, "moved": moved }));
    } else {
        println!("{}", column);
    }
    Ok(())
}

fn cmd_tag(args: TagArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;

    match args.action.as_str() {
        "add" => {
            let tag = board.add_tag(&id, &args.tag)?;
            if ctx.json {
                println!("{}", serde_json::to_string(&tag)?);
            } else {
                println!("#{} ({})", tag.text, tag.color);
            }
        }
        "rm" | "remove" => {
            let removed = board.remove_tag(&id, &args.tag)?;
            if removed == 0 && !ctx.json {
                eprintln!("no tag #{} on {}", args.tag, short_id(&id));
            }
        }
        other => return Err(format!("unknown tag action '{}': use add or rm", other).into()),
    }
    Ok(())
}

fn cmd_sub(args: SubCmd, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let id = board.resolve_task(&args.id)?;

    match args.action {
        SubAction::Add { text } => {
            let sub_id = board.add_subtask(&id, &text)?;
            println!("{}", sub_id);
        }
        SubAction::Toggle { sub } => {
            let sub_id = board.resolve_subtask(&id, &sub)?;
            let done = board.toggle_subtask(&id, &sub_id)?;
            if ctx.json {
                println!("{}", serde_json::json!({ "id": sub_id, "completed": done }));
            } else {
                println!("{}", if done { "done" } else { "open" });
            }
        }
        SubAction::Rm { sub } => {
            let sub_id = board.resolve_subtask(&id, &sub)?;
            board.delete_subtask(&id, &sub_id)?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

fn cmd_col(args: ColCmd, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    if let ColAction::List = args.action {
        let board = open_board(&project, ctx)?;
        let state = board.state();
        let count = |id: &str| state.tasks.iter().filter(|t| t.column_id == id).count();
        if ctx.json {
            let output: Vec<ColumnSummaryJson> = state
                .columns
                .iter()
                .map(|c| ColumnSummaryJson {
                    column: c,
                    task_count: count(&c.id),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for c in &state.columns {
                println!("{}", format_column_line(c, count(&c.id)));
            }
        }
        return Ok(());
    }

    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    match args.action {
        ColAction::List => {}
        ColAction::Add(a) => {
            let id = board.add_column(&a.title, a.color.as_deref())?;
            println!("{}", id);
        }
        ColAction::Edit(a) => {
            let id = board.resolve_column(&a.id)?;
            if a.title.is_none() && a.color.is_none() {
                return Err("nothing to change: pass --title or --color".into());
            }
            board.update_column(
                &id,
                ColumnPatch {
                    title: a.title,
                    color: a.color,
                },
            )?;
        }
        ColAction::Rm(a) => {
            let id = board.resolve_column(&a.id)?;
            let moved = board.delete_column(&id)?;
            print_toasts(&mut board, ctx.json);
            if ctx.json {
                println!("{}", serde_json::json!({ "deleted": id, "tasksMoved": moved }));
            } else {
                println!("deleted {} ({} tasks moved)", id, moved);
            }
        }
        ColAction::Mv(a) => {
            let id = board.resolve_column(&a.id)?;
            let direction = Direction::parse(&a.direction)
                .ok_or_else(|| format!("invalid direction '{}': use left or right", a.direction))?;
            if !board.move_column(&id, direction)? && !ctx.json {
                eprintln!("{} is already at the edge", id);
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Workspaces and UI state
// ---------------------------------------------------------------------------

fn cmd_workspace(args: WorkspaceCmd, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    match args.action.unwrap_or(WorkspaceAction::List) {
        WorkspaceAction::List => {
            let active = project.active_workspace();
            if ctx.json {
                let output: Vec<WorkspaceJson> = project
                    .config
                    .workspaces
                    .iter()
                    .map(|w| WorkspaceJson {
                        workspace: w,
                        active: w.id == active,
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                for w in &project.config.workspaces {
                    println!("{}", format_workspace_line(w, w.id == active));
                }
            }
        }
        WorkspaceAction::Switch(a) => {
            let _lock = FileLock::acquire_default(&project.kanban_dir)?;
            let mut board = open_board(&project, ctx)?;
            board.switch_workspace(&a.id)?;
            if !board.store().exists(&a.id) {
                board.flush()?;
            }
            let mut state = project.ui_state();
            state.active_workspace = Some(a.id.clone());
            project.save_ui_state(&state)?;
            println!("{}", a.id);
        }
        WorkspaceAction::Add(a) => {
            init::validate_workspace_id(&a.id)?;
            let _lock = FileLock::acquire_default(&project.kanban_dir)?;
            let mut board = open_board(&project, ctx)?;
            let workspace = Workspace::new(&a.id, &a.name, &a.icon);
            board.add_workspace(workspace.clone())?;

            let (_config, mut doc) = config_io::read_config(&project.kanban_dir)?;
            config_io::add_workspace_to_config(&mut doc, &workspace);
            config_io::write_config(&project.kanban_dir, &doc)?;

            board.switch_workspace(&a.id)?;
            board.flush()?;
            println!("{}", a.id);
        }
        WorkspaceAction::Rename(a) => {
            let _lock = FileLock::acquire_default(&project.kanban_dir)?;
            let (_config, mut doc) = config_io::read_config(&project.kanban_dir)?;
            if !config_io::rename_workspace_in_config(&mut doc, &a.id, &a.name) {
                return Err(BoardError::UnknownWorkspace(a.id).into());
            }
            config_io::write_config(&project.kanban_dir, &doc)?;
        }
    }
    Ok(())
}

fn cmd_theme(args: ThemeArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let mut state = project.ui_state();
    if let Some(choice) = args.theme.as_deref() {
        state.theme = match choice {
            "toggle" => state.theme.toggled(),
            "dark" => Theme::Dark,
            "light" => Theme::Light,
            other => return Err(format!("unknown theme '{}': use dark, light, or toggle", other).into()),
        };
        project.save_ui_state(&state)?;
    }
    if ctx.json {
        println!("{}", serde_json::json!({ "theme": state.theme }));
    } else {
        let name = match state.theme {
            Theme::Dark => "dark",
            Theme::Light => "light",
        };
        println!("{}", name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transfer and sync
// ---------------------------------------------------------------------------

fn cmd_export(args: ExportArgs, ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let mut board = open_board(&project, ctx)?;
    let text = board.export()?;

    match args.path.as_deref() {
        Some("-") => {
            board.toasts_mut().drain();
            println!("{}", text);
        }
        path => {
            let path = match path {
                Some(p) => PathBuf::from(p),
                None => PathBuf::from(board.export_filename(today())),
            };
            atomic_write(&path, text.as_bytes())?;
            print_toasts(&mut board, ctx.json);
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn cmd_import(args: ImportArgs, ctx: &Ctx) -> CmdResult {
    let text = fs::read_to_string(&args.path).map_err(|e| format!("could not read {}: {}", args.path, e))?;
    let project = load_project_cwd()?;
    let _lock = FileLock::acquire_default(&project.kanban_dir)?;
    let mut board = open_board(&project, ctx)?;
    let result = board.import(&text);
    print_toasts(&mut board, ctx.json);
    result?;
    Ok(())
}

fn cmd_snapshot(ctx: &Ctx) -> CmdResult {
    let project = load_project_cwd()?;
    let board = open_board(&project, ctx)?;
    let text = transfer::export_json(board.state())?;
    let path = project.data_file();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    atomic_write(&path, text.as_bytes())?;
    tracing::info!(path = %path.display(), "snapshot written");
    println!("{}", path.display());
    Ok(())
}

fn cmd_sync(args: SyncArgs) -> CmdResult {
    let project = load_project_cwd()?;
    let message = args
        .message
        .unwrap_or_else(|| project.config.sync.default_message.clone());
    let git = SystemGit::new(&project.root);
    match sync::sync_once(&git, &message) {
        Ok(SyncOutcome::Pushed) => println!("Synced: {}", message),
        Ok(SyncOutcome::NothingToCommit) => println!("No changes to commit."),
        Err(e) => {
            tracing::warn!(error = %e, "sync failed");
            eprintln!("Error syncing: {}", e);
        }
    }
    Ok(())
}

fn cmd_watch() -> CmdResult {
    let project = load_project_cwd()?;
    let git = SystemGit::new(&project.root);
    let path = project.data_file();
    let interval = Duration::from_secs(project.config.sync.poll_secs.max(1));

    println!("Watching {} (Ctrl+C to stop)", path.display());
    sync::watch_and_sync(&git, &path, interval, |event| {
        let time = Local::now().format("%H:%M:%S");
        match event {
            WatchEvent::Waiting => println!("Waiting for {} to be created...", path.display()),
            WatchEvent::ChangeDetected => println!("Change detected at {}", time),
            WatchEvent::Synced(SyncOutcome::Pushed) => println!("Synced at {}", time),
            WatchEvent::Synced(SyncOutcome::NothingToCommit) => println!("No actual changes detected."),
            WatchEvent::Failed(e) => eprintln!("Sync error: {}", e),
        }
        Tick::Continue
    })?;
    Ok(())
}
