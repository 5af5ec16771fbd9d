//! The board controller: owns the active workspace's state, the toast queue,
//! and the persistence handle. Every mutation writes through to storage.

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::io::persist::BoardStore;
use crate::io::storage::{Storage, StoreError};
use crate::model::column::{ColumnPatch, Direction};
use crate::model::task::{NewTask, Tag, Task, TaskPatch};
use crate::model::toast::{Toast, Toasts};
use crate::model::workspace::{BoardState, Workspace};
use crate::ops::column_ops::{self, ColumnError};
use crate::ops::filter::{self, TaskFilter};
use crate::ops::reminder;
use crate::ops::stats::{self, BoardStats, ColumnRoles};
use crate::ops::task_ops::{self, TaskError};
use crate::ops::transfer::{self, BoardExport, ImportError};

/// Error type for board-level operations
#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Column(#[from] ColumnError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error("unknown workspace: {0}")]
    UnknownWorkspace(String),
    #[error("workspace already exists: {0}")]
    DuplicateWorkspace(String),
}

/// Column ids with special meaning on every board
#[derive(Debug, Clone)]
pub struct BoardRoles {
    pub terminal_column: String,
    pub in_progress_column: String,
}

impl Default for BoardRoles {
    fn default() -> Self {
        BoardRoles {
            terminal_column: "done".to_string(),
            in_progress_column: "in-progress".to_string(),
        }
    }
}

pub struct Board<S: Storage> {
    store: BoardStore<S>,
    state: BoardState,
    workspaces: Vec<Workspace>,
    toasts: Toasts,
    roles: BoardRoles,
}

impl<S: Storage> Board<S> {
    /// Open `active` (falling back to the first workspace if it is unknown)
    pub fn open(store: BoardStore<S>, workspaces: Vec<Workspace>, active: &str, roles: BoardRoles) -> Self {
        let active = if workspaces.iter().any(|w| w.id == active) {
            active.to_string()
        } else {
            workspaces
                .first()
                .map(|w| w.id.clone())
                .unwrap_or_else(|| active.to_string())
        };
        let state = store.load(&active);
        Board {
            store,
            state,
            workspaces,
            toasts: Toasts::new(),
            roles,
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn workspaces(&self) -> &[Workspace] {
        &self.workspaces
    }

    pub fn active_workspace(&self) -> &str {
        &self.state.active_workspace
    }

    pub fn roles(&self) -> &BoardRoles {
        &self.roles
    }

    pub fn store(&self) -> &BoardStore<S> {
        &self.store
    }

    pub fn toasts(&self) -> &Toasts {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut Toasts {
        &mut self.toasts
    }

    fn persist(&mut self) -> Result<(), BoardError> {
        self.store.save(&self.state)?;
        Ok(())
    }

    /// Write the current board even if nothing changed (first-run seeding)
    pub fn flush(&mut self) -> Result<(), BoardError> {
        self.persist()
    }

    /// Discard in-memory state and reload the active workspace from storage
    pub fn reload(&mut self) {
        let active = self.state.active_workspace.clone();
        self.state = self.store.load(&active);
    }

    fn require_column(&self, column_id: &str) -> Result<(), BoardError> {
        if self.state.find_column(column_id).is_none() {
            return Err(TaskError::UnknownColumn(column_id.to_string()).into());
        }
        Ok(())
    }

    /// Full id for a full id or unique prefix
    pub fn resolve_task(&self, query: &str) -> Result<String, BoardError> {
        Ok(task_ops::resolve_task_id(&self.state.tasks, query)?)
    }

    /// Full subtask id for an id, unique prefix, or 1-based position
    pub fn resolve_subtask(&self, task_id: &str, query: &str) -> Result<String, BoardError> {
        let task = self
            .state
            .find_task(task_id)
            .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
        Ok(task_ops::resolve_subtask_id(task, query)?)
    }

    /// Full id for a column id, unique id prefix, or case-insensitive title
    pub fn resolve_column(&self, query: &str) -> Result<String, BoardError> {
        let columns = &self.state.columns;
        if let Some(c) = columns.iter().find(|c| c.id == query) {
            return Ok(c.id.clone());
        }
        let by_title: Vec<_> = columns
            .iter()
            .filter(|c| c.title.eq_ignore_ascii_case(query))
            .collect();
        if let [only] = by_title.as_slice() {
            return Ok(only.id.clone());
        }
        let by_prefix: Vec<_> = columns.iter().filter(|c| c.id.starts_with(query)).collect();
        match by_prefix.as_slice() {
            [only] => Ok(only.id.clone()),
            _ => Err(ColumnError::NotFound(query.to_string()).into()),
        }
    }

    // -----------------------------------------------------------------------
    // Tasks
    // -----------------------------------------------------------------------

    pub fn add_task(&mut self, column_id: &str, fields: NewTask) -> Result<String, BoardError> {
        self.require_column(column_id)?;
        let id = task_ops::add_task(&mut self.state.tasks, column_id, fields)?;
        self.persist()?;
        let title = self.task_title(&id);
        self.toasts
            .push(Toast::success("Task Created", format!("\"{}\" has been added", title)));
        Ok(id)
    }

    pub fn update_task(&mut self, task_id: &str, patch: TaskPatch) -> Result<(), BoardError> {
        task_ops::update_task(&mut self.state.tasks, task_id, patch)?;
        self.persist()?;
        let title = self.task_title(task_id);
        self.toasts
            .push(Toast::success("Task Updated", format!("\"{}\" has been updated", title)));
        Ok(())
    }

    pub fn delete_task(&mut self, task_id: &str) -> Result<Task, BoardError> {
        let removed = task_ops::delete_task(&mut self.state.tasks, task_id)?;
        self.persist()?;
        self.toasts.push(Toast::success(
            "Task Deleted",
            format!("\"{}\" has been removed", removed.title),
        ));
        Ok(removed)
    }

    /// Move a task to a column. Returns whether it actually moved.
    pub fn move_task(&mut self, task_id: &str, column_id: &str) -> Result<bool, BoardError> {
        let valid: Vec<&str> = self.state.columns.iter().map(|c| c.id.as_str()).collect();
        let moved = task_ops::move_task(&mut self.state.tasks, task_id, column_id, &valid)?;
        if moved {
            self.persist()?;
        }
        Ok(moved)
    }

    /// Drop `active_id` onto `over_id` (a column or another task).
    ///
    /// Invalid drops are ignored. Returns whether the task changed column.
    pub fn drop_task(&mut self, active_id: &str, over_id: &str) -> Result<bool, StoreError> {
        let target = task_ops::resolve_drop_target(&self.state.tasks, over_id).to_string();
        match self.move_task(active_id, &target) {
            Ok(moved) => Ok(moved),
            Err(BoardError::Store(e)) => Err(e),
            Err(e) => {
                tracing::debug!(task = active_id, over = over_id, error = %e, "ignoring drop");
                Ok(false)
            }
        }
    }

    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> Result<String, BoardError> {
        let id = task_ops::add_subtask(&mut self.state.tasks, task_id, text)?;
        self.persist()?;
        Ok(id)
    }

    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<bool, BoardError> {
        let done = task_ops::toggle_subtask(&mut self.state.tasks, task_id, subtask_id)?;
        self.persist()?;
        Ok(done)
    }

    pub fn delete_subtask(&mut self, task_id: &str, subtask_id: &str) -> Result<(), BoardError> {
        task_ops::delete_subtask(&mut self.state.tasks, task_id, subtask_id)?;
        self.persist()
    }

    pub fn add_tag(&mut self, task_id: &str, text: &str) -> Result<Tag, BoardError> {
        let tag = task_ops::add_tag(&mut self.state.tasks, task_id, text)?;
        self.persist()?;
        Ok(tag)
    }

    pub fn remove_tag(&mut self, task_id: &str, text: &str) -> Result<usize, BoardError> {
        let removed = task_ops::remove_tag(&mut self.state.tasks, task_id, text)?;
        if removed > 0 {
            self.persist()?;
        }
        Ok(removed)
    }

    fn task_title(&self, task_id: &str) -> String {
        self.state
            .find_task(task_id)
            .map(|t| t.title.clone())
            .unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Columns
    // -----------------------------------------------------------------------

    pub fn add_column(&mut self, title: &str, color: Option<&str>) -> Result<String, BoardError> {
        let id = column_ops::add_column(&mut self.state.columns, title, color)?;
        self.persist()?;
        Ok(id)
    }

    pub fn update_column(&mut self, column_id: &str, patch: ColumnPatch) -> Result<(), BoardError> {
        column_ops::update_column(&mut self.state.columns, column_id, patch)?;
        self.persist()
    }

    /// Delete a column, moving its tasks to the first remaining column.
    /// The last column of a workspace cannot be deleted.
    pub fn delete_column(&mut self, column_id: &str) -> Result<usize, BoardError> {
        if self.state.find_column(column_id).is_none() {
            return Err(ColumnError::NotFound(column_id.to_string()).into());
        }
        if self.state.columns.len() <= 1 {
            return Err(ColumnError::LastColumn.into());
        }
        let moved = column_ops::delete_column(&mut self.state.columns, &mut self.state.tasks, column_id)?;
        self.persist()?;
        self.toasts
            .push(Toast::success("Column Deleted", "Tasks moved to first column"));
        Ok(moved)
    }

    pub fn move_column(&mut self, column_id: &str, direction: Direction) -> Result<bool, BoardError> {
        let moved = column_ops::move_column(&mut self.state.columns, column_id, direction)?;
        if moved {
            self.persist()?;
        }
        Ok(moved)
    }

    // -----------------------------------------------------------------------
    // Workspaces
    // -----------------------------------------------------------------------

    /// Save the current workspace, then load `workspace_id` in its place
    pub fn switch_workspace(&mut self, workspace_id: &str) -> Result<(), BoardError> {
        if !self.workspaces.iter().any(|w| w.id == workspace_id) {
            return Err(BoardError::UnknownWorkspace(workspace_id.to_string()));
        }
        if workspace_id == self.state.active_workspace {
            return Ok(());
        }
        self.persist()?;
        self.state = self.store.load(workspace_id);
        tracing::debug!(workspace = workspace_id, "switched workspace");
        Ok(())
    }

    pub fn add_workspace(&mut self, workspace: Workspace) -> Result<(), BoardError> {
        if self.workspaces.iter().any(|w| w.id == workspace.id) {
            return Err(BoardError::DuplicateWorkspace(workspace.id));
        }
        self.workspaces.push(workspace);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Export / import
    // -----------------------------------------------------------------------

    pub fn export(&mut self) -> Result<String, BoardError> {
        let json = transfer::export_json(&self.state).map_err(StoreError::from)?;
        self.toasts
            .push(Toast::success("Exported!", "Your board has been downloaded"));
        Ok(json)
    }

    pub fn export_filename(&self, date: NaiveDate) -> String {
        transfer::export_filename(&self.state.active_workspace, date)
    }

    /// Replace the board with an import file's columns and tasks.
    ///
    /// A rejected file leaves the board untouched and queues an error toast.
    pub fn import(&mut self, text: &str) -> Result<(), BoardError> {
        let parsed = transfer::import_json(text).and_then(|b| {
            if b.columns.is_empty() {
                Err(ImportError::NoColumns)
            } else {
                Ok(b)
            }
        });
        let BoardExport { columns, mut tasks } = match parsed {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "import rejected");
                self.toasts.push(Toast::error("Import Failed", "Invalid file format"));
                return Err(e.into());
            }
        };
        let fallback = columns[0].id.clone();
        for task in tasks.iter_mut() {
            if !columns.iter().any(|c| c.id == task.column_id) {
                tracing::warn!(task = %task.id, column = %task.column_id, "imported task has no column, moving to first column");
                task.column_id = fallback.clone();
            }
        }
        self.state.columns = columns;
        self.state.tasks = tasks;
        self.persist()?;
        self.toasts
            .push(Toast::success("Imported!", "Your board has been restored"));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    pub fn filtered(&self, filter: &TaskFilter) -> Vec<&Task> {
        filter::filter_tasks(&self.state.tasks, filter)
    }

    pub fn stats(&self, today: NaiveDate) -> BoardStats {
        stats::compute_stats(
            &self.state.tasks,
            &self.state.columns,
            ColumnRoles {
                terminal: &self.roles.terminal_column,
                in_progress: &self.roles.in_progress_column,
            },
            today,
        )
    }

    /// One reminder tick against the toast queue. Returns the new toasts.
    pub fn check_reminders<Tz: TimeZone>(&mut self, window_hours: i64, now: &DateTime<Tz>) -> Vec<Toast> {
        reminder::reminder_tick(
            &self.state.tasks,
            &self.roles.terminal_column,
            &mut self.toasts,
            window_hours,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::model::column::Column;
    use crate::model::defaults::default_columns;
    use crate::model::toast::ToastKind;
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;

    fn workspaces() -> Vec<Workspace> {
        vec![
            Workspace::new("main", "Main", "📋"),
            Workspace::new("ai-stuff", "AI Stuff", "🤖"),
        ]
    }

    fn board() -> Board<MemoryStorage> {
        Board::open(
            BoardStore::new(MemoryStorage::new()),
            workspaces(),
            "main",
            BoardRoles::default(),
        )
    }

    fn ai_stuff_board() -> Board<MemoryStorage> {
        let mut store = BoardStore::new(MemoryStorage::new());
        store
            .save(&BoardState {
                columns: vec![
                    Column::new("backlog", "Backlog", "#6b7280"),
                    Column::new("sprint", "Sprint", "#3b82f6"),
                    Column::new("done", "Done", "#22c55e"),
                ],
                tasks: Vec::new(),
                active_workspace: "ai-stuff".into(),
            })
            .unwrap();
        let mut board = Board::open(store, workspaces(), "ai-stuff", BoardRoles::default());
        board.add_task("sprint", NewTask::titled("Train model")).unwrap();
        board
    }

    #[test]
    fn mutations_write_through() {
        let mut board = board();
        let id = board.add_task("todo", NewTask::titled("Write script")).unwrap();
        let saved = board.store().load("main");
        assert!(saved.find_task(&id).is_some());

        board.move_task(&id, "done").unwrap();
        assert_eq!(board.store().load("main").find_task(&id).unwrap().column_id, "done");
    }

    #[test]
    fn add_task_to_unknown_column_rejected() {
        let mut board = board();
        let before = board.state().tasks.len();
        assert!(board.add_task("nowhere", NewTask::titled("x")).is_err());
        assert_eq!(board.state().tasks.len(), before);
    }

    #[test]
    fn delete_column_scenario() {
        let mut board = ai_stuff_board();
        let moved = board.delete_column("sprint").unwrap();
        assert_eq!(moved, 1);
        assert_eq!(board.state().column_ids(), vec!["backlog", "done"]);
        assert_eq!(board.state().tasks[0].column_id, "backlog");
        assert!(board.state().dangling_tasks().is_empty());
    }

    #[test]
    fn last_column_cannot_be_deleted() {
        let mut board = ai_stuff_board();
        board.delete_column("sprint").unwrap();
        board.delete_column("backlog").unwrap();
        let err = board.delete_column("done").unwrap_err();
        assert!(matches!(err, BoardError::Column(ColumnError::LastColumn)));
        assert_eq!(board.state().column_ids(), vec!["done"]);
    }

    #[test]
    fn drop_onto_task_moves_to_its_column() {
        let mut board = ai_stuff_board();
        let other = board.add_task("done", NewTask::titled("Shipped")).unwrap();
        let id = board.state().tasks[0].id.clone();
        assert!(board.drop_task(&id, &other).unwrap());
        assert_eq!(board.state().find_task(&id).unwrap().column_id, "done");
    }

    #[test]
    fn invalid_drop_is_silent_noop() {
        let mut board = ai_stuff_board();
        let id = board.state().tasks[0].id.clone();
        assert!(!board.drop_task(&id, "not-a-column").unwrap());
        assert!(!board.drop_task("ghost", "done").unwrap());
        assert_eq!(board.state().tasks[0].column_id, "sprint");
    }

    #[test]
    fn switching_workspaces_keeps_each_board() {
        let mut board = board();
        let id = board.add_task("todo", NewTask::titled("Main only")).unwrap();
        board.switch_workspace("ai-stuff").unwrap();
        assert_eq!(board.active_workspace(), "ai-stuff");
        assert!(board.state().find_task(&id).is_none());
        assert_eq!(board.state().columns, default_columns());

        board.switch_workspace("main").unwrap();
        assert!(board.state().find_task(&id).is_some());
        assert!(matches!(
            board.switch_workspace("nope"),
            Err(BoardError::UnknownWorkspace(_))
        ));
    }

    #[test]
    fn unknown_active_workspace_falls_back_to_first() {
        let board = Board::open(
            BoardStore::new(MemoryStorage::new()),
            workspaces(),
            "deleted",
            BoardRoles::default(),
        );
        assert_eq!(board.active_workspace(), "main");
    }

    #[test]
    fn import_without_columns_leaves_state() {
        let mut board = ai_stuff_board();
        let before = board.state().clone();
        board.toasts_mut().drain();
        let err = board.import(r#"{"tasks": []}"#).unwrap_err();
        assert!(matches!(err, BoardError::Import(ImportError::MissingKey("columns"))));
        assert_eq!(board.state(), &before);
        let toast = board.toasts().iter().next().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.title, "Import Failed");
    }

    #[test]
    fn export_import_round_trip() {
        let mut board = ai_stuff_board();
        let json = board.export().unwrap();
        let before = board.state().clone();

        let mut other = board_with_workspace("main");
        other.import(&json).unwrap();
        assert_eq!(other.state().columns, before.columns);
        assert_eq!(other.state().tasks, before.tasks);
    }

    fn board_with_workspace(ws: &str) -> Board<MemoryStorage> {
        Board::open(
            BoardStore::new(MemoryStorage::new()),
            workspaces(),
            ws,
            BoardRoles::default(),
        )
    }

    #[test]
    fn import_repairs_dangling_columns() {
        let mut board = board();
        board
            .import(
                r##"{"columns":[{"id":"a","title":"A","color":"#000"}],
                    "tasks":[{"id":"t","title":"T","columnId":"zzz","createdAt":"2026-02-09T00:00:00Z"}]}"##,
            )
            .unwrap();
        assert_eq!(board.state().tasks[0].column_id, "a");
    }

    #[test]
    fn reminders_through_board() {
        let mut board = ai_stuff_board();
        let now = Utc.with_ymd_and_hms(2026, 2, 10, 9, 30, 0).unwrap();
        let id = board.state().tasks[0].id.clone();
        board
            .update_task(
                &id,
                TaskPatch {
                    due_date: Some(Some(now.date_naive() + Duration::days(1))),
                    ..Default::default()
                },
            )
            .unwrap();
        board.toasts_mut().drain();
        let first = board.check_reminders(24, &now);
        let second = board.check_reminders(24, &(now + Duration::seconds(1)));
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
    }

    #[test]
    fn resolve_column_by_title_or_prefix() {
        let board = ai_stuff_board();
        assert_eq!(board.resolve_column("Sprint").unwrap(), "sprint");
        assert_eq!(board.resolve_column("spr").unwrap(), "sprint");
        assert!(board.resolve_column("x").is_err());
    }
}
