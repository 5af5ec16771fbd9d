use chrono::NaiveDate;
use serde::Serialize;

use crate::model::column::Column;
use crate::model::task::Task;
use crate::model::toast::{Toast, ToastKind};
use crate::model::workspace::{BoardState, Workspace};
use crate::ops::filter::column_tasks;
use crate::ops::stats::{due_status, subtask_progress, BoardStats, DueStatus};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct BoardJson<'a> {
    pub workspace: &'a str,
    pub columns: Vec<ColumnJson<'a>>,
}

#[derive(Serialize)]
pub struct ColumnJson<'a> {
    #[serde(flatten)]
    pub column: &'a Column,
    pub tasks: Vec<TaskJson<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson<'a> {
    #[serde(flatten)]
    pub task: &'a Task,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_status: Option<DueStatus>,
    pub progress: u8,
}

#[derive(Serialize)]
pub struct WorkspaceJson<'a> {
    #[serde(flatten)]
    pub workspace: &'a Workspace,
    pub active: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSummaryJson<'a> {
    #[serde(flatten)]
    pub column: &'a Column,
    pub task_count: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, today: NaiveDate) -> TaskJson<'_> {
    TaskJson {
        task,
        due_status: task.due_date.map(|d| due_status(d, today)),
        progress: subtask_progress(task).2,
    }
}

/// Board as columns in order, each with its (already filtered) tasks
pub fn board_to_json<'a>(state: &'a BoardState, tasks: &[&'a Task], today: NaiveDate) -> BoardJson<'a> {
    BoardJson {
        workspace: &state.active_workspace,
        columns: state
            .columns
            .iter()
            .map(|column| ColumnJson {
                column,
                tasks: column_tasks(tasks.iter().copied(), &column.id)
                    .into_iter()
                    .map(|t| task_to_json(t, today))
                    .collect(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// First 8 characters of an id, enough to address it from the CLI
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((i, _)) => &id[..i],
        None => id,
    }
}

/// Format a single task as one line
pub fn format_task_line(task: &Task, today: NaiveDate) -> String {
    let mut line = format!(
        "{}  {:<6}  {}",
        short_id(&task.id),
        task.priority.as_str(),
        task.title
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due:{}", due_status(due, today).label(due)));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t.text)).collect();
        line.push_str(&format!("  {}", tags.join(" ")));
    }
    let (done, total, _) = subtask_progress(task);
    if total > 0 {
        line.push_str(&format!("  [{}/{}]", done, total));
    }
    line
}

/// Format the board column by column. `tasks` is the filtered set to show.
pub fn format_board(state: &BoardState, tasks: &[&Task], today: NaiveDate) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, column) in state.columns.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        let in_column = column_tasks(tasks.iter().copied(), &column.id);
        lines.push(format!("== {} ({}) [{}] ==", column.title, column.id, in_column.len()));
        if in_column.is_empty() {
            lines.push("  (empty)".to_string());
        }
        for task in in_column {
            lines.push(format!("  {}", format_task_line(task, today)));
        }
    }
    lines
}

/// Format detailed task view
pub fn format_task_detail(task: &Task, column_title: &str, today: NaiveDate) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(task.title.clone());
    lines.push(format!("id: {}", task.id));
    lines.push(format!("column: {}", column_title));
    lines.push(format!("priority: {}", task.priority));
    if let Some(due) = task.due_date {
        lines.push(format!(
            "due: {} ({})",
            due.format("%Y-%m-%d"),
            due_status(due, today).label(due)
        ));
    }
    if !task.tags.is_empty() {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("#{}", t.text)).collect();
        lines.push(format!("tags: {}", tags.join(" ")));
    }
    lines.push(format!("created: {}", task.created_at.format("%Y-%m-%d")));

    if !task.description.is_empty() {
        lines.push(String::new());
        for line in task.description.lines() {
            lines.push(format!("  {}", line));
        }
    }

    if !task.subtasks.is_empty() {
        let (done, total, percent) = subtask_progress(task);
        lines.push(String::new());
        lines.push(format!("checklist: {}/{} ({}%)", done, total, percent));
        for (i, sub) in task.subtasks.iter().enumerate() {
            let mark = if sub.completed { "x" } else { " " };
            lines.push(format!("  {}. [{}] {}  {}", i + 1, mark, sub.text, short_id(&sub.id)));
        }
    }
    lines
}

/// Format the header counters and per-column counts
pub fn format_stats(stats: &BoardStats, columns: &[Column]) -> Vec<String> {
    let counters = [
        ("Total", stats.total),
        ("Completed", stats.completed),
        ("In progress", stats.in_progress),
        ("Overdue", stats.overdue),
        ("Due today", stats.due_today),
        ("High priority", stats.high_priority),
    ];
    let per_column: Vec<(&str, usize)> = columns
        .iter()
        .map(|c| (c.title.as_str(), stats.per_column.get(&c.id).copied().unwrap_or(0)))
        .collect();
    let label_w = counters
        .iter()
        .map(|(l, _)| l.len())
        .chain(per_column.iter().map(|(l, _)| l.len()))
        .max()
        .unwrap_or(0);

    let mut lines = Vec::new();
    for (label, n) in counters {
        lines.push(format!(" {:<label_w$}  {:>4}", label, n, label_w = label_w));
    }
    lines.push(String::new());
    for (label, n) in per_column {
        lines.push(format!(" {:<label_w$}  {:>4}", label, n, label_w = label_w));
    }
    lines
}

pub fn format_column_line(column: &Column, task_count: usize) -> String {
    format!("{}  {}  {}  [{}]", column.id, column.title, column.color, task_count)
}

pub fn format_workspace_line(workspace: &Workspace, active: bool) -> String {
    let marker = if active { "*" } else { " " };
    format!("{} {} {}  {}", marker, workspace.icon, workspace.id, workspace.name)
}

/// One-line rendering of a notification
pub fn format_toast(toast: &Toast) -> String {
    let icon = match toast.kind {
        ToastKind::Success => "✓",
        ToastKind::Error => "✗",
        ToastKind::Info => "i",
        ToastKind::Warning => "!",
    };
    format!("{} {}: {}", icon, toast.title, toast.message)
}
