use chrono::{Duration, Local, NaiveDate};

use super::column::Column;
use super::task::{NewTask, Priority, Subtask, Tag, Task};
use super::workspace::BoardState;

/// The columns every new workspace starts with
pub fn default_columns() -> Vec<Column> {
    vec![
        Column::new("backlog", "Backlog", "#6b7280"),
        Column::new("todo", "To Do", "#3b82f6"),
        Column::new("in-progress", "In Progress", "#f59e0b"),
        Column::new("review", "Review", "#a855f7"),
        Column::new("done", "Done", "#22c55e"),
    ]
}

fn seed(
    today: NaiveDate,
    column: &str,
    title: &str,
    description: &str,
    priority: Priority,
    days: Option<i64>,
    tags: &[&str],
) -> Task {
    Task::new(
        column,
        NewTask {
            title: title.to_string(),
            description: description.to_string(),
            priority,
            due_date: days.map(|d| today + Duration::days(d)),
            tags: tags
                .iter()
                .enumerate()
                .map(|(i, t)| Tag::for_position(*t, i))
                .collect(),
            subtasks: Vec::new(),
        },
    )
}

/// Example tasks seeded into a fresh workspace
pub fn default_tasks() -> Vec<Task> {
    let today = Local::now().date_naive();

    let mut welcome = seed(
        today,
        "todo",
        "Welcome to your board",
        "Move this card with `kb mv`, tick its checklist with `kb sub toggle`",
        Priority::High,
        Some(1),
        &["Getting Started"],
    );
    welcome.subtasks = vec![
        Subtask::new("Add a task with `kb add`"),
        Subtask::new("Filter the board with `kb board --search`"),
        Subtask::new("Export a backup with `kb export`"),
    ];

    vec![
        welcome,
        seed(
            today,
            "backlog",
            "Plan the week",
            "Collect ideas in the backlog, pull them into To Do when ready",
            Priority::Medium,
            Some(7),
            &["Planning"],
        ),
        seed(
            today,
            "in-progress",
            "Set up git sync",
            "Run `kb snapshot` then `kb sync` to push the board",
            Priority::Low,
            None,
            &["Setup", "Git"],
        ),
    ]
}

/// The state a workspace has before anything was ever saved for it
pub fn default_board(workspace_id: &str) -> BoardState {
    BoardState {
        columns: default_columns(),
        tasks: default_tasks(),
        active_workspace: workspace_id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_tasks_reference_seeded_columns() {
        let board = default_board("main");
        assert!(board.dangling_tasks().is_empty());
        assert_eq!(board.active_workspace, "main");
        assert_eq!(board.columns.len(), 5);
    }
}
