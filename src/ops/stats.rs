use chrono::{Duration, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;

use crate::model::column::Column;
use crate::model::task::{Priority, Task};

/// Where a due date falls relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueStatus {
    Overdue,
    Today,
    Tomorrow,
    Upcoming,
}

impl DueStatus {
    pub fn label(self, due: NaiveDate) -> String {
        match self {
            DueStatus::Overdue => format!("Overdue: {}", due.format("%b %-d")),
            DueStatus::Today => "Today".to_string(),
            DueStatus::Tomorrow => "Tomorrow".to_string(),
            DueStatus::Upcoming => due.format("%b %-d").to_string(),
        }
    }
}

pub fn due_status(due: NaiveDate, today: NaiveDate) -> DueStatus {
    if due < today {
        DueStatus::Overdue
    } else if due == today {
        DueStatus::Today
    } else if due == today + Duration::days(1) {
        DueStatus::Tomorrow
    } else {
        DueStatus::Upcoming
    }
}

/// Checklist progress: (completed, total, percent rounded down)
pub fn subtask_progress(task: &Task) -> (usize, usize, u8) {
    let total = task.subtasks.len();
    let done = task.subtasks.iter().filter(|s| s.completed).count();
    let percent = if total == 0 { 0 } else { (done * 100 / total) as u8 };
    (done, total, percent)
}

/// Header counters for the board
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub high_priority: usize,
    /// Task count per column, in column order
    pub per_column: IndexMap<String, usize>,
}

/// Which columns carry special meaning for stats and reminders
#[derive(Debug, Clone, Copy)]
pub struct ColumnRoles<'a> {
    pub terminal: &'a str,
    pub in_progress: &'a str,
}

pub fn compute_stats(tasks: &[Task], columns: &[Column], roles: ColumnRoles<'_>, today: NaiveDate) -> BoardStats {
    let mut stats = BoardStats {
        total: tasks.len(),
        per_column: columns.iter().map(|c| (c.id.clone(), 0)).collect(),
        ..Default::default()
    };
    for task in tasks {
        if let Some(count) = stats.per_column.get_mut(&task.column_id) {
            *count += 1;
        }
        if task.column_id == roles.in_progress {
            stats.in_progress += 1;
        }
        if task.column_id == roles.terminal {
            stats.completed += 1;
            continue;
        }
        if task.priority == Priority::High {
            stats.high_priority += 1;
        }
        match task.due_date.map(|d| due_status(d, today)) {
            Some(DueStatus::Overdue) => stats.overdue += 1,
            Some(DueStatus::Today) => stats.due_today += 1,
            _ => {}
        }
    }
    stats
}
