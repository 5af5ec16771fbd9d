use serde::{Deserialize, Serialize};

use super::column::Column;
use super::task::Task;

/// A named partition of the board with its own columns and tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default = "default_icon")]
    pub icon: String,
}

fn default_icon() -> String {
    "📋".to_string()
}

impl Workspace {
    pub fn new(id: impl Into<String>, name: impl Into<String>, icon: impl Into<String>) -> Self {
        Workspace {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        }
    }
}

/// The persisted state of one workspace's board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardState {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub active_workspace: String,
}

impl BoardState {
    pub fn column_ids(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn find_column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Tasks whose column no longer exists. Empty when the board is consistent.
    pub fn dangling_tasks(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| self.find_column(&t.column_id).is_none())
            .collect()
    }
}
