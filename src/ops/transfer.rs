use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::column::Column;
use crate::model::task::Task;
use crate::model::workspace::BoardState;

/// Error type for importing a board file
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("invalid file format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("invalid file format: missing \"{0}\"")]
    MissingKey(&'static str),
    #[error("invalid file format: expected a JSON object")]
    NotAnObject,
    #[error("board must have at least one column")]
    NoColumns,
}

/// The exported/imported shape: columns and tasks of one board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardExport {
    pub columns: Vec<Column>,
    pub tasks: Vec<Task>,
}

impl BoardExport {
    pub fn from_state(state: &BoardState) -> Self {
        BoardExport {
            columns: state.columns.clone(),
            tasks: state.tasks.clone(),
        }
    }
}

static UNSAFE_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("valid file name pattern"));

/// Pretty-printed JSON of a board's columns and tasks
pub fn export_json(state: &BoardState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&BoardExport::from_state(state))
}

/// Default export file name, e.g. `kanban-ai-stuff-2026-02-10.json`
pub fn export_filename(workspace_id: &str, date: NaiveDate) -> String {
    let slug = UNSAFE_NAME_CHARS.replace_all(workspace_id, "-");
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "board" } else { slug };
    format!("kanban-{}-{}.json", slug, date.format("%Y-%m-%d"))
}

/// Parse an import file. Both `columns` and `tasks` must be present.
pub fn import_json(text: &str) -> Result<BoardExport, ImportError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;
    for key in ["columns", "tasks"] {
        if !object.contains_key(key) {
            return Err(ImportError::MissingKey(key));
        }
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::defaults::default_board;
    use pretty_assertions::assert_eq;

    #[test]
    fn export_then_import_round_trips() {
        let state = default_board("main");
        let text = export_json(&state).unwrap();
        let imported = import_json(&text).unwrap();
        assert_eq!(imported.columns, state.columns);
        assert_eq!(imported.tasks, state.tasks);
    }

    #[test]
    fn export_is_pretty_and_omits_workspace() {
        let text = export_json(&default_board("main")).unwrap();
        assert!(text.contains("\n  \"columns\": ["));
        assert!(!text.contains("activeWorkspace"));
    }

    #[test]
    fn import_requires_columns() {
        let err = import_json(r#"{"tasks": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("columns")));
    }

    #[test]
    fn import_requires_tasks() {
        let err = import_json(r#"{"columns": []}"#).unwrap_err();
        assert!(matches!(err, ImportError::MissingKey("tasks")));
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(matches!(import_json("nope"), Err(ImportError::InvalidJson(_))));
        assert!(matches!(import_json("[1,2]"), Err(ImportError::NotAnObject)));
    }

    #[test]
    fn import_accepts_legacy_millisecond_timestamps() {
        let text = r##"{
          "columns": [{ "id": "todo", "title": "To Do", "color": "#3b82f6" }],
          "tasks": [{
            "id": "existing-004",
            "title": "LinkedIn Content Calendar",
            "description": "Create weekly content plan",
            "columnId": "todo",
            "priority": "medium",
            "dueDate": "2026-02-14",
            "tags": [{ "text": "Content", "color": "orange" }],
            "subtasks": [],
            "createdAt": "2026-02-09T00:00:00.000Z"
          }]
        }"##;
        let board = import_json(text).unwrap();
        assert_eq!(board.tasks[0].tags[0].text, "Content");
    }

    #[test]
    fn export_filename_is_dated_and_safe() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 10).unwrap();
        assert_eq!(export_filename("ai-stuff", date), "kanban-ai-stuff-2026-02-10.json");
        assert_eq!(export_filename("my/board x", date), "kanban-my-board-x-2026-02-10.json");
        assert_eq!(export_filename("///", date), "kanban-board-2026-02-10.json");
    }
}
