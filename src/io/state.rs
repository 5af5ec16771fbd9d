use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Color theme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Theme {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

/// Per-user state outside any board (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    /// Workspace shown by default
    #[serde(default)]
    pub active_workspace: Option<String>,
    #[serde(default)]
    pub theme: Theme,
}

/// Read .state.json from the kanban directory
pub fn read_ui_state(kanban_dir: &Path) -> Option<UiState> {
    let path = kanban_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the kanban directory
pub fn write_ui_state(kanban_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = kanban_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
