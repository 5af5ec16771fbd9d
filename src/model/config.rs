use serde::{Deserialize, Serialize};

use super::workspace::Workspace;

/// Configuration from kanban.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    pub board: BoardInfo,
    #[serde(default)]
    pub workspaces: Vec<Workspace>,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    pub name: String,
    /// Column holding finished work; excluded from reminders and overdue counts
    #[serde(default = "default_terminal_column")]
    pub terminal_column: String,
    /// Column counted as "in progress" in stats
    #[serde(default = "default_in_progress_column")]
    pub in_progress_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    /// Default: see src/templates/kanban.toml
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Default: see src/templates/kanban.toml
    #[serde(default = "default_window_hours")]
    pub window_hours: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            interval_secs: default_interval_secs(),
            window_hours: default_window_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Snapshot file, relative to the project root
    #[serde(default = "default_data_file")]
    pub data_file: String,
    #[serde(default = "default_poll_secs")]
    pub poll_secs: u64,
    #[serde(default = "default_message")]
    pub default_message: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            data_file: default_data_file(),
            poll_secs: default_poll_secs(),
            default_message: default_message(),
        }
    }
}

impl BoardConfig {
    pub fn find_workspace(&self, id: &str) -> Option<&Workspace> {
        self.workspaces.iter().find(|w| w.id == id)
    }

    /// The first configured workspace, used when no active one is recorded
    pub fn default_workspace_id(&self) -> &str {
        self.workspaces
            .first()
            .map(|w| w.id.as_str())
            .unwrap_or(DEFAULT_WORKSPACE_ID)
    }
}

/// Workspace used when the config lists none
pub const DEFAULT_WORKSPACE_ID: &str = "main";

fn default_terminal_column() -> String {
    "done".to_string()
}

fn default_in_progress_column() -> String {
    "in-progress".to_string()
}

fn default_interval_secs() -> u64 {
    60
}

fn default_window_hours() -> i64 {
    24
}

fn default_data_file() -> String {
    "public/board-data.json".to_string()
}

fn default_poll_secs() -> u64 {
    5
}

fn default_message() -> String {
    "Update Kanban board".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let config: BoardConfig = toml::from_str("[board]\nname = \"x\"\n").unwrap();
        assert_eq!(config.board.terminal_column, "done");
        assert_eq!(config.board.in_progress_column, "in-progress");
        assert_eq!(config.reminders.interval_secs, 60);
        assert_eq!(config.reminders.window_hours, 24);
        assert_eq!(config.sync.poll_secs, 5);
        assert_eq!(config.sync.default_message, "Update Kanban board");
        assert_eq!(config.default_workspace_id(), "main");
    }

    #[test]
    fn workspaces_parse_with_default_icon() {
        let config: BoardConfig = toml::from_str(
            r#"[board]
name = "x"

[[workspaces]]
id = "ai-stuff"
name = "AI Stuff"
"#,
        )
        .unwrap();
        let ws = config.find_workspace("ai-stuff").unwrap();
        assert_eq!(ws.icon, "📋");
        assert_eq!(config.default_workspace_id(), "ai-stuff");
    }
}
