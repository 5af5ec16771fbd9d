use std::fs;
use std::path::{Path, PathBuf};

use crate::io::persist::BoardStore;
use crate::io::state::{read_ui_state, write_ui_state, UiState};
use crate::io::storage::DirStorage;
use crate::model::config::BoardConfig;

/// Name of the directory holding a board project's files
pub const PROJECT_DIR: &str = "kanban";
/// Config file inside [`PROJECT_DIR`]
pub const CONFIG_FILE: &str = "kanban.toml";
/// Key/value store directory inside [`PROJECT_DIR`]
pub const STORE_DIR: &str = "store";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a kanban project: no kanban/kanban.toml found")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse kanban.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit kanban.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A discovered board project on disk
#[derive(Debug)]
pub struct Project {
    /// Directory containing `kanban/` (git commands run here)
    pub root: PathBuf,
    /// Path to the `kanban/` directory
    pub kanban_dir: PathBuf,
    /// Parsed kanban.toml
    pub config: BoardConfig,
}

impl Project {
    /// A board store over this project's storage directory
    pub fn board_store(&self) -> BoardStore<DirStorage> {
        BoardStore::new(DirStorage::new(self.kanban_dir.join(STORE_DIR)))
    }

    pub fn ui_state(&self) -> UiState {
        read_ui_state(&self.kanban_dir).unwrap_or_default()
    }

    pub fn save_ui_state(&self, state: &UiState) -> Result<(), ProjectError> {
        write_ui_state(&self.kanban_dir, state)?;
        Ok(())
    }

    /// The workspace to open: the recorded one if still configured, else the first
    pub fn active_workspace(&self) -> String {
        let state = self.ui_state();
        match state.active_workspace {
            Some(ws) if self.config.find_workspace(&ws).is_some() => ws,
            _ => self.config.default_workspace_id().to_string(),
        }
    }

    /// Absolute path of the git-sync snapshot file
    pub fn data_file(&self) -> PathBuf {
        self.root.join(&self.config.sync.data_file)
    }
}

/// Walk up from `start` looking for `kanban/kanban.toml`.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(PROJECT_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load the project rooted at `root`.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let kanban_dir = root.join(PROJECT_DIR);
    if !kanban_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }
    let config_path = kanban_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    Ok(Project {
        root: root.to_path_buf(),
        kanban_dir,
        config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(root: &Path) {
        let dir = root.join(PROJECT_DIR);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(CONFIG_FILE),
            "[board]\nname = \"Test\"\n\n[[workspaces]]\nid = \"main\"\nname = \"Main\"\n\n[[workspaces]]\nid = \"ai-stuff\"\nname = \"AI\"\n",
        )
        .unwrap();
    }

    #[test]
    fn discover_walks_up() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let nested = tmp.path().join("a/b");
        fs::create_dir_all(&nested).unwrap();
        assert_eq!(discover_project(&nested).unwrap(), tmp.path());
    }

    #[test]
    fn discover_fails_outside_project() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(discover_project(tmp.path()), Err(ProjectError::NotAProject)));
    }

    #[test]
    fn active_workspace_defaults_and_persists() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let project = load_project(tmp.path()).unwrap();
        assert_eq!(project.active_workspace(), "main");

        project
            .save_ui_state(&UiState {
                active_workspace: Some("ai-stuff".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(project.active_workspace(), "ai-stuff");

        project
            .save_ui_state(&UiState {
                active_workspace: Some("gone".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(project.active_workspace(), "main");
    }

    #[test]
    fn data_file_is_relative_to_root() {
        let tmp = TempDir::new().unwrap();
        write_project(tmp.path());
        let project = load_project(tmp.path()).unwrap();
        assert_eq!(project.data_file(), tmp.path().join("public/board-data.json"));
    }
}
