use crate::io::storage::{Storage, StoreError};
use crate::model::defaults::default_board;
use crate::model::workspace::BoardState;

/// Versioned namespace for board blobs. Bump the suffix when the shape changes.
pub const STORAGE_KEY: &str = "kanban-board-data-v2";

/// Storage key for one workspace's board
pub fn board_key(workspace_id: &str) -> String {
    format!("{}:{}", STORAGE_KEY, workspace_id)
}

/// Loads and saves workspace boards through an injected [`Storage`]
#[derive(Debug)]
pub struct BoardStore<S> {
    storage: S,
}

impl<S: Storage> BoardStore<S> {
    pub fn new(storage: S) -> Self {
        BoardStore { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load a workspace's board. Missing, unreadable, or corrupt data yields
    /// the built-in defaults; this never fails.
    pub fn load(&self, workspace_id: &str) -> BoardState {
        let key = board_key(workspace_id);
        let text = match self.storage.get(&key) {
            Ok(Some(text)) => text,
            Ok(None) => {
                tracing::debug!(workspace = workspace_id, "no saved board, using defaults");
                return default_board(workspace_id);
            }
            Err(e) => {
                tracing::warn!(workspace = workspace_id, error = %e, "could not read board, using defaults");
                return default_board(workspace_id);
            }
        };
        match serde_json::from_str::<BoardState>(&text) {
            Ok(mut state) => {
                state.active_workspace = workspace_id.to_string();
                state
            }
            Err(e) => {
                tracing::warn!(workspace = workspace_id, error = %e, "corrupt board data, using defaults");
                default_board(workspace_id)
            }
        }
    }

    /// Whether anything has ever been saved for this workspace
    pub fn exists(&self, workspace_id: &str) -> bool {
        matches!(self.storage.get(&board_key(workspace_id)), Ok(Some(_)))
    }

    /// Write the board through to storage under its workspace's key
    pub fn save(&mut self, state: &BoardState) -> Result<(), StoreError> {
        let json = serde_json::to_string(state)?;
        self.storage.set(&board_key(&state.active_workspace), &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::storage::MemoryStorage;
    use crate::model::column::Column;
    use crate::model::defaults::default_columns;
    use pretty_assertions::assert_eq;

    fn custom_board(workspace: &str) -> BoardState {
        BoardState {
            columns: vec![Column::new("a", "A", "#000"), Column::new("b", "B", "#fff")],
            tasks: Vec::new(),
            active_workspace: workspace.to_string(),
        }
    }

    #[test]
    fn missing_key_loads_defaults() {
        let store = BoardStore::new(MemoryStorage::new());
        let board = store.load("main");
        assert_eq!(board.columns, default_columns());
        assert_eq!(board.active_workspace, "main");
        assert!(!store.exists("main"));
    }

    #[test]
    fn corrupt_payload_loads_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(&board_key("main"), "{not json").unwrap();
        let store = BoardStore::new(storage);
        assert_eq!(store.load("main").columns, default_columns());
    }

    #[test]
    fn save_then_load_is_identity() {
        let mut store = BoardStore::new(MemoryStorage::new());
        let board = custom_board("ai-stuff");
        store.save(&board).unwrap();
        assert!(store.exists("ai-stuff"));
        assert_eq!(store.load("ai-stuff"), board);
        // other workspaces are untouched
        assert_eq!(store.load("main").columns, default_columns());
    }

    #[test]
    fn persisted_shape_uses_camel_case_keys() {
        let mut store = BoardStore::new(MemoryStorage::new());
        store.save(&custom_board("main")).unwrap();
        let raw = store.storage().get(&board_key("main")).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("columns").is_some());
        assert!(value.get("tasks").is_some());
        assert_eq!(value["activeWorkspace"], "main");
    }
}
