use std::fs;
use std::path::Path;

use crate::io::project_io::{ProjectError, CONFIG_FILE};
use crate::model::config::BoardConfig;
use crate::model::workspace::Workspace;

/// Read the board config, returning both the parsed config and the raw
/// toml_edit Document for round-trip-safe editing.
pub fn read_config(kanban_dir: &Path) -> Result<(BoardConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = kanban_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(kanban_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ProjectError> {
    let config_path = kanban_dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| ProjectError::ReadError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

/// Append a workspace to the config document
pub fn add_workspace_to_config(doc: &mut toml_edit::DocumentMut, workspace: &Workspace) {
    if !doc.contains_key("workspaces") {
        doc["workspaces"] = toml_edit::Item::ArrayOfTables(toml_edit::ArrayOfTables::new());
    }

    if let Some(workspaces) = doc["workspaces"].as_array_of_tables_mut() {
        let mut table = toml_edit::Table::new();
        table["id"] = toml_edit::value(&workspace.id);
        table["name"] = toml_edit::value(&workspace.name);
        table["icon"] = toml_edit::value(&workspace.icon);
        workspaces.push(table);
    }
}

/// Rename a workspace in the config document. Returns false if not found.
pub fn rename_workspace_in_config(doc: &mut toml_edit::DocumentMut, id: &str, name: &str) -> bool {
    if let Some(workspaces) = doc
        .get_mut("workspaces")
        .and_then(|item| item.as_array_of_tables_mut())
    {
        for table in workspaces.iter_mut() {
            if table.get("id").and_then(|v| v.as_str()) == Some(id) {
                table["name"] = toml_edit::value(name);
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_config() -> &'static str {
        r#"[board]
name = "test"
# finished work lives here
terminal_column = "done"

[[workspaces]]
id = "main"
name = "Main"
icon = "📋"

[reminders]
window_hours = 12
"#
    }

    #[test]
    fn round_trip_preserves_formatting() {
        let tmp = TempDir::new().unwrap();
        let kanban_dir = tmp.path().join("kanban");
        fs::create_dir_all(&kanban_dir).unwrap();
        let config_path = kanban_dir.join(CONFIG_FILE);

        let original = sample_config();
        fs::write(&config_path, original).unwrap();

        let (config, doc) = read_config(&kanban_dir).unwrap();
        assert_eq!(config.reminders.window_hours, 12);
        assert_eq!(config.reminders.interval_secs, 60);
        write_config(&kanban_dir, &doc).unwrap();

        let written = fs::read_to_string(&config_path).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn add_workspace_appends_table() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        add_workspace_to_config(&mut doc, &Workspace::new("ai-stuff", "AI Stuff", "🤖"));
        let result = doc.to_string();
        assert!(result.contains("# finished work lives here"));
        let config: BoardConfig = toml::from_str(&result).unwrap();
        assert_eq!(config.workspaces.len(), 2);
        assert_eq!(config.workspaces[1].id, "ai-stuff");
        assert_eq!(config.workspaces[1].icon, "🤖");
    }

    #[test]
    fn add_workspace_to_config_without_any() {
        let mut doc: toml_edit::DocumentMut = "[board]\nname = \"x\"\n".parse().unwrap();
        add_workspace_to_config(&mut doc, &Workspace::new("main", "Main", "📋"));
        let config: BoardConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.default_workspace_id(), "main");
    }

    #[test]
    fn rename_workspace() {
        let mut doc: toml_edit::DocumentMut = sample_config().parse().unwrap();
        assert!(rename_workspace_in_config(&mut doc, "main", "Home"));
        assert!(!rename_workspace_in_config(&mut doc, "nope", "X"));
        let config: BoardConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(config.workspaces[0].name, "Home");
    }
}
