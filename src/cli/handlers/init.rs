use std::fs;

use crate::cli::commands::InitArgs;
use crate::io::persist::BoardStore;
use crate::io::project_io::{self, CONFIG_FILE, PROJECT_DIR, STORE_DIR};
use crate::io::storage::DirStorage;
use crate::model::defaults::{default_board, default_columns};
use crate::model::workspace::BoardState;

const CONFIG_TEMPLATE: &str = include_str!("../../templates/kanban.toml");

/// Validate that a workspace ID is lowercase alphanumeric with hyphens only.
pub(super) fn validate_workspace_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("workspace id cannot be empty".to_string());
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(format!(
            "invalid workspace id \"{}\": use lowercase with hyphens (e.g. \"ai-stuff\")",
            id
        ));
    }
    Ok(())
}

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse --add-workspace pairs from the flat Vec<String> produced by clap.
/// Each pair is (id, name).
fn parse_workspace_pairs(args: &[String]) -> Vec<(&str, &str)> {
    args.chunks(2)
        .filter_map(|chunk| match chunk {
            [id, name] => Some((id.as_str(), name.as_str())),
            _ => None,
        })
        .collect()
}

/// Render kanban.toml with extra workspaces appended after the default one.
fn render_config(name: &str, workspaces: &[(&str, &str)]) -> String {
    let base = CONFIG_TEMPLATE.replace("{name}", &toml_escape(name));
    if workspaces.is_empty() {
        return base;
    }
    let mut section = String::new();
    for (id, wname) in workspaces {
        section.push_str(&format!(
            "\n[[workspaces]]\nid = \"{}\"\nname = \"{}\"\nicon = \"📋\"\n",
            id,
            toml_escape(wname)
        ));
    }
    base.replacen(
        "icon = \"📋\"\n",
        &format!("icon = \"📋\"\n{}", section),
        1,
    )
}

fn toml_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let kanban_dir = cwd.join(PROJECT_DIR);

    if kanban_dir.join(CONFIG_FILE).exists() {
        return Err("board already exists in ./kanban/".into());
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = project_io::discover_project(parent)
    {
        eprintln!("Note: parent board found at {}/", parent_root.join(PROJECT_DIR).display());
        eprintln!("Creating new board in ./kanban/");
    }

    let pairs = parse_workspace_pairs(&args.workspaces);
    let mut seen_ids = std::collections::HashSet::from(["main"]);
    for (id, _) in &pairs {
        validate_workspace_id(id)?;
        if !seen_ids.insert(*id) {
            return Err(format!("duplicate workspace id \"{}\"", id).into());
        }
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(kanban_dir.join(STORE_DIR))?;
    fs::write(kanban_dir.join(CONFIG_FILE), render_config(&name, &pairs))?;

    // Seed every workspace so the first `kb board` shows something
    let mut store = BoardStore::new(DirStorage::new(kanban_dir.join(STORE_DIR)));
    let ids = std::iter::once("main").chain(pairs.iter().map(|(id, _)| *id));
    for id in ids {
        let state = if args.empty {
            BoardState {
                columns: default_columns(),
                tasks: Vec::new(),
                active_workspace: id.to_string(),
            }
        } else {
            default_board(id)
        };
        store.save(&state)?;
    }

    println!("Initialized board: {}", name);
    println!("  workspace: Main (main)");
    for (id, wname) in &pairs {
        println!("  workspace: {} ({})", wname, id);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::BoardConfig;

    #[test]
    fn workspace_id_validation() {
        assert!(validate_workspace_id("main").is_ok());
        assert!(validate_workspace_id("ai-stuff").is_ok());
        assert!(validate_workspace_id("v2").is_ok());
        assert!(validate_workspace_id("AI Stuff").is_err());
        assert!(validate_workspace_id("under_score").is_err());
        assert!(validate_workspace_id("").is_err());
    }

    #[test]
    fn infer_name_title_cases() {
        assert_eq!(infer_name("my-side-project"), "My Side Project");
        assert_eq!(infer_name("kanban"), "Kanban");
    }

    #[test]
    fn workspace_pairs_ignore_dangling_id() {
        let args = vec![
            "ai-stuff".to_string(),
            "AI Stuff".to_string(),
            "odd".to_string(),
        ];
        assert_eq!(parse_workspace_pairs(&args), vec![("ai-stuff", "AI Stuff")]);
    }

    #[test]
    fn rendered_template_parses() {
        let text = render_config("My \"Board\"", &[]);
        let config: BoardConfig = toml::from_str(&text).unwrap();
        assert_eq!(config.board.name, "My \"Board\"");
        assert_eq!(config.board.terminal_column, "done");
        assert_eq!(config.default_workspace_id(), "main");
        assert_eq!(config.reminders.interval_secs, 60);
        assert_eq!(config.reminders.window_hours, 24);
        assert_eq!(config.sync.data_file, "public/board-data.json");
        assert_eq!(config.sync.poll_secs, 5);
        assert_eq!(config.sync.default_message, "Update Kanban board");
    }

    #[test]
    fn rendered_template_with_workspaces() {
        let text = render_config("Test", &[("ai-stuff", "AI Stuff"), ("home", "Home")]);
        let config: BoardConfig = toml::from_str(&text).unwrap();
        let ids: Vec<&str> = config.workspaces.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, vec!["main", "ai-stuff", "home"]);
        assert_eq!(config.workspaces[1].name, "AI Stuff");
    }
}
