use serde::{Deserialize, Serialize};

/// Palette offered when creating or recoloring a column
pub const COLUMN_COLORS: [&str; 10] = [
    "#6b7280", "#3b82f6", "#f59e0b", "#a855f7", "#22c55e", "#ef4444", "#ec4899", "#06b6d4",
    "#f97316", "#8b5cf6",
];

/// Column id used when a column is deleted and no other column remains
pub const FALLBACK_COLUMN_ID: &str = "backlog";

/// A named, ordered bucket of tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub color: String,
}

impl Column {
    pub fn new(id: impl Into<String>, title: impl Into<String>, color: impl Into<String>) -> Self {
        Column {
            id: id.into(),
            title: title.into(),
            color: color.into(),
        }
    }
}

/// A partial update to a column
#[derive(Debug, Clone, Default)]
pub struct ColumnPatch {
    pub title: Option<String>,
    pub color: Option<String>,
}

impl Column {
    pub fn apply(&mut self, patch: ColumnPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
    }
}

/// Direction for shifting a column among its neighbours
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn parse(s: &str) -> Option<Direction> {
        match s {
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }
}
