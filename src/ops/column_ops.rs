use crate::model::column::{COLUMN_COLORS, Column, ColumnPatch, Direction, FALLBACK_COLUMN_ID};
use crate::model::task::{Task, new_id};

/// Error type for column operations
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColumnError {
    #[error("column not found: {0}")]
    NotFound(String),
    #[error("column title cannot be empty")]
    EmptyTitle,
    #[error("cannot delete the last column")]
    LastColumn,
}

/// Append a column. A missing color picks the next palette entry.
/// Returns the new column's id.
pub fn add_column(columns: &mut Vec<Column>, title: &str, color: Option<&str>) -> Result<String, ColumnError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ColumnError::EmptyTitle);
    }
    let color = color
        .map(str::to_string)
        .unwrap_or_else(|| COLUMN_COLORS[columns.len() % COLUMN_COLORS.len()].to_string());
    let column = Column::new(new_id(), title, color);
    let id = column.id.clone();
    columns.push(column);
    Ok(id)
}

pub fn update_column(columns: &mut [Column], column_id: &str, mut patch: ColumnPatch) -> Result<(), ColumnError> {
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(ColumnError::EmptyTitle);
        }
    }
    let column = columns
        .iter_mut()
        .find(|c| c.id == column_id)
        .ok_or_else(|| ColumnError::NotFound(column_id.to_string()))?;
    column.apply(patch);
    Ok(())
}

/// The column that inherits tasks when `removed_id` goes away: the first
/// other column, or [`FALLBACK_COLUMN_ID`] if there is none.
pub fn fallback_column_id(columns: &[Column], removed_id: &str) -> String {
    columns
        .iter()
        .find(|c| c.id != removed_id)
        .map(|c| c.id.clone())
        .unwrap_or_else(|| FALLBACK_COLUMN_ID.to_string())
}

/// Remove a column, moving its tasks to the fallback column.
///
/// Does not guard against removing the last column; callers that must keep
/// one column check `columns.len() > 1` first. Returns how many tasks moved.
pub fn delete_column(columns: &mut Vec<Column>, tasks: &mut [Task], column_id: &str) -> Result<usize, ColumnError> {
    if !columns.iter().any(|c| c.id == column_id) {
        return Err(ColumnError::NotFound(column_id.to_string()));
    }
    let fallback = fallback_column_id(columns, column_id);
    let mut moved = 0;
    for task in tasks.iter_mut().filter(|t| t.column_id == column_id) {
        task.column_id = fallback.clone();
        moved += 1;
    }
    columns.retain(|c| c.id != column_id);
    Ok(moved)
}

/// Swap a column with its neighbour. Returns false at either end of the board.
pub fn move_column(columns: &mut [Column], column_id: &str, direction: Direction) -> Result<bool, ColumnError> {
    let index = columns
        .iter()
        .position(|c| c.id == column_id)
        .ok_or_else(|| ColumnError::NotFound(column_id.to_string()))?;
    let target = match direction {
        Direction::Left if index > 0 => index - 1,
        Direction::Right if index + 1 < columns.len() => index + 1,
        _ => return Ok(false),
    };
    columns.swap(index, target);
    Ok(true)
}
