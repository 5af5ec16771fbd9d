use crate::model::task::{NewTask, Subtask, Tag, Task, TaskPatch};

/// Error type for task operations. Every error leaves the task list untouched.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task not found: {0}")]
    NotFound(String),
    #[error("task id is ambiguous: {0} matches {1} tasks")]
    Ambiguous(String, usize),
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("task title cannot be empty")]
    EmptyTitle,
    #[error("subtask text cannot be empty")]
    EmptySubtask,
    #[error("subtask not found: {0}")]
    SubtaskNotFound(String),
    #[error("tag text cannot be empty")]
    EmptyTag,
}

// ---------------------------------------------------------------------------
// Task CRUD
// ---------------------------------------------------------------------------

/// Append a new task to `column_id`. Returns the new task's id.
///
/// Title and description are trimmed; a blank title is rejected.
pub fn add_task(tasks: &mut Vec<Task>, column_id: &str, fields: NewTask) -> Result<String, TaskError> {
    let title = fields.title.trim().to_string();
    if title.is_empty() {
        return Err(TaskError::EmptyTitle);
    }
    let task = Task::new(
        column_id,
        NewTask {
            title,
            description: fields.description.trim().to_string(),
            ..fields
        },
    );
    let id = task.id.clone();
    tasks.push(task);
    Ok(id)
}

/// Merge `patch` into the task with `task_id`.
pub fn update_task(tasks: &mut [Task], task_id: &str, mut patch: TaskPatch) -> Result<(), TaskError> {
    if let Some(title) = patch.title.as_mut() {
        *title = title.trim().to_string();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
    }
    let task = find_task_mut(tasks, task_id)?;
    task.apply(patch);
    Ok(())
}

/// Remove a task (and with it, its subtasks). Returns the removed task.
pub fn delete_task(tasks: &mut Vec<Task>, task_id: &str) -> Result<Task, TaskError> {
    let index = tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))?;
    Ok(tasks.remove(index))
}

/// Reassign a task to `new_column_id`.
///
/// Returns `Ok(true)` when the task moved and `Ok(false)` when it was already
/// there. A target outside `valid_column_ids` is rejected.
pub fn move_task(
    tasks: &mut [Task],
    task_id: &str,
    new_column_id: &str,
    valid_column_ids: &[&str],
) -> Result<bool, TaskError> {
    if !valid_column_ids.contains(&new_column_id) {
        return Err(TaskError::UnknownColumn(new_column_id.to_string()));
    }
    let task = find_task_mut(tasks, task_id)?;
    if task.column_id == new_column_id {
        return Ok(false);
    }
    task.column_id = new_column_id.to_string();
    Ok(true)
}

/// Work out which column a drop landed in. Dropping onto another task means
/// dropping into that task's column; anything else is taken as a column id.
pub fn resolve_drop_target<'a>(tasks: &'a [Task], over_id: &'a str) -> &'a str {
    tasks
        .iter()
        .find(|t| t.id == over_id)
        .map(|t| t.column_id.as_str())
        .unwrap_or(over_id)
}

// ---------------------------------------------------------------------------
// Subtasks
// ---------------------------------------------------------------------------

/// Append a checklist item. Returns the subtask id.
pub fn add_subtask(tasks: &mut [Task], task_id: &str, text: &str) -> Result<String, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::EmptySubtask);
    }
    let task = find_task_mut(tasks, task_id)?;
    let subtask = Subtask::new(text);
    let id = subtask.id.clone();
    task.subtasks.push(subtask);
    Ok(id)
}

/// Flip a subtask's completed flag. Returns the new value.
pub fn toggle_subtask(tasks: &mut [Task], task_id: &str, subtask_id: &str) -> Result<bool, TaskError> {
    let task = find_task_mut(tasks, task_id)?;
    let subtask = task
        .subtasks
        .iter_mut()
        .find(|s| s.id == subtask_id)
        .ok_or_else(|| TaskError::SubtaskNotFound(subtask_id.to_string()))?;
    subtask.completed = !subtask.completed;
    Ok(subtask.completed)
}

pub fn delete_subtask(tasks: &mut [Task], task_id: &str, subtask_id: &str) -> Result<(), TaskError> {
    let task = find_task_mut(tasks, task_id)?;
    let before = task.subtasks.len();
    task.subtasks.retain(|s| s.id != subtask_id);
    if task.subtasks.len() == before {
        return Err(TaskError::SubtaskNotFound(subtask_id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Append a tag, colored by its position in the task's tag list.
/// Duplicate texts are allowed.
pub fn add_tag(tasks: &mut [Task], task_id: &str, text: &str) -> Result<Tag, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::EmptyTag);
    }
    let task = find_task_mut(tasks, task_id)?;
    let tag = Tag::for_position(text, task.tags.len());
    task.tags.push(tag.clone());
    Ok(tag)
}

/// Remove every tag whose text equals `text`. Returns how many were removed.
pub fn remove_tag(tasks: &mut [Task], task_id: &str, text: &str) -> Result<usize, TaskError> {
    let task = find_task_mut(tasks, task_id)?;
    let before = task.tags.len();
    task.tags.retain(|t| t.text != text);
    Ok(before - task.tags.len())
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_task_mut<'a>(tasks: &'a mut [Task], task_id: &str) -> Result<&'a mut Task, TaskError> {
    tasks
        .iter_mut()
        .find(|t| t.id == task_id)
        .ok_or_else(|| TaskError::NotFound(task_id.to_string()))
}

/// Resolve a full id or a unique id prefix to the full task id.
pub fn resolve_task_id(tasks: &[Task], query: &str) -> Result<String, TaskError> {
    if let Some(task) = tasks.iter().find(|t| t.id == query) {
        return Ok(task.id.clone());
    }
    let matches: Vec<&Task> = tasks.iter().filter(|t| t.id.starts_with(query)).collect();
    match matches.as_slice() {
        [] => Err(TaskError::NotFound(query.to_string())),
        [only] => Ok(only.id.clone()),
        many => Err(TaskError::Ambiguous(query.to_string(), many.len())),
    }
}

/// Resolve a full subtask id, a unique prefix, or a 1-based position.
pub fn resolve_subtask_id(task: &Task, query: &str) -> Result<String, TaskError> {
    if let Some(sub) = task.subtasks.iter().find(|s| s.id == query) {
        return Ok(sub.id.clone());
    }
    if let Ok(n) = query.parse::<usize>()
        && n >= 1
        && n <= task.subtasks.len()
    {
        return Ok(task.subtasks[n - 1].id.clone());
    }
    let matches: Vec<_> = task
        .subtasks
        .iter()
        .filter(|s| s.id.starts_with(query))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        _ => Err(TaskError::SubtaskNotFound(query.to_string())),
    }
}
