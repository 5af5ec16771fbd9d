use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag colors, handed out round-robin as tags are added to a task
pub const TAG_COLORS: [&str; 6] = ["purple", "blue", "green", "orange", "pink", "cyan"];

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Parse a priority name (case-insensitive)
    pub fn parse(s: &str) -> Option<Priority> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" | "med" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A free-form label on a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub text: String,
    pub color: String,
}

impl Tag {
    /// Build a tag colored for position `index` in its task's tag list
    pub fn for_position(text: impl Into<String>, index: usize) -> Self {
        Tag {
            text: text.into(),
            color: TAG_COLORS[index % TAG_COLORS.len()].to_string(),
        }
    }
}

/// A checklist item owned by a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Subtask {
            id: new_id(),
            text: text.into(),
            completed: false,
        }
    }
}

/// The primary unit of work on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// The column this task currently sits in
    pub column_id: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub tags: Vec<Tag>,
    pub subtasks: Vec<Subtask>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }
}

/// A partial update to a task. `None` leaves the field untouched.
///
/// `due_date` is doubly optional: `Some(None)` clears the due date.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<NaiveDate>>,
    pub tags: Option<Vec<Tag>>,
    pub subtasks: Option<Vec<Subtask>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.tags.is_none()
            && self.subtasks.is_none()
    }
}

impl Task {
    /// Create a task in `column_id` with a fresh id and creation timestamp
    pub fn new(column_id: impl Into<String>, fields: NewTask) -> Self {
        Task {
            id: new_id(),
            title: fields.title,
            description: fields.description,
            column_id: column_id.into(),
            priority: fields.priority,
            due_date: fields.due_date,
            tags: fields.tags,
            subtasks: fields.subtasks,
            created_at: Utc::now(),
        }
    }

    /// Apply a patch field by field
    pub fn apply(&mut self, patch: TaskPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(subtasks) = patch.subtasks {
            self.subtasks = subtasks;
        }
    }

    pub fn has_tag(&self, text: &str) -> bool {
        self.tags.iter().any(|t| t.text == text)
    }
}

/// Generate a fresh random identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_colors_cycle() {
        assert_eq!(Tag::for_position("a", 0).color, "purple");
        assert_eq!(Tag::for_position("b", 5).color, "cyan");
        assert_eq!(Tag::for_position("c", 6).color, "purple");
    }

    #[test]
    fn deserializes_wire_shape() {
        let json = r#"{
            "id": "existing-003",
            "title": "Platform Build",
            "description": "Build the platform",
            "columnId": "in-progress",
            "priority": "high",
            "dueDate": "2026-03-15",
            "tags": [{ "text": "Dev", "color": "cyan" }],
            "subtasks": [{ "id": "plat-001", "text": "Design mockups", "completed": true }],
            "createdAt": "2026-02-09T00:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.column_id, "in-progress");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 3, 15));
        assert!(task.subtasks[0].completed);
    }

    #[test]
    fn null_due_date_and_missing_optionals() {
        let json = r#"{"id":"x","title":"T","columnId":"backlog","dueDate":null,"createdAt":"2026-02-09T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.due_date, None);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.tags.is_empty());
        assert_eq!(task.description, "");
    }

    #[test]
    fn serializes_camel_case() {
        let task = Task::new("todo", NewTask::titled("Write script"));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["columnId"], "todo");
        assert!(value["dueDate"].is_null());
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn patch_clears_due_date() {
        let mut task = Task::new(
            "todo",
            NewTask {
                title: "T".into(),
                due_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                ..Default::default()
            },
        );
        task.apply(TaskPatch {
            due_date: Some(None),
            ..Default::default()
        });
        assert_eq!(task.due_date, None);
        assert_eq!(task.title, "T");
    }

    #[test]
    fn priority_parse() {
        assert_eq!(Priority::parse("HIGH"), Some(Priority::High));
        assert_eq!(Priority::parse("med"), Some(Priority::Medium));
        assert_eq!(Priority::parse("urgent"), None);
    }
}
