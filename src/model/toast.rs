use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use super::task::new_id;

/// How long a toast stays visible before it expires on its own
pub const TOAST_TTL_SECS: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
    Warning,
}

/// What a toast is about, beyond its text. Reminders carry their task so the
/// scheduler can tell which ones are still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastTopic {
    General,
    DueSoon,
}

/// A transient notification. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub id: String,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    pub topic: ToastTopic,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(kind: ToastKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Toast {
            id: new_id(),
            kind,
            title: title.into(),
            message: message.into(),
            topic: ToastTopic::General,
            task_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Toast::new(ToastKind::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Toast::new(ToastKind::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Toast::new(ToastKind::Info, title, message)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.created_at >= Duration::seconds(TOAST_TTL_SECS)
    }
}

/// The queue of toasts currently on screen
#[derive(Debug, Clone, Default)]
pub struct Toasts {
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, toast: Toast) -> &Toast {
        self.items.push(toast);
        &self.items[self.items.len() - 1]
    }

    /// Remove a toast by id. Returns whether one was removed.
    pub fn dismiss(&mut self, toast_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != toast_id);
        self.items.len() != before
    }

    /// Drop every toast older than the time-to-live, returning the expired ones
    pub fn expire(&mut self, now: DateTime<Utc>) -> Vec<Toast> {
        let (expired, live): (Vec<Toast>, Vec<Toast>) =
            self.items.drain(..).partition(|t| t.is_expired(now));
        self.items = live;
        expired
    }

    /// Whether a toast about `task_id` with `topic` is still showing
    pub fn is_outstanding(&self, task_id: &str, topic: ToastTopic) -> bool {
        self.items
            .iter()
            .any(|t| t.topic == topic && t.task_id.as_deref() == Some(task_id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Take all toasts off the queue (e.g. after printing them)
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.items)
    }
}
