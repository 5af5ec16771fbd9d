use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::model::task::Task;
use crate::model::toast::{Toast, ToastKind, ToastTopic, Toasts};
use crate::ops::stats::{due_status, DueStatus};

/// A due-soon notice for one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task_id: String,
    pub title: String,
    pub hours_until_due: i64,
    pub due_date: NaiveDate,
    /// Where the due date falls relative to the day the check ran
    pub status: DueStatus,
}

impl Reminder {
    pub fn message(&self) -> String {
        match self.status {
            DueStatus::Today => format!("\"{}\" is due today", self.title),
            DueStatus::Tomorrow => format!("\"{}\" is due tomorrow", self.title),
            DueStatus::Overdue | DueStatus::Upcoming => {
                format!("\"{}\" is due {}", self.title, self.due_date.format("%b %-d"))
            }
        }
    }

    /// Turn the reminder into a warning toast stamped at `at`
    pub fn into_toast(self, at: DateTime<Utc>) -> Toast {
        let mut toast = Toast::new(ToastKind::Warning, "Due Soon!", self.message());
        toast.topic = ToastTopic::DueSoon;
        toast.task_id = Some(self.task_id);
        toast.created_at = at;
        toast
    }
}

/// Whole hours from `now` until the start of `due` in `now`'s timezone,
/// truncated toward zero. `None` if that midnight does not exist locally.
pub fn hours_until_due<Tz: TimeZone>(due: NaiveDate, now: &DateTime<Tz>) -> Option<i64> {
    let midnight = due.and_hms_opt(0, 0, 0)?;
    let due_at = now.timezone().from_local_datetime(&midnight).earliest()?;
    Some(due_at.signed_duration_since(now.clone()).num_hours())
}

/// Find tasks due within `window_hours` that have no reminder showing yet.
///
/// Tasks without a due date, tasks in the terminal column, and tasks whose
/// reminder toast is still outstanding are skipped.
pub fn check_reminders<Tz: TimeZone>(
    tasks: &[Task],
    terminal_column: &str,
    outstanding: &Toasts,
    window_hours: i64,
    now: &DateTime<Tz>,
) -> Vec<Reminder> {
    let today = now.date_naive();
    tasks
        .iter()
        .filter(|t| t.column_id != terminal_column)
        .filter(|t| !outstanding.is_outstanding(&t.id, ToastTopic::DueSoon))
        .filter_map(|t| {
            let due = t.due_date?;
            let hours = hours_until_due(due, now)?;
            (hours > 0 && hours <= window_hours).then(|| Reminder {
                task_id: t.id.clone(),
                title: t.title.clone(),
                hours_until_due: hours,
                due_date: due,
                status: due_status(due, today),
            })
        })
        .collect()
}

/// Run one reminder tick: expire old toasts, then queue a toast for every new
/// reminder. Returns the toasts that were queued.
pub fn reminder_tick<Tz: TimeZone>(
    tasks: &[Task],
    terminal_column: &str,
    toasts: &mut Toasts,
    window_hours: i64,
    now: &DateTime<Tz>,
) -> Vec<Toast> {
    let stamp = now.with_timezone(&Utc);
    toasts.expire(stamp);
    let reminders = check_reminders(tasks, terminal_column, toasts, window_hours, now);
    let mut issued = Vec::with_capacity(reminders.len());
    for reminder in reminders {
        tracing::info!(task = %reminder.task_id, hours = reminder.hours_until_due, "due-soon reminder");
        let toast = reminder.into_toast(stamp);
        toasts.push(toast.clone());
        issued.push(toast);
    }
    issued
}
