use indexmap::IndexSet;

use crate::model::task::{Priority, Task};

/// Which priorities pass the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

/// Which tag must be present
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagFilter {
    #[default]
    All,
    Only(String),
}

impl PriorityFilter {
    /// Parse `all` or a priority name
    pub fn parse(s: &str) -> Option<PriorityFilter> {
        if s.eq_ignore_ascii_case("all") {
            return Some(PriorityFilter::All);
        }
        Priority::parse(s).map(PriorityFilter::Only)
    }
}

impl TagFilter {
    pub fn from_option(tag: Option<String>) -> TagFilter {
        match tag {
            Some(t) if t != "all" => TagFilter::Only(t),
            _ => TagFilter::All,
        }
    }
}

/// The board's search bar and filter dropdowns
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub search_query: String,
    pub priority: PriorityFilter,
    pub tag: TagFilter,
}

impl TaskFilter {
    pub fn is_empty(&self) -> bool {
        self.search_query.is_empty()
            && self.priority == PriorityFilter::All
            && self.tag == TagFilter::All
    }

    /// All three predicates must hold
    pub fn matches(&self, task: &Task) -> bool {
        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            let hit = task.title.to_lowercase().contains(&query)
                || task.description.to_lowercase().contains(&query)
                || task.tags.iter().any(|t| t.text.to_lowercase().contains(&query));
            if !hit {
                return false;
            }
        }
        if let PriorityFilter::Only(p) = self.priority
            && task.priority != p
        {
            return false;
        }
        if let TagFilter::Only(ref tag) = self.tag
            && !task.has_tag(tag)
        {
            return false;
        }
        true
    }
}

/// The subset of `tasks` passing `filter`, in board order
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &TaskFilter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Tasks in one column, in board order
pub fn column_tasks<'a, I>(tasks: I, column_id: &str) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks.into_iter().filter(|t| t.column_id == column_id).collect()
}

/// Every distinct tag text, in first-seen order
pub fn all_tags(tasks: &[Task]) -> Vec<String> {
    let set: IndexSet<&str> = tasks
        .iter()
        .flat_map(|t| t.tags.iter().map(|tag| tag.text.as_str()))
        .collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{NewTask, Tag};
    use pretty_assertions::assert_eq;

    fn task(title: &str, description: &str, priority: Priority, tags: &[&str]) -> Task {
        Task::new(
            "backlog",
            NewTask {
                title: title.into(),
                description: description.into(),
                priority,
                tags: tags.iter().enumerate().map(|(i, t)| Tag::for_position(*t, i)).collect(),
                ..Default::default()
            },
        )
    }

    fn sample() -> Vec<Task> {
        vec![
            task("Rebrand channel", "dark mode aesthetic", Priority::High, &["YouTube", "Brand"]),
            task("Lead enrichment", "n8n workflow", Priority::Medium, &["YouTube", "n8n"]),
            task("Google Sites", "still needed?", Priority::Low, &["Web"]),
        ]
    }

    fn titles(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn empty_filter_passes_everything() {
        let tasks = sample();
        assert_eq!(filter_tasks(&tasks, &TaskFilter::default()).len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_title_description_tags() {
        let tasks = sample();
        let by = |q: &str| {
            titles(&filter_tasks(
                &tasks,
                &TaskFilter {
                    search_query: q.into(),
                    ..Default::default()
                },
            ))
        };
        assert_eq!(by("REBRAND"), vec!["Rebrand channel"]);
        assert_eq!(by("workflow"), vec!["Lead enrichment"]);
        assert_eq!(by("youtube"), vec!["Rebrand channel", "Lead enrichment"]);
        assert!(by("nothing like this").is_empty());
    }

    #[test]
    fn predicates_are_conjunctive() {
        let tasks = sample();
        let filter = TaskFilter {
            search_query: "e".into(),
            priority: PriorityFilter::Only(Priority::Medium),
            tag: TagFilter::Only("YouTube".into()),
        };
        assert_eq!(titles(&filter_tasks(&tasks, &filter)), vec!["Lead enrichment"]);
    }

    #[test]
    fn tag_filter_is_exact() {
        let tasks = sample();
        let filter = TaskFilter {
            tag: TagFilter::Only("youtube".into()),
            ..Default::default()
        };
        assert!(filter_tasks(&tasks, &filter).is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let tasks = sample();
        let filter = TaskFilter {
            search_query: "n".into(),
            priority: PriorityFilter::All,
            tag: TagFilter::Only("YouTube".into()),
        };
        let once: Vec<Task> = filter_tasks(&tasks, &filter).into_iter().cloned().collect();
        let twice: Vec<Task> = filter_tasks(&once, &filter).into_iter().cloned().collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn all_tags_unique_in_order() {
        assert_eq!(all_tags(&sample()), vec!["YouTube", "Brand", "n8n", "Web"]);
    }

    #[test]
    fn parse_filters() {
        assert_eq!(PriorityFilter::parse("ALL"), Some(PriorityFilter::All));
        assert_eq!(PriorityFilter::parse("high"), Some(PriorityFilter::Only(Priority::High)));
        assert_eq!(PriorityFilter::parse("x"), None);
        assert_eq!(TagFilter::from_option(Some("all".into())), TagFilter::All);
        assert_eq!(TagFilter::from_option(None), TagFilter::All);
    }
}
