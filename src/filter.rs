//! Filtered views over the task collection.
//!
//! Each criterion is an independent predicate and the filter is their
//! conjunction, so the order predicates are applied in never changes the
//! result. Input order is preserved.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::task::{Category, Priority, Task};

const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    NotCompleted,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => ALL,
            StatusFilter::Completed => "completed",
            StatusFilter::NotCompleted => "notCompleted",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "all" => Ok(StatusFilter::All),
            "completed" | "done" => Ok(StatusFilter::Completed),
            "notcompleted" | "incomplete" | "open" => Ok(StatusFilter::NotCompleted),
            _ => Err(Error::InvalidArgument(format!(
                "invalid status filter '{}' (expected all|completed|notCompleted)",
                s.trim()
            ))),
        }
    }
}

/// Criteria for [`filter`]. `None` means "all" for category and priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub status: StatusFilter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl FilterCriteria {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusFilter) -> Self {
        self.status = status;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Build criteria from the textual `all|<value>` form used by the CLI.
    pub fn parse(
        status: Option<&str>,
        category: Option<&str>,
        priority: Option<&str>,
    ) -> Result<Self> {
        let status = match status {
            Some(value) => value.parse()?,
            None => StatusFilter::All,
        };
        let category = match category.map(str::trim) {
            Some(value) if !value.eq_ignore_ascii_case(ALL) => Some(value.parse()?),
            _ => None,
        };
        let priority = match priority.map(str::trim) {
            Some(value) if !value.eq_ignore_ascii_case(ALL) => Some(value.parse()?),
            _ => None,
        };
        Ok(Self {
            status,
            category,
            priority,
        })
    }

    pub fn is_unfiltered(&self) -> bool {
        self.status == StatusFilter::All && self.category.is_none() && self.priority.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        matches_status(task, self.status)
            && matches_category(task, self.category.as_ref())
            && matches_priority(task, self.priority)
    }
}

pub fn matches_status(task: &Task, status: StatusFilter) -> bool {
    match status {
        StatusFilter::All => true,
        StatusFilter::Completed => task.is_completed,
        StatusFilter::NotCompleted => !task.is_completed,
    }
}

/// Custom categories compare case-insensitively, like the built-in names.
pub fn matches_category(task: &Task, category: Option<&Category>) -> bool {
    match (category, &task.category) {
        (None, _) => true,
        (Some(Category::Other(wanted)), Category::Other(have)) => {
            have.eq_ignore_ascii_case(wanted)
        }
        (Some(category), have) => have == category,
    }
}

pub fn matches_priority(task: &Task, priority: Option<Priority>) -> bool {
    match priority {
        None => true,
        Some(priority) => task.priority == priority,
    }
}

/// Tasks matching every criterion, in their original order.
pub fn filter(tasks: &[Task], criteria: &FilterCriteria) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| criteria.matches(task))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, category: Category, priority: Priority, done: bool) -> Task {
        let now = Utc::now();
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            category,
            priority,
            deadline: None,
            is_completed: done,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Task> {
        vec![
            task("1", Category::Work, Priority::High, true),
            task("2", Category::Work, Priority::Low, false),
            task("3", Category::Personal, Priority::High, true),
            task("4", Category::Work, Priority::Medium, true),
            task("5", Category::Other("garden".into()), Priority::Low, false),
        ]
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn unfiltered_returns_everything_in_order() {
        let tasks = sample();
        let result = filter(&tasks, &FilterCriteria::all());
        assert_eq!(ids(&result), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn completed_work_tasks_only() {
        let tasks = sample();
        let criteria = FilterCriteria::all()
            .status(StatusFilter::Completed)
            .category(Category::Work);
        assert_eq!(ids(&filter(&tasks, &criteria)), vec!["1", "4"]);
    }

    #[test]
    fn predicates_commute() {
        let tasks = sample();
        let criteria = FilterCriteria::all()
            .status(StatusFilter::NotCompleted)
            .priority(Priority::Low);

        let combined = filter(&tasks, &criteria);

        let by_priority_first: Vec<Task> = tasks
            .iter()
            .filter(|t| matches_priority(t, criteria.priority))
            .filter(|t| matches_category(t, criteria.category.as_ref()))
            .filter(|t| matches_status(t, criteria.status))
            .cloned()
            .collect();
        assert_eq!(combined, by_priority_first);
        assert_eq!(ids(&combined), vec!["2", "5"]);
    }

    #[test]
    fn no_match_is_empty() {
        let tasks = sample();
        let criteria = FilterCriteria::all().category(Category::Finances);
        assert!(filter(&tasks, &criteria).is_empty());
    }

    #[test]
    fn custom_category_matches_ignoring_case() {
        let tasks = sample();
        let criteria = FilterCriteria::parse(None, Some("Garden"), None).unwrap();
        assert_eq!(ids(&filter(&tasks, &criteria)), vec!["5"]);

        let criteria = FilterCriteria::all().category(Category::Other("GARDEN".into()));
        assert_eq!(ids(&filter(&tasks, &criteria)), vec!["5"]);
    }

    #[test]
    fn parse_treats_all_as_wildcard() {
        let criteria = FilterCriteria::parse(Some("all"), Some("ALL"), Some("all")).unwrap();
        assert!(criteria.is_unfiltered());

        let criteria =
            FilterCriteria::parse(Some("notCompleted"), Some("work"), Some("high")).unwrap();
        assert_eq!(criteria.status, StatusFilter::NotCompleted);
        assert_eq!(criteria.category, Some(Category::Work));
        assert_eq!(criteria.priority, Some(Priority::High));
    }

    #[test]
    fn status_filter_accepts_spellings() {
        for raw in ["notCompleted", "not-completed", "not_completed", "incomplete"] {
            assert_eq!(raw.parse::<StatusFilter>().unwrap(), StatusFilter::NotCompleted);
        }
        assert!("maybe".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn parse_rejects_unknown_priority() {
        assert!(FilterCriteria::parse(None, None, Some("urgent")).is_err());
    }
}
