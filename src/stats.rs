//! Aggregate statistics over the task collection
//!
//! Counts by completion status and by priority, plus the list of tasks
//! whose deadline is still ahead of a reference time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub completed: usize,
    pub incomplete: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::Low => self.low,
            Priority::Medium => self.medium,
            Priority::High => self.high,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Whether completed tasks still show up as upcoming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpcomingPolicy {
    #[default]
    IncludeCompleted,
    ExcludeCompleted,
}

impl UpcomingPolicy {
    pub fn from_include_completed(include: bool) -> Self {
        if include {
            UpcomingPolicy::IncludeCompleted
        } else {
            UpcomingPolicy::ExcludeCompleted
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub generated_at: DateTime<Utc>,
    pub by_status: StatusCounts,
    pub by_priority: PriorityCounts,
    pub upcoming_policy: UpcomingPolicy,
    pub upcoming: Vec<Task>,
}

pub fn count_by_status(tasks: &[Task]) -> StatusCounts {
    let completed = tasks.iter().filter(|task| task.is_completed).count();
    StatusCounts {
        completed,
        incomplete: tasks.len() - completed,
        total: tasks.len(),
    }
}

pub fn count_by_priority(tasks: &[Task]) -> PriorityCounts {
    tasks
        .iter()
        .fold(PriorityCounts::default(), |mut acc, task| {
            match task.priority {
                Priority::Low => acc.low += 1,
                Priority::Medium => acc.medium += 1,
                Priority::High => acc.high += 1,
            }
            acc
        })
}

/// Tasks whose deadline (midnight UTC of the date) falls strictly after
/// `as_of`, in collection order.
pub fn upcoming(tasks: &[Task], as_of: DateTime<Utc>, policy: UpcomingPolicy) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| match policy {
            UpcomingPolicy::IncludeCompleted => true,
            UpcomingPolicy::ExcludeCompleted => !task.is_completed,
        })
        .filter(|task| task.deadline_at().is_some_and(|deadline| deadline > as_of))
        .cloned()
        .collect()
}

pub fn summarize(tasks: &[Task], as_of: DateTime<Utc>, policy: UpcomingPolicy) -> TaskStats {
    TaskStats {
        generated_at: as_of,
        by_status: count_by_status(tasks),
        by_priority: count_by_priority(tasks),
        upcoming_policy: policy,
        upcoming: upcoming(tasks, as_of, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Category;
    use chrono::{NaiveDate, TimeZone};

    fn task(id: &str, priority: Priority, deadline: Option<(i32, u32, u32)>, done: bool) -> Task {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            title: format!("task {id}"),
            description: String::new(),
            category: Category::Study,
            priority,
            deadline: deadline.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            is_completed: done,
            created_at: created,
            updated_at: created,
        }
    }

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn status_counts_add_up() {
        let tasks = vec![
            task("1", Priority::Low, None, true),
            task("2", Priority::Low, None, false),
            task("3", Priority::High, None, false),
        ];
        let counts = count_by_status(&tasks);
        assert_eq!(counts.completed, 1);
        assert_eq!(counts.incomplete, 2);
        assert_eq!(counts.total, tasks.len());
        assert_eq!(count_by_status(&[]), StatusCounts::default());
    }

    #[test]
    fn priority_buckets_cover_every_task() {
        let tasks = vec![
            task("1", Priority::Low, None, false),
            task("2", Priority::High, None, false),
            task("3", Priority::High, None, true),
            task("4", Priority::Medium, None, false),
        ];
        let counts = count_by_priority(&tasks);
        assert_eq!(counts, PriorityCounts { low: 1, medium: 1, high: 2 });
        assert_eq!(counts.total(), tasks.len());
        assert_eq!(counts.get(Priority::High), 2);
    }

    #[test]
    fn upcoming_keeps_only_future_deadlines() {
        let tasks = vec![
            task("past", Priority::Low, Some((2024, 1, 1)), false),
            task("none", Priority::Low, None, false),
            task("future", Priority::Low, Some((2024, 12, 1)), false),
        ];
        let result = upcoming(&tasks, as_of(), UpcomingPolicy::IncludeCompleted);
        let ids: Vec<_> = result.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["future"]);
    }

    #[test]
    fn deadline_equal_to_as_of_is_not_upcoming() {
        let tasks = vec![task("today", Priority::Low, Some((2024, 6, 1)), false)];
        assert!(upcoming(&tasks, as_of(), UpcomingPolicy::IncludeCompleted).is_empty());

        let just_before = as_of() - chrono::Duration::seconds(1);
        assert_eq!(
            upcoming(&tasks, just_before, UpcomingPolicy::IncludeCompleted).len(),
            1
        );
    }

    #[test]
    fn completion_policy_is_explicit() {
        let tasks = vec![
            task("done", Priority::Low, Some((2024, 12, 1)), true),
            task("open", Priority::Low, Some((2024, 12, 2)), false),
        ];
        assert_eq!(
            upcoming(&tasks, as_of(), UpcomingPolicy::IncludeCompleted).len(),
            2
        );
        let excluded = upcoming(&tasks, as_of(), UpcomingPolicy::ExcludeCompleted);
        assert_eq!(excluded.len(), 1);
        assert_eq!(excluded[0].id, "open");
    }

    #[test]
    fn summarize_bundles_all_views() {
        let tasks = vec![
            task("1", Priority::High, Some((2024, 12, 1)), false),
            task("2", Priority::Low, None, true),
        ];
        let stats = summarize(&tasks, as_of(), UpcomingPolicy::default());
        assert_eq!(stats.by_status.total, 2);
        assert_eq!(stats.by_priority.high, 1);
        assert_eq!(stats.upcoming.len(), 1);
        assert_eq!(stats.generated_at, as_of());
    }
}
