//! Authoritative in-memory task collection.
//!
//! A [`TaskStore`] is constructed once per session, initialized from its
//! [`Slot`], and then owns every mutation. Each successful mutation writes
//! the full collection back to the slot. A failed write is logged and does
//! not fail the operation; the in-memory collection stays authoritative.
//!
//! Invariants kept here:
//! - ids are unique and assigned by the store
//! - `created_at <= updated_at`, and `updated_at` strictly advances on
//!   every mutation (completion toggles included)
//! - titles are non-empty after trimming
//! - insertion order is never changed

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::filter::{self, FilterCriteria};
use crate::stats::{self, PriorityCounts, StatusCounts, TaskStats, UpcomingPolicy};
use crate::storage::Slot;
use crate::task::{check_deadline, normalize_title, Task, TaskDraft, TaskPatch};

#[derive(Debug)]
pub struct TaskStore<S: Slot> {
    slot: S,
    tasks: Vec<Task>,
    ready: bool,
    upcoming_policy: UpcomingPolicy,
    last_save_ok: bool,
}

impl<S: Slot> TaskStore<S> {
    /// New store over `slot`. Nothing is loaded until [`initialize`](Self::initialize).
    pub fn new(slot: S) -> Self {
        Self {
            slot,
            tasks: Vec::new(),
            ready: false,
            upcoming_policy: UpcomingPolicy::default(),
            last_save_ok: true,
        }
    }

    /// Construct and initialize in one step.
    pub fn open(slot: S) -> Result<Self> {
        let mut store = Self::new(slot);
        store.initialize()?;
        Ok(store)
    }

    pub fn with_upcoming_policy(mut self, policy: UpcomingPolicy) -> Self {
        self.upcoming_policy = policy;
        self
    }

    /// Load the collection from the slot. Runs once; mutations are
    /// rejected until it has.
    pub fn initialize(&mut self) -> Result<()> {
        if self.ready {
            return Err(Error::AlreadyInitialized);
        }
        let tasks = self.slot.load();
        self.initialize_with(tasks)
    }

    /// Initialize from a collection the caller already read from the slot,
    /// so the slot is read exactly once.
    pub fn initialize_with(&mut self, tasks: Vec<Task>) -> Result<()> {
        if self.ready {
            return Err(Error::AlreadyInitialized);
        }
        self.tasks = tasks;
        self.ready = true;
        debug!(count = self.tasks.len(), "task store initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.ready
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn upcoming_policy(&self) -> UpcomingPolicy {
        self.upcoming_policy
    }

    /// Whether the most recent write reached the slot.
    pub fn last_save_ok(&self) -> bool {
        self.last_save_ok
    }

    pub fn create(&mut self, draft: TaskDraft) -> Result<Task> {
        self.ensure_ready()?;
        let title = normalize_title(&draft.title)?;
        let category = draft.category.normalized()?;
        let deadline = draft.deadline.map(check_deadline).transpose()?;
        let now = Utc::now();
        let task = Task {
            id: self.generate_id(),
            title,
            description: draft.description,
            category,
            priority: draft.priority,
            deadline,
            is_completed: draft.is_completed,
            created_at: now,
            updated_at: now,
        };
        self.tasks.push(task.clone());
        debug!(id = %task.id, "task created");
        self.persist();
        Ok(task)
    }

    /// Merge the set fields of `patch` into task `id`.
    pub fn update(&mut self, id: &str, patch: TaskPatch) -> Result<Task> {
        self.ensure_ready()?;
        let patch = patch.normalized()?;
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        patch.apply(task);
        task.updated_at = next_timestamp(task.updated_at);
        let updated = task.clone();
        debug!(id = %updated.id, "task updated");
        self.persist();
        Ok(updated)
    }

    /// Form submit: create when no id is being edited, otherwise replace the
    /// editable fields of that task.
    pub fn submit(&mut self, editing: Option<&str>, draft: TaskDraft) -> Result<Task> {
        match editing {
            Some(id) => self.update(id, TaskPatch::from(draft)),
            None => self.create(draft),
        }
    }

    pub fn toggle_completion(&mut self, id: &str) -> Result<Task> {
        self.ensure_ready()?;
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.is_completed = !task.is_completed;
        task.updated_at = next_timestamp(task.updated_at);
        let toggled = task.clone();
        debug!(id = %toggled.id, completed = toggled.is_completed, "task toggled");
        self.persist();
        Ok(toggled)
    }

    /// Remove task `id`, returning it.
    pub fn remove(&mut self, id: &str) -> Result<Task> {
        self.ensure_ready()?;
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        debug!(id = %removed.id, "task removed");
        self.persist();
        Ok(removed)
    }

    /// Snapshot of the collection in insertion order.
    pub fn list(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Resolve a full id or a unique, case-insensitive id prefix.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument("task id cannot be empty".to_string()));
        }
        if let Some(task) = self.get(trimmed) {
            return Ok(task.id.clone());
        }

        let needle = trimmed.to_ascii_lowercase();
        let matches: Vec<&str> = self
            .tasks
            .iter()
            .filter(|task| task.id.to_ascii_lowercase().starts_with(&needle))
            .map(|task| task.id.as_str())
            .collect();

        match matches.as_slice() {
            [] => Err(Error::TaskNotFound(trimmed.to_string())),
            [single] => Ok(single.to_string()),
            many => Err(Error::InvalidArgument(format!(
                "ambiguous task id '{}': {}",
                trimmed,
                many.join(", ")
            ))),
        }
    }

    pub fn filter(&self, criteria: &FilterCriteria) -> Vec<Task> {
        filter::filter(&self.tasks, criteria)
    }

    pub fn count_by_status(&self) -> StatusCounts {
        stats::count_by_status(&self.tasks)
    }

    pub fn count_by_priority(&self) -> PriorityCounts {
        stats::count_by_priority(&self.tasks)
    }

    pub fn upcoming(&self, as_of: DateTime<Utc>) -> Vec<Task> {
        stats::upcoming(&self.tasks, as_of, self.upcoming_policy)
    }

    pub fn stats(&self, as_of: DateTime<Utc>) -> TaskStats {
        stats::summarize(&self.tasks, as_of, self.upcoming_policy)
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    fn generate_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist(&mut self) {
        self.last_save_ok = self.slot.save(&self.tasks);
    }
}

/// Current time, nudged forward when the clock has not moved past
/// `previous` so `updated_at` is strictly increasing.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
