//! taskdesk command implementations.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{resolve_data_dir, Config};
use crate::error::{Error, Result};
use crate::filter::FilterCriteria;
use crate::output::{emit_success, task_line, HumanOutput, OutputOptions};
use crate::stats::TaskStats;
use crate::storage::{FileSlot, Slot};
use crate::store::TaskStore;
use crate::task::{parse_deadline, start_of_day, Task, TaskDraft, TaskPatch};

pub struct CommonOptions {
    pub dir: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

impl CommonOptions {
    fn output(&self) -> OutputOptions {
        OutputOptions {
            json: self.json,
            quiet: self.quiet,
        }
    }
}

pub struct AddOptions {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub done: bool,
}

pub struct EditOptions {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
    pub clear_deadline: bool,
}

pub struct ListOptions {
    pub status: String,
    pub category: String,
    pub priority: String,
}

#[derive(Serialize)]
struct TaskOutput {
    task: Task,
}

#[derive(Serialize)]
struct TaskListOutput {
    total: usize,
    criteria: FilterCriteria,
    tasks: Vec<Task>,
}

struct TaskContext {
    store: TaskStore<FileSlot>,
    config: Config,
    warnings: Vec<String>,
}

impl TaskContext {
    /// Warnings collected while loading plus one for a failed write.
    fn finish_warnings(&self, human: &mut HumanOutput) {
        for warning in &self.warnings {
            human.push_warning(warning.clone());
        }
        if !self.store.last_save_ok() {
            human.push_warning(format!(
                "change applied but not saved to {}",
                self.store.slot().path().display()
            ));
        }
    }
}

pub fn run_add(options: AddOptions, common: CommonOptions) -> Result<()> {
    let mut ctx = load_context(common.dir.clone())?;

    let category = match options.category.as_deref() {
        Some(value) => value.parse()?,
        None => ctx.config.default_category()?,
    };
    let priority = match options.priority.as_deref() {
        Some(value) => value.parse()?,
        None => ctx.config.default_priority()?,
    };
    let deadline = options.deadline.as_deref().map(parse_deadline).transpose()?;

    let draft = TaskDraft::new(options.title)
        .with_description(options.description.unwrap_or_default())
        .with_category(category)
        .with_priority(priority)
        .with_deadline(deadline)
        .completed(options.done);
    let task = ctx.store.submit(None, draft)?;

    let mut human = HumanOutput::new("Task created");
    push_task_summary(&mut human, &task);
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "add", &TaskOutput { task }, Some(&human))
}

pub fn run_edit(options: EditOptions, common: CommonOptions) -> Result<()> {
    let mut ctx = load_context(common.dir.clone())?;
    let id = ctx.store.resolve_id(&options.id)?;

    let deadline = if options.clear_deadline {
        Some(None)
    } else {
        options
            .deadline
            .as_deref()
            .map(parse_deadline)
            .transpose()?
            .map(Some)
    };
    let patch = TaskPatch {
        title: options.title,
        description: options.description,
        category: options.category.as_deref().map(str::parse).transpose()?,
        priority: options.priority.as_deref().map(str::parse).transpose()?,
        deadline,
        is_completed: None,
    };
    if patch.is_empty() {
        return Err(Error::InvalidArgument(
            "nothing to change; pass at least one field".to_string(),
        ));
    }

    let task = ctx.store.update(&id, patch)?;

    let mut human = HumanOutput::new("Task updated");
    push_task_summary(&mut human, &task);
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "edit", &TaskOutput { task }, Some(&human))
}

pub fn run_toggle(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = load_context(common.dir.clone())?;
    let id = ctx.store.resolve_id(&id)?;
    let task = ctx.store.toggle_completion(&id)?;

    let header = if task.is_completed {
        "Task completed"
    } else {
        "Task reopened"
    };
    let mut human = HumanOutput::new(header);
    push_task_summary(&mut human, &task);
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "toggle", &TaskOutput { task }, Some(&human))
}

pub fn run_rm(id: String, common: CommonOptions) -> Result<()> {
    let mut ctx = load_context(common.dir.clone())?;
    let id = ctx.store.resolve_id(&id)?;
    let task = ctx.store.remove(&id)?;

    let mut human = HumanOutput::new("Task deleted");
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "rm", &TaskOutput { task }, Some(&human))
}

pub fn run_list(options: ListOptions, common: CommonOptions) -> Result<()> {
    let ctx = load_context(common.dir.clone())?;
    let criteria = FilterCriteria::parse(
        Some(&options.status),
        Some(&options.category),
        Some(&options.priority),
    )?;
    let tasks = ctx.store.filter(&criteria);

    let mut human = HumanOutput::new("Tasks");
    human.push_summary("Total", tasks.len().to_string());
    if !criteria.is_unfiltered() {
        human.push_summary("Status", criteria.status.to_string());
        if let Some(category) = &criteria.category {
            human.push_summary("Category", category.to_string());
        }
        if let Some(priority) = criteria.priority {
            human.push_summary("Priority", priority.to_string());
        }
    }
    if tasks.is_empty() {
        human.push_detail("No tasks found");
    }
    for task in &tasks {
        human.push_detail(task_line(task));
    }
    ctx.finish_warnings(&mut human);

    let output = TaskListOutput {
        total: tasks.len(),
        criteria,
        tasks,
    };
    emit_success(common.output(), "list", &output, Some(&human))
}

pub fn run_show(id: String, common: CommonOptions) -> Result<()> {
    let ctx = load_context(common.dir.clone())?;
    let id = ctx.store.resolve_id(&id)?;
    let task = ctx
        .store
        .get(&id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;

    let mut human = HumanOutput::new(task.title.clone());
    push_task_summary(&mut human, &task);
    if !task.description.is_empty() {
        human.push_detail(task.description.clone());
    }
    human.push_summary("Created", task.created_at.to_rfc3339());
    human.push_summary("Updated", task.updated_at.to_rfc3339());
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "show", &TaskOutput { task }, Some(&human))
}

pub fn run_stats(as_of: Option<String>, common: CommonOptions) -> Result<()> {
    let ctx = load_context(common.dir.clone())?;
    let as_of = parse_as_of(as_of.as_deref())?.unwrap_or_else(Utc::now);
    let stats: TaskStats = ctx.store.stats(as_of);

    let mut human = HumanOutput::new("Task stats");
    human.push_summary("Total", stats.by_status.total.to_string());
    human.push_summary("Completed", stats.by_status.completed.to_string());
    human.push_summary("Incomplete", stats.by_status.incomplete.to_string());
    human.push_summary(
        "Priority",
        format!(
            "low {}, medium {}, high {}",
            stats.by_priority.low, stats.by_priority.medium, stats.by_priority.high
        ),
    );
    human.push_summary("Upcoming", stats.upcoming.len().to_string());
    for task in &stats.upcoming {
        human.push_detail(task_line(task));
    }
    ctx.finish_warnings(&mut human);

    emit_success(common.output(), "stats", &stats, Some(&human))
}

fn push_task_summary(human: &mut HumanOutput, task: &Task) {
    human.push_summary("ID", task.id.clone());
    human.push_summary("Title", task.title.clone());
    human.push_summary("Category", task.category.to_string());
    human.push_summary("Priority", task.priority.to_string());
    human.push_summary(
        "Deadline",
        task.deadline
            .map(|date| date.to_string())
            .unwrap_or_else(|| "none".to_string()),
    );
    human.push_summary(
        "Completed",
        if task.is_completed { "yes" } else { "no" },
    );
}

fn load_context(dir: Option<PathBuf>) -> Result<TaskContext> {
    let dir = resolve_data_dir(dir);
    let config = Config::load_from_dir(&dir)?;
    let slot = FileSlot::new(&dir, &config.storage.slot)?
        .with_lock_timeout(config.storage.lock_timeout_ms);

    // A held lock must not be mistaken for an empty slot, or the next save
    // would overwrite another process's tasks.
    let mut warnings = Vec::new();
    let tasks = match slot.try_load() {
        Ok(tasks) => tasks.unwrap_or_default(),
        Err(err @ Error::LockFailed(_)) => return Err(err),
        Err(err) => {
            warnings.push(format!(
                "{} is unreadable ({err}); starting with no tasks",
                slot.path().display()
            ));
            Vec::new()
        }
    };

    let mut store = TaskStore::new(slot).with_upcoming_policy(config.upcoming_policy());
    store.initialize_with(tasks)?;

    Ok(TaskContext {
        store,
        config,
        warnings,
    })
}

fn parse_as_of(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value.trim()) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    let date = parse_deadline(value).map_err(|_| {
        Error::InvalidArgument(format!(
            "invalid as-of '{value}' (expected RFC 3339 timestamp or YYYY-MM-DD)"
        ))
    })?;
    Ok(Some(start_of_day(date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parse_as_of_accepts_timestamp_and_date() {
        let ts = parse_as_of(Some("2024-06-01T12:00:00+02:00")).unwrap().unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());

        let date = parse_as_of(Some("2024-06-01")).unwrap().unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());

        assert!(parse_as_of(None).unwrap().is_none());
        assert!(matches!(
            parse_as_of(Some("soon")),
            Err(Error::InvalidArgument(_))
        ));
    }
}
