//! Task entity for taskdesk.
//!
//! A task is a plain record. Identity and timestamps are assigned by the
//! [`TaskStore`](crate::store::TaskStore); callers only ever hand in a
//! [`TaskDraft`] or a [`TaskPatch`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Deadline years that serialize as a four-digit RFC 3339 year.
const DEADLINE_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const KNOWN_CATEGORIES: [&str; 6] = [
    "work",
    "study",
    "personal",
    "health",
    "finances",
    "entertainment",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    #[serde(default, with = "deadline_format")]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// The field set a caller would edit, without identity or timestamps.
    pub fn draft(&self) -> TaskDraft {
        TaskDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            priority: self.priority,
            deadline: self.deadline,
            is_completed: self.is_completed,
        }
    }

    /// Deadline as an instant: midnight UTC of the deadline date.
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        self.deadline.map(start_of_day)
    }
}

/// Task fields supplied by the caller on create (and on a full-form update).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub deadline: Option<NaiveDate>,
    pub is_completed: bool,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<NaiveDate>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn completed(mut self, is_completed: bool) -> Self {
        self.is_completed = is_completed;
        self
    }
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            category: Category::default(),
            priority: Priority::default(),
            deadline: None,
            is_completed: false,
        }
    }
}

/// Partial update. `None` leaves the field untouched; for `deadline`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub deadline: Option<Option<NaiveDate>>,
    pub is_completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
            && self.is_completed.is_none()
    }

    /// Check every set field, putting the category into its canonical form.
    pub(crate) fn normalized(mut self) -> Result<Self> {
        if let Some(title) = &self.title {
            normalize_title(title)?;
        }
        self.category = self.category.as_ref().map(Category::normalized).transpose()?;
        if let Some(Some(deadline)) = self.deadline {
            check_deadline(deadline)?;
        }
        Ok(self)
    }

    pub(crate) fn apply(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(is_completed) = self.is_completed {
            task.is_completed = is_completed;
        }
    }
}

impl From<TaskDraft> for TaskPatch {
    fn from(draft: TaskDraft) -> Self {
        Self {
            title: Some(draft.title),
            description: Some(draft.description),
            category: Some(draft.category),
            priority: Some(draft.priority),
            deadline: Some(draft.deadline),
            is_completed: Some(draft.is_completed),
        }
    }
}

/// Trim a title and reject it when nothing is left.
pub fn normalize_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("title cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        Priority::ALL
            .into_iter()
            .find(|priority| priority.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "invalid priority '{trimmed}' (expected low|medium|high)"
                ))
            })
    }
}

/// Task category. The six built-in values plus free-form extensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    Work,
    Study,
    #[default]
    Personal,
    Health,
    Finances,
    Entertainment,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Work => "work",
            Category::Study => "study",
            Category::Personal => "personal",
            Category::Health => "health",
            Category::Finances => "finances",
            Category::Entertainment => "entertainment",
            Category::Other(value) => value,
        }
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Category::Other(_))
    }

    pub fn builtin_names() -> &'static [&'static str] {
        &KNOWN_CATEGORIES
    }

    /// The category as it reads back from storage: `Other("Work")` becomes
    /// `Work`, surrounding whitespace is dropped and blank text is rejected.
    pub fn normalized(&self) -> Result<Category> {
        self.as_str().parse()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("category cannot be empty".to_string()));
        }
        let category = match trimmed.to_ascii_lowercase().as_str() {
            "work" => Category::Work,
            "study" => Category::Study,
            "personal" => Category::Personal,
            "health" => Category::Health,
            "finances" => Category::Finances,
            "entertainment" => Category::Entertainment,
            _ => Category::Other(trimmed.to_string()),
        };
        Ok(category)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(value) => value,
            other => other.as_str().to_string(),
        }
    }
}

/// Parse a `YYYY-MM-DD` deadline argument.
pub fn parse_deadline(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|err| {
        Error::Validation(format!(
            "invalid deadline '{trimmed}' (expected YYYY-MM-DD): {err}"
        ))
    })?;
    check_deadline(date)
}

/// Reject deadlines whose year cannot be stored and read back.
pub fn check_deadline(date: NaiveDate) -> Result<NaiveDate> {
    if DEADLINE_YEARS.contains(&date.year()) {
        Ok(date)
    } else {
        Err(Error::Validation(format!(
            "deadline {date} is out of range (years {}-{})",
            DEADLINE_YEARS.start(),
            DEADLINE_YEARS.end()
        )))
    }
}

pub(crate) fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Deadlines are calendar dates written as midnight-UTC date-times, the
/// same shape a browser `Date` takes when serialized. Reads accept either
/// a full RFC 3339 timestamp or a bare date.
mod deadline_format {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::start_of_day;

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(
                &start_of_day(*date).to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(parsed.with_timezone(&Utc).date_naive()));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|err| de::Error::custom(format!("invalid deadline '{raw}': {err}")))
    }
}
