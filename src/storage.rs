//! Durable slot for the task collection
//!
//! The whole collection lives in one named slot and every save is a full
//! overwrite. On disk a slot is a single JSON array:
//!
//! ```text
//! <data dir>/
//!   config.toml        # optional settings
//!   tasks.json         # slot "tasks": [Task, ...]
//!   tasks.json.lock    # advisory lock sidecar
//! ```
//!
//! Reads and writes are best effort from the store's point of view:
//! [`Slot::load`] turns a missing or unreadable slot into an empty
//! collection and [`Slot::save`] logs and swallows write failures. The
//! fallible forms are available as [`Slot::try_load`] / [`Slot::try_save`].

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::Task;

/// Default slot name, the key the collection has always been stored under
pub const DEFAULT_SLOT: &str = "tasks";

const SLOT_EXTENSION: &str = "json";

/// A durable key-value slot holding the serialized task collection.
pub trait Slot {
    /// Read the slot. `Ok(None)` when nothing has been saved yet.
    fn try_load(&self) -> Result<Option<Vec<Task>>>;

    /// Overwrite the slot with `tasks`.
    fn try_save(&self, tasks: &[Task]) -> Result<()>;

    /// Read the slot, treating absence and corruption as "no data".
    fn load(&self) -> Vec<Task> {
        match self.try_load() {
            Ok(Some(tasks)) => {
                debug!(count = tasks.len(), "loaded tasks from slot");
                tasks
            }
            Ok(None) => {
                debug!("slot is empty");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "task slot unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Best-effort overwrite. Returns whether the write landed.
    fn save(&self, tasks: &[Task]) -> bool {
        match self.try_save(tasks) {
            Ok(()) => {
                debug!(count = tasks.len(), "saved tasks to slot");
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to persist tasks");
                false
            }
        }
    }
}

fn encode(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string_pretty(tasks)?)
}

fn decode(raw: &str) -> Result<Option<Vec<Task>>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let tasks: Vec<Task> = serde_json::from_str(raw)?;
    Ok(Some(tasks))
}

/// Check a slot name is usable as a file stem.
pub fn validate_slot_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidConfig("storage.slot cannot be empty".to_string()));
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(Error::InvalidConfig(format!(
            "storage.slot '{trimmed}' must contain only letters, digits, '-' or '_'"
        )));
    }
    Ok(())
}

/// Slot stored as `<dir>/<name>.json`.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl FileSlot {
    pub fn new(dir: impl AsRef<Path>, name: &str) -> Result<Self> {
        validate_slot_name(name)?;
        let path = dir
            .as_ref()
            .join(format!("{}.{SLOT_EXTENSION}", name.trim()));
        Ok(Self {
            path,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        })
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the slot file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn try_load(&self) -> Result<Option<Vec<Task>>> {
        match lock::read_locked_str(&self.path, self.lock_timeout_ms)? {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    fn try_save(&self, tasks: &[Task]) -> Result<()> {
        let json = encode(tasks)?;
        lock::write_atomic_locked(&self.path, json.as_bytes(), self.lock_timeout_ms)
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    raw: Option<String>,
    unavailable: bool,
    writes: usize,
}

/// In-process slot. Clones share the same underlying cell, so a test can
/// keep a handle while the store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| Error::OperationFailed("memory slot poisoned".to_string()))
    }

    /// Raw serialized contents, as a reader of the medium would see them
    pub fn raw(&self) -> Option<String> {
        self.state().ok().and_then(|state| state.raw.clone())
    }

    /// Replace the stored contents with arbitrary text
    pub fn set_raw(&self, raw: impl Into<String>) {
        if let Ok(mut state) = self.state() {
            state.raw = Some(raw.into());
        }
    }

    /// Make every subsequent write fail, like a full storage quota
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state() {
            state.unavailable = unavailable;
        }
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.state().map(|state| state.writes).unwrap_or(0)
    }
}

impl Slot for MemorySlot {
    fn try_load(&self) -> Result<Option<Vec<Task>>> {
        let raw = self.state()?.raw.clone();
        match raw {
            Some(raw) => decode(&raw),
            None => Ok(None),
        }
    }

    fn try_save(&self, tasks: &[Task]) -> Result<()> {
        let json = encode(tasks)?;
        let mut state = self.state()?;
        if state.unavailable {
            return Err(Error::OperationFailed(
                "storage medium unavailable".to_string(),
            ));
        }
        state.raw = Some(json);
        state.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Priority};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::fs;
    use tempfile::TempDir;

    fn task(id: &str, title: &str) -> Task {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: "details".to_string(),
            category: Category::Work,
            priority: Priority::High,
            deadline: NaiveDate::from_ymd_opt(2024, 12, 1),
            is_completed: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn file_slot_path_uses_slot_name() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path(), "tasks").unwrap();
        assert_eq!(slot.path(), temp_dir.path().join("tasks.json"));
    }

    #[test]
    fn slot_name_rejects_path_separators() {
        let temp_dir = TempDir::new().unwrap();
        assert!(FileSlot::new(temp_dir.path(), "../escape").is_err());
        assert!(FileSlot::new(temp_dir.path(), "  ").is_err());
        assert!(FileSlot::new(temp_dir.path(), "work_2024").is_ok());
    }

    #[test]
    fn file_slot_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path(), DEFAULT_SLOT).unwrap();
        let tasks = vec![task("a", "First"), task("b", "Second")];

        slot.try_save(&tasks).unwrap();
        let loaded = slot.try_load().unwrap().unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn missing_slot_loads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path(), DEFAULT_SLOT).unwrap();
        assert!(slot.try_load().unwrap().is_none());
        assert!(slot.load().is_empty());
    }

    #[test]
    fn corrupt_slot_loads_empty_but_try_load_errors() {
        let temp_dir = TempDir::new().unwrap();
        let slot = FileSlot::new(temp_dir.path(), DEFAULT_SLOT).unwrap();
        fs::write(slot.path(), "{not json").unwrap();

        assert!(matches!(slot.try_load(), Err(Error::Json(_))));
        assert!(slot.load().is_empty());
    }

    #[test]
    fn memory_slot_write_failure_is_swallowed() {
        let slot = MemorySlot::new();
        assert!(slot.save(&[task("a", "First")]));
        slot.set_unavailable(true);
        assert!(!slot.save(&[task("a", "First"), task("b", "Second")]));

        let loaded = slot.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(slot.writes(), 1);
    }

    #[test]
    fn memory_slot_clones_share_state() {
        let slot = MemorySlot::new();
        let handle = slot.clone();
        slot.save(&[task("a", "First")]);
        assert_eq!(handle.load().len(), 1);

        handle.set_raw("garbage");
        assert!(slot.load().is_empty());
    }
}
