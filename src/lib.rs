//! taskdesk - personal task manager library
//!
//! The core is a [`TaskStore`](store::TaskStore) that owns the task
//! collection, enforces its invariants and writes it back to a durable
//! [`Slot`](storage::Slot) after every mutation. Filtered views and
//! aggregate statistics are pure functions over the collection.
//!
//! # Module Organization
//!
//! - `task`: the task entity, drafts, patches, category and priority
//! - `storage`: durable slots (JSON file, in-memory)
//! - `lock`: file locking and atomic writes for the file slot
//! - `store`: the task store
//! - `filter`: status/category/priority filtering
//! - `stats`: counts by status and priority, upcoming deadlines
//! - `config`: `config.toml` loading
//! - `error`: error types and result alias
//! - `output`: CLI output envelopes
//! - `cli`: command-line interface using clap

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod lock;
pub mod output;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;

pub use error::{Error, Result};
pub use filter::{FilterCriteria, StatusFilter};
pub use stats::UpcomingPolicy;
pub use storage::{FileSlot, MemorySlot, Slot};
pub use store::TaskStore;
pub use task::{Category, Priority, Task, TaskDraft, TaskPatch};
