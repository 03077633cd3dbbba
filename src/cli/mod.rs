//! Command-line interface for taskdesk
//!
//! This module defines the CLI structure using clap derive macros.
//! Command implementations live in [`task`].

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod task;

/// taskdesk - personal task manager
///
/// Create, edit, complete, delete and filter tasks, and view statistics.
/// Tasks are kept in a JSON slot inside the data directory.
#[derive(Parser, Debug)]
#[command(name = "taskdesk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding the task slot and config.toml
    #[arg(long, global = true, env = "TASKDESK_DIR")]
    pub dir: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long)]
        description: Option<String>,

        /// Category: work, study, personal, health, finances, entertainment, or any text
        #[arg(short, long)]
        category: Option<String>,

        /// Priority: low, medium, high
        #[arg(short, long)]
        priority: Option<String>,

        /// Deadline date (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Create the task already completed
        #[arg(long)]
        done: bool,
    },

    /// Edit fields of a task
    Edit {
        /// Task ID (or unique prefix)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New deadline date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "clear_deadline")]
        deadline: Option<String>,

        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },

    /// Flip a task between completed and not completed
    Toggle {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// List tasks, optionally filtered
    List {
        /// Status: all, completed, notCompleted
        #[arg(long, default_value = "all")]
        status: String,

        /// Category filter, or "all"
        #[arg(long, default_value = "all")]
        category: String,

        /// Priority filter, or "all"
        #[arg(long, default_value = "all")]
        priority: String,
    },

    /// Show one task
    Show {
        /// Task ID (or unique prefix)
        id: String,
    },

    /// Counts by status and priority plus upcoming deadlines
    Stats {
        /// Reference time (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        as_of: Option<String>,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let output = task::CommonOptions {
            dir: self.dir,
            json: self.json,
            quiet: self.quiet,
        };
        match self.command {
            Commands::Add {
                title,
                description,
                category,
                priority,
                deadline,
                done,
            } => task::run_add(
                task::AddOptions {
                    title,
                    description,
                    category,
                    priority,
                    deadline,
                    done,
                },
                output,
            ),
            Commands::Edit {
                id,
                title,
                description,
                category,
                priority,
                deadline,
                clear_deadline,
            } => task::run_edit(
                task::EditOptions {
                    id,
                    title,
                    description,
                    category,
                    priority,
                    deadline,
                    clear_deadline,
                },
                output,
            ),
            Commands::Toggle { id } => task::run_toggle(id, output),
            Commands::Rm { id } => task::run_rm(id, output),
            Commands::List {
                status,
                category,
                priority,
            } => task::run_list(
                task::ListOptions {
                    status,
                    category,
                    priority,
                },
                output,
            ),
            Commands::Show { id } => task::run_show(id, output),
            Commands::Stats { as_of } => task::run_stats(as_of, output),
        }
    }
}
