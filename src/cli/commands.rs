use clap::{Parser, Subcommand, ValueEnum};

use crate::model::{ItemKind, ReorderDirection};

#[derive(Parser)]
#[command(name = "sift")]
#[command(
    author,
    version,
    about = "A CLI-based, flat-file GTD inbox triage tool for humans and robots"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Dataset to operate on (overrides the configured default)
    #[arg(long, global = true)]
    pub dataset: Option<String>,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new sift workspace
    Init {
        /// Name of the initial dataset
        #[arg(long, default_value = "default")]
        name: String,
    },

    /// Capture a raw note into the inbox
    #[command(visible_alias = "c", visible_alias = "in")]
    Capture {
        /// The note text
        text: String,
    },

    /// Show the inbox queue in order
    Inbox {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Triage the inbox interactively, head first
    #[command(visible_alias = "t")]
    Triage {
        /// Skip the AI collaborator and assign manually
        #[arg(long)]
        manual: bool,
    },

    /// List projects in display order
    #[command(visible_alias = "ls")]
    Projects {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a project's unified item stream
    Items {
        /// Project id
        project: u32,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List goals and their projects
    Goals {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a goal
    GoalNew {
        /// Goal name
        name: String,
    },

    /// Assign a project to a goal
    GoalAssign {
        /// Project id
        project: u32,

        /// Goal id
        goal: String,
    },

    /// Add an item to a project directly, bypassing triage
    Add {
        /// Project id
        project: u32,

        /// Item name
        name: String,

        /// Kind of item
        #[arg(short = 'k', long, value_enum, default_value = "task")]
        kind: ItemKindArg,

        /// Tags to set
        #[arg(long)]
        tag: Vec<String>,

        /// Duration estimate (tasks only)
        #[arg(long)]
        duration: Option<String>,

        /// Store to buy from (resources only)
        #[arg(long)]
        store: Option<String>,

        /// Reference content or URL (references only)
        #[arg(long)]
        content: Option<String>,
    },

    /// Mark a task completed
    Done {
        /// Project id
        project: u32,

        /// Item id
        item: String,
    },

    /// Revert a completed task
    Undone {
        /// Project id
        project: u32,

        /// Item id
        item: String,
    },

    /// Toggle whether a resource is acquired
    Acquire {
        /// Project id
        project: u32,

        /// Item id
        item: String,

        /// Mark as not acquired instead
        #[arg(long)]
        undo: bool,
    },

    /// List incomplete tasks of active projects
    Next {
        /// Filter by tag
        #[arg(long)]
        tag: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggregated shopping list, grouped by store
    Shopping {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move a project up or down among its siblings
    Reorder {
        /// Project id
        project: u32,

        /// Direction to move
        #[arg(value_enum)]
        direction: DirectionArg,
    },

    /// List available datasets
    Datasets {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Make another dataset the default
    Switch {
        /// Dataset name
        name: String,
    },

    /// Rewrite the current dataset to disk
    Save,

    /// Show the current dataset and its counts
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ItemKindArg {
    Task,
    Resource,
    Reference,
}

impl From<ItemKindArg> for ItemKind {
    fn from(arg: ItemKindArg) -> Self {
        match arg {
            ItemKindArg::Task => ItemKind::Task,
            ItemKindArg::Resource => ItemKind::Resource,
            ItemKindArg::Reference => ItemKind::Reference,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DirectionArg {
    Up,
    Down,
}

impl From<DirectionArg> for ReorderDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Up => ReorderDirection::Up,
            DirectionArg::Down => ReorderDirection::Down,
        }
    }
}
