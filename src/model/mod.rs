//! Data models for sift.
//!
//! This module defines the core data structures:
//!
//! - [`DatasetContent`]: The root aggregate (goals, projects, inbox)
//! - [`Project`] / [`Goal`]: Hierarchy containers
//! - [`ProjectItem`] / [`ItemDetail`]: Polymorphic unified-stream items
//!   (task, resource, reference), discriminated by `kind`
//! - [`InboxQueue`]: FIFO capture queue with defer-to-tail
//! - [`Draft`]: Ephemeral AI-proposed placement, editable until resolved

mod dataset;
mod draft;
mod inbox;
mod item;
mod types;

pub use dataset::{
    DatasetContent, Goal, Project, ReorderDirection, SOMEDAY_PROJECT, generate_id,
};
pub use draft::{Draft, ProjectRef};
pub use inbox::{DeferOutcome, InboxQueue};
pub use item::{ItemDetail, ProjectItem, normalize_tags};
pub use types::{ClassificationType, GoalStatus, ItemKind, ProjectStatus};
