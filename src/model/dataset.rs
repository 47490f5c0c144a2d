use super::item::ProjectItem;
use super::inbox::InboxQueue;
use super::types::{GoalStatus, ProjectStatus};
use crate::error::{Result, SiftError};
use serde::{Deserialize, Serialize};

/// Name of the reserved catch-all project for incubated entries.
pub const SOMEDAY_PROJECT: &str = "Someday";

const ID_ALPHABET: [char; 36] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
    'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

/// Generate an opaque id with the given prefix, e.g. `itm-4k2p9`.
pub fn generate_id(prefix: &str) -> String {
    let suffix = nanoid::format(nanoid::rngs::default, &ID_ALPHABET, 5);
    format!("{}{}", prefix, suffix)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub status: GoalStatus,
}

impl Goal {
    pub fn new(name: String) -> Self {
        Self {
            id: generate_id("goal-"),
            name,
            status: GoalStatus::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u32,
    pub name: String,

    #[serde(default)]
    pub status: ProjectStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,

    #[serde(default)]
    pub sort_order: u32,

    /// Domain-default tags offered whenever this project is the
    /// classification target.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ProjectItem>,
}

impl Project {
    pub fn new(id: u32, name: String) -> Self {
        Self {
            id,
            name,
            status: ProjectStatus::default(),
            goal_id: None,
            sort_order: id,
            tags: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Append to the unified stream. Items are append-only in creation
    /// order; there is no item-level reorder.
    pub fn append_item(&mut self, item: ProjectItem) {
        self.items.push(item);
    }

    pub fn find_item(&self, item_id: &str) -> Option<&ProjectItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn find_item_mut(&mut self, item_id: &str) -> Option<&mut ProjectItem> {
        self.items.iter_mut().find(|i| i.id == item_id)
    }
}

/// Direction for a pairwise project reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

/// The root aggregate: everything one dataset holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetContent {
    #[serde(default)]
    pub goals: Vec<Goal>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub inbox: InboxQueue,
}

impl DatasetContent {
    pub fn find_project(&self, id: u32) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn find_project_mut(&mut self, id: u32) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn find_project_by_name(&self, name: &str) -> Option<&Project> {
        self.projects
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn find_goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    pub fn next_project_id(&self) -> u32 {
        self.projects.iter().map(|p| p.id).max().unwrap_or(0) + 1
    }

    /// Look up a project by name, creating it if absent.
    ///
    /// Lookup-then-create runs as one step under the single-writer model,
    /// so two applies racing for the same not-yet-existing name resolve
    /// against a single project.
    pub fn ensure_project(&mut self, name: &str) -> Result<u32> {
        if name.trim().is_empty() {
            return Err(SiftError::Validation(
                "Project name cannot be empty".to_string(),
            ));
        }
        if let Some(project) = self.find_project_by_name(name) {
            return Ok(project.id);
        }
        let id = self.next_project_id();
        self.projects.push(Project::new(id, name.to_string()));
        Ok(id)
    }

    /// The reserved incubation bucket, created lazily on first use.
    pub fn ensure_someday_project(&mut self) -> Result<u32> {
        self.ensure_project(SOMEDAY_PROJECT)
    }

    /// Projects in display order (by `sort_order`, id as tiebreaker).
    pub fn projects_sorted(&self) -> Vec<&Project> {
        let mut sorted: Vec<&Project> = self.projects.iter().collect();
        sorted.sort_by_key(|p| (p.sort_order, p.id));
        sorted
    }

    /// Swap a project's `sort_order` with its display neighbor.
    ///
    /// Orders are only ever exchanged pairwise, never recomputed globally.
    pub fn reorder_project(&mut self, id: u32, direction: ReorderDirection) -> Result<()> {
        let order: Vec<u32> = self.projects_sorted().iter().map(|p| p.id).collect();
        let pos = order
            .iter()
            .position(|&pid| pid == id)
            .ok_or_else(|| SiftError::NotFound(format!("project {}", id)))?;

        let neighbor_pos = match direction {
            ReorderDirection::Up if pos > 0 => pos - 1,
            ReorderDirection::Down if pos + 1 < order.len() => pos + 1,
            // Already at the edge
            _ => return Ok(()),
        };
        let neighbor_id = order[neighbor_pos];

        let a = self.find_project(id).expect("position found above").sort_order;
        let b = self
            .find_project(neighbor_id)
            .expect("neighbor from sorted list")
            .sort_order;
        self.find_project_mut(id).expect("checked").sort_order = b;
        self.find_project_mut(neighbor_id).expect("checked").sort_order = a;
        Ok(())
    }
}
