use crate::error::{Result, SiftError};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Someday,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalStatus::Active => write!(f, "active"),
            GoalStatus::Someday => write!(f, "someday"),
        }
    }
}

impl FromStr for GoalStatus {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(GoalStatus::Active),
            "someday" => Ok(GoalStatus::Someday),
            _ => Err(SiftError::Validation(format!("Invalid goal status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Active,
    OnHold,
    Completed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Active => write!(f, "active"),
            ProjectStatus::OnHold => write!(f, "on-hold"),
            ProjectStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for ProjectStatus {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProjectStatus::Active),
            "on-hold" | "onhold" | "on_hold" => Ok(ProjectStatus::OnHold),
            "completed" | "done" => Ok(ProjectStatus::Completed),
            _ => Err(SiftError::Validation(format!(
                "Invalid project status: {}",
                s
            ))),
        }
    }
}

/// Discriminator for the three item variants in a project's unified stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Resource,
    Reference,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Task => write!(f, "task"),
            ItemKind::Resource => write!(f, "resource"),
            ItemKind::Reference => write!(f, "reference"),
        }
    }
}

impl FromStr for ItemKind {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "task" => Ok(ItemKind::Task),
            "resource" => Ok(ItemKind::Resource),
            "reference" | "ref" => Ok(ItemKind::Reference),
            _ => Err(SiftError::Validation(format!("Invalid item kind: {}", s))),
        }
    }
}

/// Outcome category proposed by the classifier for one inbox entry.
///
/// Deliberately has no destructive variant. Trashing an entry is a
/// user-only action and must never arrive over the classification wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationType {
    Task,
    Resource,
    Reference,
    NewProject,
    Incubate,
}

impl fmt::Display for ClassificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationType::Task => write!(f, "task"),
            ClassificationType::Resource => write!(f, "resource"),
            ClassificationType::Reference => write!(f, "reference"),
            ClassificationType::NewProject => write!(f, "new-project"),
            ClassificationType::Incubate => write!(f, "incubate"),
        }
    }
}

impl FromStr for ClassificationType {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "task" => Ok(ClassificationType::Task),
            "resource" | "to-buy" | "buy" => Ok(ClassificationType::Resource),
            "reference" | "ref" => Ok(ClassificationType::Reference),
            "new-project" | "newproject" | "new_project" | "project" => {
                Ok(ClassificationType::NewProject)
            }
            "incubate" | "someday" => Ok(ClassificationType::Incubate),
            "trash" | "delete" | "discard" => Err(SiftError::Classification(format!(
                "Destructive classification '{}' is not permitted",
                s
            ))),
            _ => Err(SiftError::Classification(format!(
                "Invalid classification type: {}",
                s
            ))),
        }
    }
}
