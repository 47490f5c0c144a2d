use super::types::ItemKind;
use crate::error::{Result, SiftError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lowercase, trim and deduplicate a tag set, preserving first-seen order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let normalized = tag.as_ref().trim().to_lowercase();
        if !normalized.is_empty() && !out.contains(&normalized) {
            out.push(normalized);
        }
    }
    out
}

/// Kind-specific payload of a [`ProjectItem`].
///
/// The `kind` field on the wire is the discriminator; every consumer
/// matches exhaustively so a new variant cannot silently fall through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ItemDetail {
    Task {
        #[serde(default)]
        is_completed: bool,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration: Option<String>,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed_at: Option<DateTime<Utc>>,
    },
    Resource {
        #[serde(default)]
        is_acquired: bool,

        #[serde(default = "default_store")]
        store: String,

        #[serde(default, skip_serializing_if = "Option::is_none")]
        cost_estimate: Option<f64>,
    },
    Reference {
        #[serde(default)]
        content: String,
    },
}

fn default_store() -> String {
    "General".to_string()
}

impl ItemDetail {
    pub fn task(duration: Option<String>) -> Self {
        ItemDetail::Task {
            is_completed: false,
            duration,
            completed_at: None,
        }
    }

    pub fn resource() -> Self {
        ItemDetail::Resource {
            is_acquired: false,
            store: default_store(),
            cost_estimate: None,
        }
    }

    pub fn reference(content: String) -> Self {
        ItemDetail::Reference { content }
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            ItemDetail::Task { .. } => ItemKind::Task,
            ItemDetail::Resource { .. } => ItemKind::Resource,
            ItemDetail::Reference { .. } => ItemKind::Reference,
        }
    }
}

/// One entry in a project's unified stream.
///
/// Items of all three kinds share common fields and live in a single
/// append-only sequence per project, ordered by creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,

    #[serde(flatten)]
    pub detail: ItemDetail,
}

impl ProjectItem {
    pub fn new(id: String, name: String, detail: ItemDetail) -> Self {
        Self {
            id,
            name,
            created_at: Utc::now(),
            tags: Vec::new(),
            notes: String::new(),
            detail,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_notes(mut self, notes: String) -> Self {
        self.notes = notes;
        self
    }

    pub fn kind(&self) -> ItemKind {
        self.detail.kind()
    }

    /// Replace the tag set wholesale (assignment, not merge).
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    pub fn is_completed(&self) -> bool {
        match &self.detail {
            ItemDetail::Task { is_completed, .. } => *is_completed,
            ItemDetail::Resource { .. } | ItemDetail::Reference { .. } => false,
        }
    }

    pub fn is_acquired(&self) -> bool {
        match &self.detail {
            ItemDetail::Resource { is_acquired, .. } => *is_acquired,
            ItemDetail::Task { .. } | ItemDetail::Reference { .. } => false,
        }
    }

    /// Toggle task completion.
    ///
    /// `completed_at` is stamped only on the false→true transition and
    /// cleared on reversal; re-completing an already completed task keeps
    /// the original timestamp.
    pub fn set_completed(&mut self, completed: bool) -> Result<()> {
        match &mut self.detail {
            ItemDetail::Task {
                is_completed,
                completed_at,
                ..
            } => {
                if completed && !*is_completed {
                    *completed_at = Some(Utc::now());
                } else if !completed {
                    *completed_at = None;
                }
                *is_completed = completed;
                Ok(())
            }
            ItemDetail::Resource { .. } | ItemDetail::Reference { .. } => {
                Err(SiftError::Validation(format!(
                    "Item '{}' is a {}, not a task",
                    self.name,
                    self.kind()
                )))
            }
        }
    }

    pub fn set_acquired(&mut self, acquired: bool) -> Result<()> {
        match &mut self.detail {
            ItemDetail::Resource { is_acquired, .. } => {
                *is_acquired = acquired;
                Ok(())
            }
            ItemDetail::Task { .. } | ItemDetail::Reference { .. } => {
                Err(SiftError::Validation(format!(
                    "Item '{}' is a {}, not a resource",
                    self.name,
                    self.kind()
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_dedup_and_case() {
        let tags = normalize_tags(["Physical", " digital ", "physical", ""]);
        assert_eq!(tags, vec!["physical", "digital"]);
    }

    #[test]
    fn test_completed_at_set_once_and_cleared() {
        let mut item = ProjectItem::new("t-1".into(), "Buy paint".into(), ItemDetail::task(None));

        item.set_completed(true).unwrap();
        let first = match &item.detail {
            ItemDetail::Task { completed_at, .. } => completed_at.unwrap(),
            _ => unreachable!(),
        };

        // Completing again keeps the original stamp
        item.set_completed(true).unwrap();
        match &item.detail {
            ItemDetail::Task { completed_at, .. } => assert_eq!(*completed_at, Some(first)),
            _ => unreachable!(),
        }

        // Reversal clears it
        item.set_completed(false).unwrap();
        match &item.detail {
            ItemDetail::Task { completed_at, .. } => assert!(completed_at.is_none()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_completion_rejected_for_non_task() {
        let mut item = ProjectItem::new("r-1".into(), "Sandpaper".into(), ItemDetail::resource());
        assert!(item.set_completed(true).is_err());
        assert!(item.set_acquired(true).is_ok());
        assert!(item.is_acquired());
    }

    #[test]
    fn test_kind_matches_detail() {
        let task = ProjectItem::new("a".into(), "x".into(), ItemDetail::task(None));
        let res = ProjectItem::new("b".into(), "y".into(), ItemDetail::resource());
        let refr = ProjectItem::new("c".into(), "z".into(), ItemDetail::reference("url".into()));
        assert_eq!(task.kind(), ItemKind::Task);
        assert_eq!(res.kind(), ItemKind::Resource);
        assert_eq!(refr.kind(), ItemKind::Reference);
    }
}
