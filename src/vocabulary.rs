//! Tag vocabulary computation for classification.
//!
//! The vocabulary is the candidate tag set offered to the user and the
//! classifier, scoped either globally (all entities) or locally (one
//! project's domain defaults plus its locally-used tags).

use crate::model::{DatasetContent, normalize_tags};
use std::collections::{BTreeSet, HashMap};

/// System-default tags always offered, regardless of dataset contents.
pub const DEFAULT_TAGS: &[&str] = &[
    "physical",
    "digital",
    "out",
    "need-material",
    "need-tools",
    "buy",
];

/// Union of the system defaults and every tag present on any item.
///
/// Deterministic, deduplicated, case-normalized.
pub fn global_vocabulary(dataset: &DatasetContent) -> Vec<String> {
    let mut vocab: BTreeSet<String> = normalize_tags(DEFAULT_TAGS.iter().copied())
        .into_iter()
        .collect();
    for project in &dataset.projects {
        for item in &project.items {
            // Tags are normalized on assignment, but hand-edited dataset
            // files may carry arbitrary casing
            vocab.extend(normalize_tags(item.tags.iter()));
        }
    }
    vocab.into_iter().collect()
}

/// A project's domain-default tags plus the tags used *only* within its
/// own items.
///
/// Tags that also appear on items of other projects are excluded from the
/// local-only component; the domain defaults are always included. An
/// unknown project id yields an empty vocabulary.
pub fn local_vocabulary(dataset: &DatasetContent, project_id: u32) -> Vec<String> {
    let Some(project) = dataset.find_project(project_id) else {
        return Vec::new();
    };

    // Count, per tag, which projects use it on their items
    let mut usage: HashMap<String, BTreeSet<u32>> = HashMap::new();
    for p in &dataset.projects {
        for item in &p.items {
            for tag in normalize_tags(item.tags.iter()) {
                usage.entry(tag).or_default().insert(p.id);
            }
        }
    }

    let mut vocab: BTreeSet<String> = normalize_tags(project.tags.iter())
        .into_iter()
        .collect();
    for (tag, projects) in usage {
        if projects.len() == 1 && projects.contains(&project_id) {
            vocab.insert(tag);
        }
    }
    vocab.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemDetail, Project, ProjectItem};

    fn item(id: &str, tags: &[&str]) -> ProjectItem {
        ProjectItem::new(id.into(), id.into(), ItemDetail::task(None)).with_tags(tags.iter())
    }

    fn dataset() -> DatasetContent {
        let mut data = DatasetContent::default();
        let mut kitchen = Project::new(1, "Kitchen".into());
        kitchen.tags = vec!["renovation".into()];
        kitchen.items.push(item("a", &["physical", "sanding"]));
        kitchen.items.push(item("b", &["buy"]));
        let mut party = Project::new(2, "Party".into());
        party.items.push(item("c", &["physical", "invites"]));
        data.projects.push(kitchen);
        data.projects.push(party);
        data
    }

    #[test]
    fn test_empty_dataset_yields_defaults_only() {
        let vocab = global_vocabulary(&DatasetContent::default());
        let mut expected: Vec<String> = DEFAULT_TAGS.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(vocab, expected);
    }

    #[test]
    fn test_global_includes_all_item_tags() {
        let vocab = global_vocabulary(&dataset());
        for tag in ["sanding", "invites", "physical", "buy", "digital"] {
            assert!(vocab.contains(&tag.to_string()), "missing {}", tag);
        }
    }

    #[test]
    fn test_local_excludes_tags_shared_with_other_projects() {
        let data = dataset();
        let vocab = local_vocabulary(&data, 1);
        // "sanding" used only by Kitchen; "physical" also used by Party
        assert!(vocab.contains(&"sanding".to_string()));
        assert!(!vocab.contains(&"physical".to_string()));
        // Domain defaults always included
        assert!(vocab.contains(&"renovation".to_string()));
    }

    #[test]
    fn test_global_superset_of_local_item_contribution() {
        let data = dataset();
        let global = global_vocabulary(&data);
        for project in &data.projects {
            for tag in local_vocabulary(&data, project.id) {
                // Domain defaults are the only part that may fall outside
                let from_items = data
                    .projects
                    .iter()
                    .any(|p| p.items.iter().any(|i| i.tags.contains(&tag)));
                if from_items {
                    assert!(global.contains(&tag), "{} missing from global", tag);
                }
            }
        }
    }

    #[test]
    fn test_unknown_project_yields_empty() {
        assert!(local_vocabulary(&dataset(), 99).is_empty());
    }
}
