//! The AI classification collaborator behind a narrow synchronous port.
//!
//! [`Classifier`] is the only suspension point in the triage flow. The
//! HTTP implementation talks to an Anthropic-style messages endpoint with
//! an explicit timeout and a single-retry-then-fail policy; everything it
//! returns is a proposal, never a mutation.

use crate::error::{Result, SiftError};
use crate::model::{ClassificationType, DatasetContent, ItemDetail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Confidence below this maps the suggestion to "unmatched".
const CONFIDENCE_FLOOR: f64 = 0.6;

/// Marker the model uses when no existing project fits.
const UNMATCHED: &str = "unmatched";

/// Point-in-time view of the hierarchy passed along as classification
/// context. Names only; the collaborator never sees ids.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HierarchySnapshot {
    pub branches: Vec<GoalBranch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalBranch {
    pub goal_name: Option<String>,
    pub projects: Vec<ProjectLeaf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProjectLeaf {
    pub project_name: String,
    pub active_item_names: Vec<String>,
}

impl HierarchySnapshot {
    /// Capture the current goals, projects and their incomplete task names.
    pub fn capture(dataset: &DatasetContent) -> Self {
        let mut branches: Vec<GoalBranch> = dataset
            .goals
            .iter()
            .map(|goal| GoalBranch {
                goal_name: Some(goal.name.clone()),
                projects: Vec::new(),
            })
            .collect();
        let mut orphans = GoalBranch {
            goal_name: None,
            projects: Vec::new(),
        };

        for project in dataset.projects_sorted() {
            let leaf = ProjectLeaf {
                project_name: project.name.clone(),
                active_item_names: project
                    .items
                    .iter()
                    .filter(|item| match &item.detail {
                        ItemDetail::Task { is_completed, .. } => !is_completed,
                        ItemDetail::Resource { is_acquired, .. } => !is_acquired,
                        ItemDetail::Reference { .. } => false,
                    })
                    .map(|item| item.name.clone())
                    .collect(),
            };

            let branch = project.goal_id.as_deref().and_then(|goal_id| {
                let pos = dataset.goals.iter().position(|g| g.id == goal_id)?;
                branches.get_mut(pos)
            });
            match branch {
                Some(branch) => branch.projects.push(leaf),
                None => orphans.projects.push(leaf),
            }
        }

        if !orphans.projects.is_empty() {
            branches.push(orphans);
        }
        Self { branches }
    }

    pub fn project_names(&self) -> Vec<&str> {
        self.branches
            .iter()
            .flat_map(|b| b.projects.iter())
            .map(|p| p.project_name.as_str())
            .collect()
    }
}

/// What the caller hands to the collaborator.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub source_text: String,
    pub hierarchy: HierarchySnapshot,
    pub tag_vocabulary: Vec<String>,
}

/// Structurally valid response from the collaborator.
///
/// `suggested_project` is `None` when the model answered "unmatched" or
/// its confidence fell below the floor.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationOutcome {
    pub classification: ClassificationType,
    pub suggested_project: Option<String>,
    pub tags: Vec<String>,
    pub duration_estimate: Option<String>,
    pub reasoning: String,
    pub confidence: f64,
    pub alternative_projects: Vec<String>,
}

/// The narrow synchronous port the triage engine calls.
pub trait Classifier {
    fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationOutcome>;
}

/// Configuration for the HTTP classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".to_string()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Classifier backed by an Anthropic-style messages endpoint.
pub struct HttpClassifier {
    config: ClassifierConfig,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl HttpClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        // TLS provider must be installed once per process before the
        // first request; subsequent installs are a no-op
        let _ = rustls::crypto::ring::default_provider().install_default();

        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            SiftError::Config(format!(
                "API key environment variable '{}' is not set",
                config.api_key_env
            ))
        })?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SiftError::Classification(e.to_string()))?;
        Ok(Self {
            config,
            api_key,
            client,
        })
    }

    fn call_api(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .map_err(|e| SiftError::Classification(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SiftError::Classification(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| SiftError::Classification(e.to_string()))?;

        json["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| {
                SiftError::Classification("response has no content text".to_string())
            })
    }
}

impl Classifier for HttpClassifier {
    fn classify(&self, request: &ClassificationRequest) -> Result<ClassificationOutcome> {
        let prompt = build_prompt(request);
        tracing::debug!(chars = prompt.len(), "Sending classification prompt");

        // One retry on transport failure, then give up. The caller treats
        // any error here as recoverable and falls back to manual triage.
        let raw = match self.call_api(&prompt) {
            Ok(raw) => raw,
            Err(first) => {
                tracing::warn!(error = %first, "Classification call failed, retrying once");
                self.call_api(&prompt)?
            }
        };

        parse_outcome(&raw)
    }
}

/// Render the classification prompt for one inbox entry.
pub fn build_prompt(request: &ClassificationRequest) -> String {
    let mut hierarchy = String::new();
    for branch in &request.hierarchy.branches {
        match &branch.goal_name {
            Some(goal) => hierarchy.push_str(&format!("Goal: {}\n", goal)),
            None => hierarchy.push_str("(no goal)\n"),
        }
        for project in &branch.projects {
            hierarchy.push_str(&format!("  - {}\n", project.project_name));
            for item in &project.active_item_names {
                hierarchy.push_str(&format!("      * {}\n", item));
            }
        }
    }
    if hierarchy.is_empty() {
        hierarchy.push_str("(none yet)\n");
    }

    format!(
        "Act as my personal assistant organizing a GTD-style backlog.\n\n\
         Current goals and projects with their open items:\n{hierarchy}\n\
         Allowed tags: {tags}\n\n\
         Classify this captured note:\n{text}\n\n\
         Respond with a single JSON object, no other text, with fields:\n\
         - classification_type: one of \"task\", \"resource\", \"reference\", \
           \"new-project\", \"incubate\"\n\
         - suggested_project_name: exact name of the best matching project, \
           \"{unmatched}\" if none fit, or a short new name when proposing \
           a new project\n\
         - tags: array of tags from the allowed list\n\
         - duration_estimate: time estimate like \"15min\" or \"1h\", or null\n\
         - reasoning: brief explanation, max 15 words\n\
         - confidence: number between 0.0 and 1.0\n\
         - alternative_project_names: array of close second matches",
        hierarchy = hierarchy,
        tags = request.tag_vocabulary.join(", "),
        text = request.source_text,
        unmatched = UNMATCHED,
    )
}

#[derive(Debug, Deserialize)]
struct RawOutcome {
    classification_type: String,

    #[serde(default)]
    suggested_project_name: String,

    #[serde(default)]
    tags: Vec<String>,

    #[serde(default)]
    duration_estimate: Option<String>,

    #[serde(default)]
    reasoning: String,

    confidence: f64,

    #[serde(default)]
    alternative_project_names: Vec<String>,
}

/// Parse the model's reply into a [`ClassificationOutcome`].
///
/// Tolerates prose around the JSON object but treats a missing or
/// schema-violating object as a recoverable [`SiftError::Classification`].
pub fn parse_outcome(raw: &str) -> Result<ClassificationOutcome> {
    let trimmed = raw.trim();
    let json_str = if trimmed.starts_with('{') {
        trimmed
    } else {
        let start = trimmed.find('{');
        let end = trimmed.rfind('}');
        match (start, end) {
            (Some(s), Some(e)) if e > s => &trimmed[s..=e],
            _ => {
                return Err(SiftError::Classification(
                    "no JSON object found in response".to_string(),
                ));
            }
        }
    };

    let parsed: RawOutcome = serde_json::from_str(json_str)
        .map_err(|e| SiftError::Classification(format!("malformed response: {}", e)))?;

    // Destructive values are rejected here, not mapped
    let classification: ClassificationType = parsed.classification_type.parse()?;

    let confidence = parsed.confidence.clamp(0.0, 1.0);
    let suggestion = parsed.suggested_project_name.trim();
    let suggested_project = if suggestion.is_empty()
        || suggestion.eq_ignore_ascii_case(UNMATCHED)
        || (confidence < CONFIDENCE_FLOOR && classification != ClassificationType::NewProject)
    {
        None
    } else {
        Some(suggestion.to_string())
    };

    Ok(ClassificationOutcome {
        classification,
        suggested_project,
        tags: parsed.tags,
        duration_estimate: parsed.duration_estimate.filter(|d| !d.trim().is_empty()),
        reasoning: parsed.reasoning,
        confidence,
        alternative_projects: parsed.alternative_project_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Goal, Project, ProjectItem};

    #[test]
    fn test_parse_outcome_plain_json() {
        let raw = r#"{
            "classification_type": "resource",
            "suggested_project_name": "Groceries",
            "tags": ["buy"],
            "duration_estimate": null,
            "reasoning": "shopping item",
            "confidence": 0.9,
            "alternative_project_names": []
        }"#;
        let outcome = parse_outcome(raw).unwrap();
        assert_eq!(outcome.classification, ClassificationType::Resource);
        assert_eq!(outcome.suggested_project.as_deref(), Some("Groceries"));
        assert_eq!(outcome.confidence, 0.9);
    }

    #[test]
    fn test_parse_outcome_with_surrounding_prose() {
        let raw = "Here is the classification:\n{\"classification_type\": \"task\", \
                   \"suggested_project_name\": \"Kitchen\", \"confidence\": 0.8}\nDone.";
        let outcome = parse_outcome(raw).unwrap();
        assert_eq!(outcome.classification, ClassificationType::Task);
        assert_eq!(outcome.suggested_project.as_deref(), Some("Kitchen"));
    }

    #[test]
    fn test_parse_outcome_low_confidence_forces_unmatched() {
        let raw = r#"{"classification_type": "task", "suggested_project_name": "Kitchen", "confidence": 0.4}"#;
        let outcome = parse_outcome(raw).unwrap();
        assert_eq!(outcome.suggested_project, None);
    }

    #[test]
    fn test_parse_outcome_unmatched_marker() {
        let raw = r#"{"classification_type": "task", "suggested_project_name": "Unmatched", "confidence": 0.9}"#;
        let outcome = parse_outcome(raw).unwrap();
        assert_eq!(outcome.suggested_project, None);
    }

    #[test]
    fn test_parse_outcome_rejects_destructive_classification() {
        let raw = r#"{"classification_type": "trash", "suggested_project_name": "x", "confidence": 0.9}"#;
        assert!(matches!(
            parse_outcome(raw),
            Err(SiftError::Classification(_))
        ));
    }

    #[test]
    fn test_parse_outcome_rejects_garbage() {
        assert!(parse_outcome("I could not classify this.").is_err());
        assert!(parse_outcome("{not json}").is_err());
    }

    #[test]
    fn test_parse_outcome_clamps_confidence() {
        let raw = r#"{"classification_type": "task", "suggested_project_name": "Kitchen", "confidence": 3.2}"#;
        assert_eq!(parse_outcome(raw).unwrap().confidence, 1.0);
    }

    #[test]
    fn test_snapshot_groups_projects_under_goals() {
        let mut data = DatasetContent::default();
        let goal = Goal::new("Home".into());
        let goal_id = goal.id.clone();
        data.goals.push(goal);

        let mut kitchen = Project::new(1, "Kitchen".into());
        kitchen.goal_id = Some(goal_id);
        kitchen.items.push(ProjectItem::new(
            "t-1".into(),
            "Sand the wall".into(),
            ItemDetail::task(None),
        ));
        let mut done = ProjectItem::new("t-2".into(), "Buy paint".into(), ItemDetail::task(None));
        done.set_completed(true).unwrap();
        kitchen.items.push(done);
        data.projects.push(kitchen);
        data.projects.push(Project::new(2, "Orphan".into()));

        let snapshot = HierarchySnapshot::capture(&data);
        assert_eq!(snapshot.branches.len(), 2);
        assert_eq!(snapshot.branches[0].goal_name.as_deref(), Some("Home"));
        // Completed tasks are not part of the snapshot
        assert_eq!(
            snapshot.branches[0].projects[0].active_item_names,
            vec!["Sand the wall"]
        );
        assert_eq!(snapshot.branches[1].goal_name, None);
        assert_eq!(snapshot.project_names(), vec!["Kitchen", "Orphan"]);
    }

    #[test]
    fn test_prompt_contains_vocabulary_and_text() {
        let request = ClassificationRequest {
            source_text: "Buy milk".into(),
            hierarchy: HierarchySnapshot::default(),
            tag_vocabulary: vec!["buy".into(), "out".into()],
        };
        let prompt = build_prompt(&request);
        assert!(prompt.contains("Buy milk"));
        assert!(prompt.contains("buy, out"));
        assert!(prompt.contains("(none yet)"));
    }
}
