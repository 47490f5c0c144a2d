use super::item::normalize_tags;
use super::types::ClassificationType;
use crate::error::{Result, SiftError};

/// Where a draft wants its item to land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectRef {
    /// An existing project, by id.
    Existing(u32),
    /// The classifier found no fitting project.
    Unmatched,
    /// A proposed project that does not exist yet.
    New(String),
}

/// Ephemeral AI-proposed placement for one inbox entry.
///
/// Never persisted. Editable until resolved; the `resolved` flag flips
/// false→true exactly once and guards every terminal action.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    source_text: String,
    classification: ClassificationType,
    target: ProjectRef,
    tags: Vec<String>,
    duration_estimate: Option<String>,
    reasoning: String,
    confidence: f64,
    alternative_projects: Vec<String>,
    resolved: bool,
}

impl Draft {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source_text: String,
        classification: ClassificationType,
        target: ProjectRef,
        tags: Vec<String>,
        duration_estimate: Option<String>,
        reasoning: String,
        confidence: f64,
        alternative_projects: Vec<String>,
    ) -> Self {
        Self {
            source_text,
            classification,
            target,
            tags: normalize_tags(tags),
            duration_estimate,
            reasoning,
            confidence: confidence.clamp(0.0, 1.0),
            alternative_projects,
            resolved: false,
        }
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn classification(&self) -> ClassificationType {
        self.classification
    }

    pub fn target(&self) -> &ProjectRef {
        &self.target
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn duration_estimate(&self) -> Option<&str> {
        self.duration_estimate.as_deref()
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn alternative_projects(&self) -> &[String] {
        &self.alternative_projects
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Replace the suggested tag set wholesale. Assignment, not merge.
    pub fn set_tags<I, S>(&mut self, tags: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.guard_editable()?;
        self.tags = normalize_tags(tags);
        Ok(())
    }

    pub fn set_duration_estimate(&mut self, duration: Option<String>) -> Result<()> {
        self.guard_editable()?;
        self.duration_estimate = duration.filter(|d| !d.trim().is_empty());
        Ok(())
    }

    pub fn set_classification(&mut self, classification: ClassificationType) -> Result<()> {
        self.guard_editable()?;
        self.classification = classification;
        Ok(())
    }

    pub fn set_target(&mut self, target: ProjectRef) -> Result<()> {
        self.guard_editable()?;
        if let ProjectRef::New(name) = &target {
            if name.trim().is_empty() {
                return Err(SiftError::Validation(
                    "New project name cannot be empty".to_string(),
                ));
            }
        }
        self.target = target;
        Ok(())
    }

    /// The single check-and-set guard against double application.
    ///
    /// Callers must invoke this exactly once, immediately before the
    /// terminal action takes effect.
    pub fn mark_resolved(&mut self) -> Result<()> {
        if self.resolved {
            return Err(SiftError::StaleDraft);
        }
        self.resolved = true;
        Ok(())
    }

    fn guard_editable(&self) -> Result<()> {
        if self.resolved {
            return Err(SiftError::StaleDraft);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Draft {
        Draft::new(
            "Buy milk".into(),
            ClassificationType::Resource,
            ProjectRef::New("Groceries".into()),
            vec!["Buy".into(), "buy".into()],
            None,
            "shopping item".into(),
            0.9,
            vec![],
        )
    }

    #[test]
    fn test_tags_normalized_on_construction() {
        assert_eq!(draft().tags(), ["buy"]);
    }

    #[test]
    fn test_confidence_clamped() {
        let d = Draft::new(
            "x".into(),
            ClassificationType::Task,
            ProjectRef::Unmatched,
            vec![],
            None,
            String::new(),
            1.7,
            vec![],
        );
        assert_eq!(d.confidence(), 1.0);
    }

    #[test]
    fn test_set_tags_replaces_not_merges() {
        let mut d = draft();
        d.set_tags(["Physical", "OUT"]).unwrap();
        assert_eq!(d.tags(), ["physical", "out"]);
    }

    #[test]
    fn test_empty_new_project_name_rejected() {
        let mut d = draft();
        let err = d.set_target(ProjectRef::New("  ".into())).unwrap_err();
        assert!(matches!(err, SiftError::Validation(_)));
        // Target unchanged
        assert_eq!(d.target(), &ProjectRef::New("Groceries".into()));
    }

    #[test]
    fn test_mark_resolved_flips_exactly_once() {
        let mut d = draft();
        d.mark_resolved().unwrap();
        assert!(d.is_resolved());
        assert!(matches!(d.mark_resolved(), Err(SiftError::StaleDraft)));
    }

    #[test]
    fn test_edits_rejected_after_resolution() {
        let mut d = draft();
        d.mark_resolved().unwrap();
        assert!(matches!(d.set_tags(["x"]), Err(SiftError::StaleDraft)));
        assert!(matches!(
            d.set_classification(ClassificationType::Task),
            Err(SiftError::StaleDraft)
        ));
    }
}
