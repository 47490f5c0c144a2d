use super::classifier::{ClassificationRequest, Classifier, HierarchySnapshot};
use crate::error::{Result, SiftError};
use crate::model::{ClassificationType, DeferOutcome, Draft, ProjectRef};
use crate::storage::Repository;
use crate::vocabulary;

/// Observable state of the per-head triage state machine.
///
/// `Idle` is re-entered whenever the queue head changes; a failed
/// proposal leaves the same head proposable again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageState {
    Idle,
    Proposed,
    Failed(String),
}

/// Drives the propose → review → resolve lifecycle for the inbox head.
///
/// Owns the live draft. The classifier call is the only suspension
/// point; every terminal action goes through the repository so a
/// half-applied draft cannot exist.
pub struct ProposalEngine {
    state: TriageState,
    draft: Option<Draft>,
    /// Head text the current state refers to.
    head: Option<String>,
}

impl Default for ProposalEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalEngine {
    pub fn new() -> Self {
        Self {
            state: TriageState::Idle,
            draft: None,
            head: None,
        }
    }

    pub fn state(&self) -> &TriageState {
        &self.state
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    /// Mutable access for review edits (tags, duration, target, type).
    /// Edits never touch the resolved flag.
    pub fn draft_mut(&mut self) -> Option<&mut Draft> {
        self.draft.as_mut()
    }

    /// Drop state belonging to a head that is no longer current. An
    /// invalidated draft is discarded, never applied.
    fn sync_head(&mut self, repo: &Repository) {
        let current = repo.data().inbox.peek_head().map(str::to_string);
        if self.head != current {
            self.head = current;
            self.draft = None;
            self.state = TriageState::Idle;
        }
    }

    /// Ask the collaborator for a placement proposal for the current head.
    ///
    /// Returns the existing draft without re-invoking the collaborator
    /// when one is already live for this head. On a transport or schema
    /// error the state machine moves to `Failed`, nothing is mutated,
    /// and the same head remains proposable.
    pub fn propose(
        &mut self,
        repo: &Repository,
        classifier: &dyn Classifier,
    ) -> Result<&Draft> {
        self.sync_head(repo);

        let head = repo
            .data()
            .inbox
            .peek_head()
            .ok_or(SiftError::EmptyQueue)?
            .to_string();

        if self.draft.is_some() {
            return Ok(self.draft.as_ref().expect("checked above"));
        }

        let request = ClassificationRequest {
            source_text: head.clone(),
            hierarchy: HierarchySnapshot::capture(repo.data()),
            tag_vocabulary: vocabulary::global_vocabulary(repo.data()),
        };

        let outcome = match classifier.classify(&request) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.state = TriageState::Failed(e.to_string());
                return Err(e);
            }
        };

        let target = match &outcome.suggested_project {
            None => ProjectRef::Unmatched,
            Some(name) if outcome.classification == ClassificationType::NewProject => {
                ProjectRef::New(name.clone())
            }
            Some(name) => match repo.data().find_project_by_name(name) {
                Some(project) => ProjectRef::Existing(project.id),
                None => ProjectRef::New(name.clone()),
            },
        };

        self.draft = Some(Draft::new(
            head.clone(),
            outcome.classification,
            target,
            outcome.tags,
            outcome.duration_estimate,
            outcome.reasoning,
            outcome.confidence,
            outcome.alternative_projects,
        ));
        self.head = Some(head);
        self.state = TriageState::Proposed;
        Ok(self.draft.as_ref().expect("just set"))
    }

    /// Manual fallback: build a draft for the current head without the
    /// collaborator, e.g. after a classification failure.
    pub fn draft_manual(
        &mut self,
        repo: &Repository,
        classification: ClassificationType,
        target: ProjectRef,
        tags: Vec<String>,
        duration_estimate: Option<String>,
    ) -> Result<&Draft> {
        self.sync_head(repo);

        let head = repo
            .data()
            .inbox
            .peek_head()
            .ok_or(SiftError::EmptyQueue)?
            .to_string();

        let draft = Draft::new(
            head.clone(),
            classification,
            target,
            tags,
            duration_estimate,
            "manually assigned".to_string(),
            1.0,
            Vec::new(),
        );
        // Surface target problems (e.g. empty new-project name) now
        // rather than at apply time
        if let ProjectRef::New(name) = draft.target() {
            if name.trim().is_empty() {
                return Err(SiftError::Validation(
                    "New project name cannot be empty".to_string(),
                ));
            }
        }

        self.draft = Some(draft);
        self.head = Some(head);
        self.state = TriageState::Proposed;
        Ok(self.draft.as_ref().expect("just set"))
    }

    /// Terminal: hand the draft to the repository. On success the draft
    /// is destroyed; a validation failure keeps it live for further
    /// edits.
    pub fn confirm(&mut self, repo: &mut Repository) -> Result<String> {
        self.sync_head(repo);
        let draft = self.draft.as_mut().ok_or(SiftError::StaleDraft)?;
        let item_id = repo.apply_draft(draft)?;
        self.draft = None;
        self.head = None;
        self.state = TriageState::Idle;
        Ok(item_id)
    }

    /// Terminal: defer the head to the tail and discard the draft. No
    /// item is created.
    pub fn skip(&mut self, repo: &mut Repository) -> Result<DeferOutcome> {
        self.sync_head(repo);
        if let Some(draft) = self.draft.as_mut() {
            draft.mark_resolved()?;
        }
        self.draft = None;
        self.head = None;
        self.state = TriageState::Idle;
        Ok(repo.defer_head())
    }

    /// Terminal: permanently drop the head text. Reachable only through
    /// explicit user action; no classification outcome maps here.
    pub fn trash(&mut self, repo: &mut Repository) -> Result<String> {
        self.sync_head(repo);
        if let Some(draft) = self.draft.as_mut() {
            draft.mark_resolved()?;
        }
        self.draft = None;
        self.head = None;
        self.state = TriageState::Idle;
        repo.trash_head()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;
    use crate::model::DatasetContent;
    use crate::storage::DatasetStore;
    use crate::triage::classifier::ClassificationOutcome;
    use std::cell::Cell;
    use tempfile::TempDir;

    /// Scripted collaborator double: returns a fixed outcome or error.
    struct Scripted {
        outcome: std::result::Result<ClassificationOutcome, String>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn ok(outcome: ClassificationOutcome) -> Self {
            Self {
                outcome: Ok(outcome),
                calls: Cell::new(0),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                outcome: Err(message.to_string()),
                calls: Cell::new(0),
            }
        }
    }

    impl Classifier for Scripted {
        fn classify(&self, _request: &ClassificationRequest) -> Result<ClassificationOutcome> {
            self.calls.set(self.calls.get() + 1);
            self.outcome
                .clone()
                .map_err(SiftError::Classification)
        }
    }

    fn outcome(project: Option<&str>) -> ClassificationOutcome {
        ClassificationOutcome {
            classification: ClassificationType::Resource,
            suggested_project: project.map(str::to_string),
            tags: vec!["buy".into()],
            duration_estimate: None,
            reasoning: "shopping item".into(),
            confidence: 0.9,
            alternative_projects: vec![],
        }
    }

    fn repo_with_inbox(entries: &[&str]) -> (Repository, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = DatasetStore::new(temp.path().to_path_buf());
        store.save("home", &DatasetContent::default()).unwrap();
        let mut repo = Repository::open(store, "home").unwrap();
        for entry in entries {
            repo.capture(entry).unwrap();
        }
        repo.save().unwrap();
        (repo, temp)
    }

    #[test]
    fn test_propose_materializes_draft() {
        let (repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        let draft = engine.propose(&repo, &classifier).unwrap();
        assert_eq!(draft.source_text(), "Buy milk");
        assert_eq!(draft.target(), &ProjectRef::New("Groceries".into()));
        assert!(!draft.is_resolved());
        assert_eq!(engine.state(), &TriageState::Proposed);
    }

    #[test]
    fn test_propose_is_cached_per_head() {
        let (repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        engine.propose(&repo, &classifier).unwrap();
        assert_eq!(classifier.calls.get(), 1);
    }

    #[test]
    fn test_propose_resolves_existing_project_by_name() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let id = repo.create_project("Groceries").unwrap();
        let classifier = Scripted::ok(outcome(Some("groceries")));
        let mut engine = ProposalEngine::new();

        let draft = engine.propose(&repo, &classifier).unwrap();
        assert_eq!(draft.target(), &ProjectRef::Existing(id));
    }

    #[test]
    fn test_failed_proposal_leaves_head_proposable() {
        let (repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let mut engine = ProposalEngine::new();

        let failing = Scripted::failing("api unreachable");
        let err = engine.propose(&repo, &failing).unwrap_err();
        assert!(matches!(err, SiftError::Classification(_)));
        assert!(matches!(engine.state(), TriageState::Failed(_)));
        assert!(engine.draft().is_none());

        // Retry with a working collaborator succeeds on the same head
        let working = Scripted::ok(outcome(Some("Groceries")));
        let draft = engine.propose(&repo, &working).unwrap();
        assert_eq!(draft.source_text(), "Buy milk");
    }

    #[test]
    fn test_empty_queue_cannot_be_proposed() {
        let (repo, _temp) = repo_with_inbox(&[]);
        let classifier = Scripted::ok(outcome(None));
        let mut engine = ProposalEngine::new();
        assert!(matches!(
            engine.propose(&repo, &classifier),
            Err(SiftError::EmptyQueue)
        ));
    }

    #[test]
    fn test_confirm_applies_and_destroys_draft() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        engine.confirm(&mut repo).unwrap();

        assert!(engine.draft().is_none());
        assert_eq!(engine.state(), &TriageState::Idle);
        assert!(repo.data().inbox.is_empty());
        assert!(repo.is_dirty());
        let project = repo.data().find_project_by_name("Groceries").unwrap();
        assert_eq!(project.items.len(), 1);
    }

    #[test]
    fn test_rapid_double_confirm_reports_stale() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        engine.confirm(&mut repo).unwrap();
        let err = engine.confirm(&mut repo).unwrap_err();
        assert!(matches!(err, SiftError::StaleDraft));

        let project = repo.data().find_project_by_name("Groceries").unwrap();
        assert_eq!(project.items.len(), 1);
    }

    #[test]
    fn test_draft_edits_survive_until_confirm() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(None));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        // Unmatched proposal: user picks a target and tweaks tags
        let draft = engine.draft_mut().unwrap();
        draft.set_target(ProjectRef::New("Groceries".into())).unwrap();
        draft.set_tags(["buy", "out"]).unwrap();

        engine.confirm(&mut repo).unwrap();
        let project = repo.data().find_project_by_name("Groceries").unwrap();
        assert_eq!(project.items[0].tags, vec!["buy", "out"]);
    }

    #[test]
    fn test_confirm_unmatched_keeps_draft_for_editing() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(None));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        let err = engine.confirm(&mut repo).unwrap_err();
        assert!(matches!(err, SiftError::Validation(_)));

        // Draft still live and editable; dataset untouched
        assert!(engine.draft().is_some());
        assert!(!engine.draft().unwrap().is_resolved());
        assert_eq!(repo.data().inbox.len(), 1);
        assert!(!repo.is_dirty());
    }

    #[test]
    fn test_skip_defers_and_discards() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk", "Call plumber"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        assert_eq!(engine.skip(&mut repo).unwrap(), DeferOutcome::Deferred);

        assert!(engine.draft().is_none());
        assert_eq!(repo.data().inbox.peek_head(), Some("Call plumber"));
        assert_eq!(repo.data().inbox.len(), 2);
        // No item was created anywhere
        assert!(repo.data().projects.iter().all(|p| p.items.is_empty()));
    }

    #[test]
    fn test_trash_drops_head_without_item() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        let text = engine.trash(&mut repo).unwrap();
        assert_eq!(text, "Buy milk");
        assert!(repo.data().inbox.is_empty());
        assert!(repo.data().projects.iter().all(|p| p.items.is_empty()));
        assert!(repo.is_dirty());
    }

    #[test]
    fn test_head_change_invalidates_draft() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk", "Call plumber"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        // The head changes underneath the draft (e.g. trashed elsewhere)
        repo.trash_head().unwrap();

        let err = engine.confirm(&mut repo).unwrap_err();
        assert!(matches!(err, SiftError::StaleDraft));
        assert_eq!(engine.state(), &TriageState::Idle);
        // New head gets a fresh proposal
        let draft = engine.propose(&repo, &classifier).unwrap();
        assert_eq!(draft.source_text(), "Call plumber");
    }

    #[test]
    fn test_enqueue_during_review_keeps_draft() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let classifier = Scripted::ok(outcome(Some("Groceries")));
        let mut engine = ProposalEngine::new();

        engine.propose(&repo, &classifier).unwrap();
        // Quick capture on the tail is always permitted
        repo.capture("New idea").unwrap();

        engine.confirm(&mut repo).unwrap();
        assert_eq!(repo.data().inbox.peek_head(), Some("New idea"));
    }

    #[test]
    fn test_manual_draft_without_collaborator() {
        let (mut repo, _temp) = repo_with_inbox(&["Buy milk"]);
        let mut engine = ProposalEngine::new();

        engine
            .draft_manual(
                &repo,
                ClassificationType::Resource,
                ProjectRef::New("Groceries".into()),
                vec!["buy".into()],
                None,
            )
            .unwrap();
        engine.confirm(&mut repo).unwrap();

        let project = repo.data().find_project_by_name("Groceries").unwrap();
        assert_eq!(project.items.len(), 1);
    }
}
