//! The inbox triage engine.
//!
//! Triage turns raw inbox text into placed items through a small state
//! machine: propose (ask the AI collaborator), review (edit the draft),
//! resolve (confirm, skip or trash).
//!
//! ## Components
//!
//! - [`Classifier`]: the narrow synchronous port to the AI collaborator
//! - [`HttpClassifier`]: Anthropic-style messages API implementation
//! - [`ProposalEngine`]: the per-head state machine and draft owner

mod classifier;
mod engine;

pub use classifier::{
    ClassificationOutcome, ClassificationRequest, Classifier, ClassifierConfig, GoalBranch,
    HierarchySnapshot, HttpClassifier, ProjectLeaf, build_prompt, parse_outcome,
};
pub use engine::{ProposalEngine, TriageState};
