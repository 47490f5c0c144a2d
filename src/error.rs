use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Draft already resolved")]
    StaleDraft,

    #[error("Unsaved changes in dataset '{0}'. Save or discard before switching.")]
    DirtyState(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Corrupt dataset '{name}': {reason}")]
    CorruptData { name: String, reason: String },

    #[error("Inbox is empty")]
    EmptyQueue,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Workspace not initialized. Run 'sift init' first.")]
    NotInitialized,

    #[error("Workspace already initialized at {0}")]
    AlreadyInitialized(String),
}

pub type Result<T> = std::result::Result<T, SiftError>;
