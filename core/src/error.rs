use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cascade step '{step}' panicked: {message}")]
    StepPanicked { step: String, message: String },

    #[error("Illegal {entity} transition for {id}: {from} -> {to}")]
    IllegalTransition {
        entity: &'static str,
        id:     String,
        from:   String,
        to:     String,
    },

    #[error("Entity '{id}' not found in {container}")]
    EntityNotFound { container: &'static str, id: String },

    #[error("Persisted state for '{key}' is missing or unreadable")]
    UnknownState { key: String },

    #[error("Run not initialized")]
    RunNotInitialized,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
