use crate::model::EntityKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecipeCartError {
    #[error("{kind} not found: {key}")]
    NotFound { kind: EntityKind, key: String },

    #[error("{0} key cannot be absent")]
    MissingKey(EntityKind),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Illegal state: {0}")]
    IllegalState(&'static str),

    #[error("Lock poisoned for {0} collection")]
    LockPoisoned(EntityKind),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RecipeCartError {
    /// True for contract violations (calling a command out of order), as
    /// opposed to data-layer failures.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, RecipeCartError::IllegalState(_))
    }
}

pub type Result<T> = std::result::Result<T, RecipeCartError>;
