//! Error types for practice-core.

use thiserror::Error;
use uuid::Uuid;

/// Errors reported by the practice engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no eligible words to practice")]
    EmptySession,

    #[error("{0} is not available")]
    CollaboratorUnavailable(String),
}

/// Errors reported by a word-progress store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("word not found: {0}")]
    WordNotFound(Uuid),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
