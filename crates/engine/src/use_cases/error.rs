//! Errors surfaced by the game use cases.

use questforge_domain::{DomainError, HeroId};

use crate::infrastructure::ports::{RepoError, SuggestionError};

/// Every use-case failure, grouped by how a caller should react.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Input rejected before any mutation (empty title, bad difficulty, ...)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The session points at a hero that does not exist; re-authenticate.
    #[error("No hero for session {0}")]
    Session(HeroId),

    /// The requested transition is not allowed right now; nothing changed.
    #[error("Not allowed: {0}")]
    State(String),

    /// A uniqueness rule was violated (duplicate nickname).
    #[error("Already exists: {0}")]
    Integrity(String),

    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("Storage error: {0}")]
    Repo(RepoError),

    #[error("Suggestion error: {0}")]
    Suggestion(#[from] SuggestionError),
}

impl GameError {
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<DomainError> for GameError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) | DomainError::Parse(msg) | DomainError::InvalidId(msg) => {
                Self::Validation(msg)
            }
            DomainError::Constraint(msg) | DomainError::InvalidStateTransition(msg) => {
                Self::State(msg)
            }
            DomainError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
        }
    }
}

impl From<RepoError> for GameError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::ConstraintViolation(msg) => Self::Integrity(msg),
            RepoError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            other => Self::Repo(other),
        }
    }
}
