//! External service ports.

use async_trait::async_trait;
use questforge_domain::Difficulty;
use serde::{Deserialize, Serialize};

use super::error::SuggestionError;

/// What the collaborator is asked to break down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
}

/// One proposed step, as returned by the collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgoalSuggestion {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Proposes subgoals for a goal. The engine validates whatever comes back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubgoalSuggestionPort: Send + Sync {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<SubgoalSuggestion>, SuggestionError>;
}

/// Raw prompt-in, text-out generation backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextCompletionPort: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, SuggestionError>;
}
