//! Subgoal suggestion adapters.
//!
//! `PromptedSuggestions` turns any text-completion backend into a
//! `SubgoalSuggestionPort` by building a prompt and parsing the JSON reply.

use std::ops::RangeInclusive;
use std::sync::Arc;

use async_trait::async_trait;
use questforge_domain::Difficulty;

use crate::infrastructure::ports::{
    SubgoalSuggestion, SubgoalSuggestionPort, SuggestionError, SuggestionRequest,
    TextCompletionPort,
};

/// How many steps a goal of this difficulty is usually broken into.
pub fn suggested_subgoal_count(difficulty: Difficulty) -> RangeInclusive<usize> {
    match difficulty {
        Difficulty::Easy => 2..=3,
        Difficulty::Medium => 3..=4,
        Difficulty::Hard => 5..=6,
        Difficulty::Epic => 8..=10,
    }
}

pub fn build_prompt(request: &SuggestionRequest) -> String {
    let count = suggested_subgoal_count(request.difficulty);
    let description = if request.description.trim().is_empty() {
        "(none)"
    } else {
        request.description.trim()
    };
    format!(
        "Break the following goal into {min} to {max} concrete, ordered steps.\n\
         Goal: {title}\n\
         Details: {description}\n\
         Difficulty: {difficulty}\n\
         Reply with a JSON array only, where each element is an object \
         {{\"title\": \"...\", \"description\": \"...\"}}.",
        min = count.start(),
        max = count.end(),
        title = request.title.trim(),
        description = description,
        difficulty = request.difficulty,
    )
}

/// Parse the collaborator's reply: a JSON array, optionally inside a ```json fence.
pub fn parse_suggestions(text: &str) -> Result<Vec<SubgoalSuggestion>, SuggestionError> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```") {
        let rest = rest.strip_prefix("json").unwrap_or(rest);
        body = rest.trim_end().strip_suffix("```").unwrap_or(rest).trim();
    }
    serde_json::from_str(body).map_err(|e| SuggestionError::InvalidResponse(e.to_string()))
}

/// Suggestions produced by a text-completion backend.
pub struct PromptedSuggestions {
    completion: Arc<dyn TextCompletionPort>,
}

impl PromptedSuggestions {
    pub fn new(completion: Arc<dyn TextCompletionPort>) -> Self {
        Self { completion }
    }
}

#[async_trait]
impl SubgoalSuggestionPort for PromptedSuggestions {
    async fn suggest(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<SubgoalSuggestion>, SuggestionError> {
        let prompt = build_prompt(request);
        let reply = self.completion.complete(&prompt).await?;
        let suggestions = parse_suggestions(&reply)?;
        tracing::debug!(count = suggestions.len(), "Parsed subgoal suggestions");
        Ok(suggestions)
    }
}

/// Used when no generation backend is configured.
#[derive(Debug, Default)]
pub struct UnavailableSuggestions;

#[async_trait]
impl SubgoalSuggestionPort for UnavailableSuggestions {
    async fn suggest(
        &self,
        _request: &SuggestionRequest,
    ) -> Result<Vec<SubgoalSuggestion>, SuggestionError> {
        Err(SuggestionError::Unavailable)
    }
}
