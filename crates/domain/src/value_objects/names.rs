//! Validated name newtypes for domain entities
//!
//! These newtypes ensure that names are valid by construction:
//! - Non-empty
//! - Within length limits
//! - Trimmed of leading/trailing whitespace

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for hero nicknames
const MAX_NICKNAME_LENGTH: usize = 40;

/// Maximum length for goal, subgoal and habit titles
const MAX_TITLE_LENGTH: usize = 200;

// ============================================================================
// Nickname
// ============================================================================

/// A validated hero nickname (non-empty, <=40 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Nickname(String);

impl Nickname {
    /// Create a new validated nickname.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The nickname is empty after trimming
    /// - The nickname exceeds 40 characters after trimming
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Nickname cannot be empty"));
        }
        if trimmed.chars().count() > MAX_NICKNAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Nickname cannot exceed {} characters",
                MAX_NICKNAME_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the nickname as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Nickname {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Nickname> for String {
    fn from(name: Nickname) -> String {
        name.0
    }
}

// ============================================================================
// Title
// ============================================================================

/// A validated title for goals, subgoals and habits (non-empty, <=200 chars, trimmed)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Create a new validated title.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if:
    /// - The title is empty after trimming
    /// - The title exceeds 200 characters after trimming
    pub fn new(title: impl Into<String>) -> Result<Self, DomainError> {
        let title = title.into();
        let trimmed = title.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Title cannot be empty"));
        }
        if trimmed.chars().count() > MAX_TITLE_LENGTH {
            return Err(DomainError::validation(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the title as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Title {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Title> for String {
    fn from(title: Title) -> String {
        title.0
    }
}
