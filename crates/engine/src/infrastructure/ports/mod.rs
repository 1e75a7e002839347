//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Storage (in-memory for tests and scenarios, SQLite for the runner)
//! - Subgoal suggestions (an external text-generation service)
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{EnemyRepo, GoalRepo, HabitRepo, HeroRepo, InventoryRepo, ItemLibraryRepo};

#[cfg(test)]
pub use repos::{
    MockEnemyRepo, MockGoalRepo, MockHabitRepo, MockHeroRepo, MockInventoryRepo,
    MockItemLibraryRepo,
};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{SubgoalSuggestion, SubgoalSuggestionPort, SuggestionRequest, TextCompletionPort};

#[cfg(test)]
pub use external::{MockSubgoalSuggestionPort, MockTextCompletionPort};

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{RepoError, SuggestionError};
