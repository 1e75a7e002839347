//! Goal aggregate - a one-off quest with a deadline, difficulty and subgoals
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: completion, penalty and snapshot state only change
//!   through the lifecycle methods below
//! - **Newtypes**: `Title` for goal and subgoal titles
//! - **One-way flags**: `penalty_applied` never flips back to false

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::aggregates::ProgressSnapshot;
use crate::error::DomainError;
use crate::value_objects::Title;
use crate::{GoalId, HeroId, SubGoalId};

/// Delay after a deadline before the enemy punishes the hero
pub const DEADLINE_GRACE_MINUTES: i64 = 5;

pub fn deadline_grace() -> Duration {
    Duration::minutes(DEADLINE_GRACE_MINUTES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Epic,
}

impl Difficulty {
    /// XP granted on completion. Gold equals XP.
    pub fn reward_xp(&self) -> u32 {
        match self {
            Self::Easy => 50,
            Self::Medium => 100,
            Self::Hard => 200,
            Self::Epic => 500,
        }
    }

    pub fn reward_gold(&self) -> u32 {
        self.reward_xp()
    }

    pub fn rank(&self) -> u8 {
        match self {
            Self::Easy => 1,
            Self::Medium => 2,
            Self::Hard => 3,
            Self::Epic => 4,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
            Self::Epic => write!(f, "Epic"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" | "1" => Ok(Self::Easy),
            "medium" | "2" => Ok(Self::Medium),
            "hard" | "3" => Ok(Self::Hard),
            "epic" | "4" => Ok(Self::Epic),
            _ => Err(DomainError::validation(format!("Unknown difficulty: {}", s))),
        }
    }
}

/// A checklist step inside a goal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGoal {
    pub id: SubGoalId,
    pub title: Title,
    pub description: Option<String>,
    pub is_completed: bool,
}

impl SubGoal {
    pub fn new(title: Title, description: Option<String>) -> Self {
        Self {
            id: SubGoalId::new(),
            title,
            description: description.filter(|d| !d.trim().is_empty()),
            is_completed: false,
        }
    }
}

/// Field changes for [`Goal::edit`]. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalEdit {
    pub title: Option<Title>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub difficulty: Option<Difficulty>,
}

/// How a completed goal was rolled back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reopened {
    /// Pre-completion hero state was captured; restore it exactly
    FromSnapshot(ProgressSnapshot),
    /// No snapshot on record; only an arithmetic reversal is possible
    WithoutSnapshot { xp: u32, gold: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    id: GoalId,
    hero_id: HeroId,
    title: Title,
    description: String,
    deadline: DateTime<Utc>,
    difficulty: Difficulty,
    created_at: DateTime<Utc>,
    is_completed: bool,
    penalty_applied: bool,
    #[serde(default)]
    subgoals: Vec<SubGoal>,
    #[serde(default)]
    snapshot: Option<ProgressSnapshot>,
}

impl Goal {
    pub fn new(
        hero_id: HeroId,
        title: Title,
        description: impl Into<String>,
        deadline: DateTime<Utc>,
        difficulty: Difficulty,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: GoalId::new(),
            hero_id,
            title,
            description: description.into(),
            deadline,
            difficulty,
            created_at: now,
            is_completed: false,
            penalty_applied: false,
            subgoals: Vec::new(),
            snapshot: None,
        }
    }

    pub fn with_subgoals(mut self, subgoals: Vec<SubGoal>) -> Self {
        self.subgoals = subgoals;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> GoalId {
        self.id
    }

    #[inline]
    pub fn hero_id(&self) -> HeroId {
        self.hero_id
    }

    #[inline]
    pub fn title(&self) -> &Title {
        &self.title
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    #[inline]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[inline]
    pub fn penalty_applied(&self) -> bool {
        self.penalty_applied
    }

    #[inline]
    pub fn subgoals(&self) -> &[SubGoal] {
        &self.subgoals
    }

    #[inline]
    pub fn snapshot(&self) -> Option<&ProgressSnapshot> {
        self.snapshot.as_ref()
    }

    /// Percent of subgoals done. Without subgoals it follows the completion flag.
    pub fn progress(&self) -> f64 {
        if self.subgoals.is_empty() {
            return if self.is_completed { 100.0 } else { 0.0 };
        }
        let done = self.subgoals.iter().filter(|s| s.is_completed).count();
        done as f64 / self.subgoals.len() as f64 * 100.0
    }

    /// Incomplete, not yet penalized, and past `deadline + grace`.
    pub fn penalty_due(&self, now: DateTime<Utc>) -> bool {
        if self.is_completed || self.penalty_applied {
            return false;
        }
        // A deadline too close to the end of time never comes due.
        self.deadline
            .checked_add_signed(deadline_grace())
            .is_some_and(|due| now > due)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn mark_penalized(&mut self) {
        self.penalty_applied = true;
    }

    /// Mark done and keep the hero's pre-reward state for undo.
    pub fn complete(&mut self, snapshot: ProgressSnapshot) -> Result<(), DomainError> {
        if self.is_completed {
            return Err(DomainError::invalid_state_transition(
                "Goal is already completed",
            ));
        }
        self.is_completed = true;
        self.snapshot = Some(snapshot);
        Ok(())
    }

    /// Flip back to incomplete, handing back whatever is needed to roll the hero back.
    pub fn reopen(&mut self) -> Result<Reopened, DomainError> {
        if !self.is_completed {
            return Err(DomainError::invalid_state_transition(
                "Goal is not completed",
            ));
        }
        self.is_completed = false;
        Ok(match self.snapshot.take() {
            Some(snapshot) => Reopened::FromSnapshot(snapshot),
            None => Reopened::WithoutSnapshot {
                xp: self.difficulty.reward_xp(),
                gold: self.difficulty.reward_gold(),
            },
        })
    }

    /// Apply field edits. Difficulty is frozen once the goal is completed.
    pub fn edit(&mut self, edit: GoalEdit) -> Result<(), DomainError> {
        if self.is_completed && edit.difficulty.is_some_and(|d| d != self.difficulty) {
            return Err(DomainError::invalid_state_transition(
                "Cannot change the difficulty of a completed goal",
            ));
        }
        if let Some(title) = edit.title {
            self.title = title;
        }
        if let Some(description) = edit.description {
            self.description = description;
        }
        if let Some(deadline) = edit.deadline {
            self.deadline = deadline;
        }
        if let Some(difficulty) = edit.difficulty {
            self.difficulty = difficulty;
        }
        Ok(())
    }

    // =========================================================================
    // Subgoals
    // =========================================================================

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.is_completed {
            return Err(DomainError::invalid_state_transition(
                "Goal is already completed",
            ));
        }
        Ok(())
    }

    fn subgoal_mut(&mut self, id: SubGoalId) -> Result<&mut SubGoal, DomainError> {
        self.subgoals
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DomainError::not_found("SubGoal", id.to_string()))
    }

    pub fn add_subgoal(
        &mut self,
        title: Title,
        description: Option<String>,
    ) -> Result<SubGoalId, DomainError> {
        self.ensure_open()?;
        let subgoal = SubGoal::new(title, description);
        let id = subgoal.id;
        self.subgoals.push(subgoal);
        Ok(id)
    }

    pub fn rename_subgoal(&mut self, id: SubGoalId, title: Title) -> Result<(), DomainError> {
        self.subgoal_mut(id)?.title = title;
        Ok(())
    }

    pub fn remove_subgoal(&mut self, id: SubGoalId) -> Result<SubGoal, DomainError> {
        self.ensure_open()?;
        let index = self
            .subgoals
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DomainError::not_found("SubGoal", id.to_string()))?;
        Ok(self.subgoals.remove(index))
    }

    /// Check or uncheck a subgoal. Returns true when every subgoal is now done.
    pub fn set_subgoal_completed(
        &mut self,
        id: SubGoalId,
        completed: bool,
    ) -> Result<bool, DomainError> {
        self.ensure_open()?;
        self.subgoal_mut(id)?.is_completed = completed;
        Ok(self.all_subgoals_done())
    }

    pub fn all_subgoals_done(&self) -> bool {
        !self.subgoals.is_empty() && self.subgoals.iter().all(|s| s.is_completed)
    }
}
