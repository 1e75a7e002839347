//! Use cases - player actions orchestrated across the ports.
//!
//! Each module owns one concern. Modules that need another concern hold it
//! explicitly (skills and quests hold the combat use cases) rather than
//! sharing hidden state.

pub mod auth;
pub mod combat;
pub mod error;
pub mod habits;
pub mod inventory;
pub mod maintenance;
pub mod progression;
pub mod quests;
pub mod skills;

#[cfg(test)]
pub(crate) mod test_support;

pub use auth::{AuthUseCases, RegisterHero, SessionContext};
pub use combat::{AttackOutcome, CombatUseCases, DamageTaken, KillRewards};
pub use error::GameError;
pub use habits::{FinishedDay, HabitAlert, HabitUseCases, HabitsView, NewHabit};
pub use inventory::InventoryUseCases;
pub use maintenance::{MaintenanceUseCases, TickReport};
pub use progression::ProgressionUseCases;
pub use quests::{
    sort_goals, CompletedGoal, GoalCompletion, GoalSort, NewGoal, PenaltyReport, QuestUseCases,
    Rollback, SubgoalToggle, UndoOutcome,
};
pub use skills::{SkillEffectOutcome, SkillOutcome, SkillStatus, SkillUseCases};
