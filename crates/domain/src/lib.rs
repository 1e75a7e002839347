//! QuestForge domain: heroes, quests, habits, enemies and the rules between them.
//!
//! Pure logic only. Randomness and time arrive as arguments; persistence lives
//! in the engine crate.

pub mod aggregates;
pub mod combat;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod value_objects;

pub use aggregates::{
    deadline_grace, xp_threshold_for, DailyState, Difficulty, Gender, Goal, GoalEdit, Habit, Hero,
    HeroClass, ProgressSnapshot, Reopened, SubGoal,
};
pub use combat::DamageSplit;
pub use entities::{
    equipment_bonuses, starter_library, AcquisitionMethod, DamageType, Enemy, EnemyRarity,
    EquipmentSlot, InventoryItem, Item, ItemType, Skill, SkillEffect, WeaponClass,
};
pub use error::DomainError;
pub use events::{
    EnemyDamageOutcome, HabitDayFinished, HealOutcome, HeroDamageOutcome, IncomingHit,
    LevelUpOutcome, RolloverOutcome, StatAllocated, StreakUpdate,
};
pub use ids::{EnemyId, GoalId, HabitId, HeroId, InventoryItemId, ItemId, SubGoalId};
pub use value_objects::{
    EffectiveStats, EquipmentBonuses, Nickname, Stat, StatBlock, TimeFrame, Title,
};
