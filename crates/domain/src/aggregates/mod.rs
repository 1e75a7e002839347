//! Aggregate roots - domain objects that own their related data
//!
//! Each aggregate:
//! - Has a unique identity
//! - Owns all its constituent parts (enforced by Rust ownership)
//! - Exposes behavior through methods, not public fields
//! - Returns domain events from mutations
//!
//! # Rustic DDD Principles
//!
//! | Concern | Approach |
//! |---------|----------|
//! | Validated fields | Newtypes valid by construction (`Nickname`, `Title`) |
//! | Derived stats | Private fields, recomputed inside the mutating method |
//! | Factory pattern | `::new()` + builder pattern |
//! | Domain Events | Return enums from mutations |

pub mod goal;
pub mod habit;
pub mod hero;

pub use goal::{deadline_grace, Difficulty, Goal, GoalEdit, Reopened, SubGoal, DEADLINE_GRACE_MINUTES};
pub use habit::{
    DailyState, Habit, CHECKIN_GOLD, CHECKIN_XP, FINAL_BONUS_GOLD_PER_DAY, FINAL_BONUS_XP_PER_DAY,
};
pub use hero::{xp_threshold_for, Gender, Hero, HeroClass, ProgressSnapshot};
