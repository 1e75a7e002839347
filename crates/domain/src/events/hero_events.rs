//! Hero-related domain events
//!
//! These enums communicate what happened when hero state was modified,
//! allowing callers to react appropriately.

use serde::{Deserialize, Serialize};

use crate::value_objects::Stat;

/// Result of resolving accumulated XP against the level threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelUpOutcome {
    /// Levels gained by this resolution (0 when nothing happened)
    pub levels_gained: u32,
    /// Level after resolution
    pub level: u32,
}

impl LevelUpOutcome {
    pub fn leveled_up(&self) -> bool {
        self.levels_gained > 0
    }
}

/// Outcome of the first visit on a calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreakUpdate {
    /// Same calendar day as the last visit
    Unchanged,
    /// Visited on consecutive days
    Extended { streak_days: u32 },
    /// A day was skipped; streak restarts at 1
    Reset,
}

/// Outcome of the hero taking damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeroDamageOutcome {
    /// HP dropped but stayed above zero
    Wounded { damage_dealt: u32, remaining_hp: u32 },
    /// HP reached zero
    Exhausted { damage_dealt: u32 },
}

/// Outcome of healing the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealOutcome {
    /// Healing applied
    Healed { amount_healed: u32, new_hp: u32 },
    /// Already at max HP
    AlreadyFull,
}

/// A stat point was spent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatAllocated {
    pub stat: Stat,
    pub new_value: u32,
    pub stat_points_left: u32,
}
