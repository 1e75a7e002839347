//! Combat-related domain events
//!
//! These enums communicate what happened during an exchange with an enemy,
//! allowing callers to react appropriately.

use serde::{Deserialize, Serialize};

/// Outcome of an enemy attack on the hero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingHit {
    /// The dodge roll beat the enemy; no damage
    Dodged,
    /// The hero was hit for `damage` (always at least 1)
    Hit { damage: u32 },
}

/// Outcome of damage applied to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyDamageOutcome {
    /// Enemy still standing
    Wounded { damage_dealt: u32, remaining_hp: i32 },
    /// Enemy HP reached zero or below
    Defeated { damage_dealt: u32 },
}

impl EnemyDamageOutcome {
    pub fn is_defeated(&self) -> bool {
        matches!(self, Self::Defeated { .. })
    }
}
