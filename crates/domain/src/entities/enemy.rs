//! Enemy entity - the single procrastination monster a hero is fighting
//!
//! Spawning is pure: the caller supplies the tier roll and level offset it
//! drew from its random source.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::EnemyDamageOutcome;
use crate::EnemyId;

/// Whether an attack is resisted by defense as a physical or a magical blow.
///
/// The defense formula treats both kinds the same; the tag drives presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    Magical,
}

impl fmt::Display for DamageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Physical => write!(f, "Physical"),
            Self::Magical => write!(f, "Magical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyRarity {
    Easy,
    Medium,
    Hard,
}

/// Fixed numbers that come with a rarity tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RarityProfile {
    pub name: &'static str,
    pub image: &'static str,
    pub hp_multiplier: f64,
    pub xp_multiplier: f64,
    pub damage_multiplier: f64,
    pub drop_chance: f64,
    pub damage_type: DamageType,
}

impl EnemyRarity {
    /// Map a 1-100 roll to a tier: `<=50` Easy, `<=85` Medium, otherwise Hard.
    pub fn from_roll(roll: i32) -> Self {
        match roll {
            i32::MIN..=50 => Self::Easy,
            51..=85 => Self::Medium,
            _ => Self::Hard,
        }
    }

    pub fn profile(&self) -> RarityProfile {
        match self {
            Self::Easy => RarityProfile {
                name: "Lazy Goblin",
                image: "goblin.png",
                hp_multiplier: 1.0,
                xp_multiplier: 1.0,
                damage_multiplier: 0.5,
                drop_chance: 0.0,
                damage_type: DamageType::Physical,
            },
            Self::Medium => RarityProfile {
                name: "Gorgon of Procrastination",
                image: "gorgon.png",
                hp_multiplier: 2.0,
                xp_multiplier: 2.0,
                damage_multiplier: 1.0,
                drop_chance: 0.05,
                damage_type: DamageType::Magical,
            },
            Self::Hard => RarityProfile {
                name: "Minotaur of Inertia",
                image: "minotaur.png",
                hp_multiplier: 4.0,
                xp_multiplier: 4.0,
                damage_multiplier: 1.5,
                drop_chance: 0.25,
                damage_type: DamageType::Physical,
            },
        }
    }
}

impl fmt::Display for EnemyRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "Easy"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

fn scaled(base: u32, level: u32, multiplier: f64) -> u32 {
    (f64::from(base) * f64::from(level) * multiplier).round() as u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    id: EnemyId,
    name: String,
    rarity: EnemyRarity,
    level: u32,
    current_hp: i32,
    max_hp: i32,
    damage: u32,
    damage_type: DamageType,
    reward_xp: u32,
    reward_gold: u32,
    drop_chance: f64,
    image: String,
}

impl Enemy {
    /// Build the enemy for a hero at `hero_level`.
    ///
    /// `tier_roll` is a 1-100 draw, `level_offset` a -2..=2 draw.
    pub fn spawn(hero_level: u32, tier_roll: i32, level_offset: i32) -> Self {
        let rarity = EnemyRarity::from_roll(tier_roll);
        let profile = rarity.profile();
        let level = (i64::from(hero_level) + i64::from(level_offset)).max(1) as u32;

        let max_hp = scaled(50, level, profile.hp_multiplier) as i32;
        let reward_xp = scaled(20, level, profile.xp_multiplier);

        Self {
            id: EnemyId::new(),
            name: profile.name.to_string(),
            rarity,
            level,
            current_hp: max_hp,
            max_hp,
            damage: scaled(5, level, profile.damage_multiplier),
            damage_type: profile.damage_type,
            reward_xp,
            reward_gold: reward_xp,
            drop_chance: profile.drop_chance,
            image: profile.image.to_string(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> EnemyId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn rarity(&self) -> EnemyRarity {
        self.rarity
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn current_hp(&self) -> i32 {
        self.current_hp
    }

    #[inline]
    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    #[inline]
    pub fn damage(&self) -> u32 {
        self.damage
    }

    #[inline]
    pub fn damage_type(&self) -> DamageType {
        self.damage_type
    }

    #[inline]
    pub fn reward_xp(&self) -> u32 {
        self.reward_xp
    }

    #[inline]
    pub fn reward_gold(&self) -> u32 {
        self.reward_gold
    }

    /// Probability in [0, 1] that a kill drops an item
    #[inline]
    pub fn drop_chance(&self) -> f64 {
        self.drop_chance
    }

    #[inline]
    pub fn image(&self) -> &str {
        &self.image
    }

    #[inline]
    pub fn is_defeated(&self) -> bool {
        self.current_hp <= 0
    }

    // =========================================================================
    // Combat
    // =========================================================================

    /// Subtract `amount` from current HP. HP may go negative.
    pub fn apply_damage(&mut self, amount: u32) -> EnemyDamageOutcome {
        let amount_i32 = i32::try_from(amount).unwrap_or(i32::MAX);
        self.current_hp = self.current_hp.saturating_sub(amount_i32);
        if self.is_defeated() {
            EnemyDamageOutcome::Defeated {
                damage_dealt: amount,
            }
        } else {
            EnemyDamageOutcome::Wounded {
                damage_dealt: amount,
                remaining_hp: self.current_hp,
            }
        }
    }
}
