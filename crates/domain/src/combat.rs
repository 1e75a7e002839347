//! Combat formulas
//!
//! Pure arithmetic over hero/enemy state. Every random outcome arrives as an
//! already-drawn roll so the formulas stay deterministic.

use serde::{Deserialize, Serialize};

use crate::aggregates::Hero;
use crate::entities::percent_of;
use crate::events::IncomingHit;
use crate::value_objects::{EffectiveStats, EquipmentBonuses};

/// Damage reduction per point of effective defense
pub const DEFENSE_REDUCTION_PER_POINT: u32 = 2;
/// Share of the first hit dealt again by a double attack
pub const FOLLOW_UP_PERCENT: u32 = 50;

/// Attack damage split into its two channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageSplit {
    pub physical: u32,
    pub magical: u32,
}

impl DamageSplit {
    pub fn physical(amount: u32) -> Self {
        Self {
            physical: amount,
            magical: 0,
        }
    }

    pub fn magical(amount: u32) -> Self {
        Self {
            physical: 0,
            magical: amount,
        }
    }

    #[inline]
    pub fn total(&self) -> u32 {
        self.physical.saturating_add(self.magical)
    }

    /// Scale each channel by `percent`, rounding each down.
    pub fn scaled(&self, percent: u32) -> Self {
        Self {
            physical: percent_of(self.physical, percent),
            magical: percent_of(self.magical, percent),
        }
    }
}

/// A hero's full attack:
/// physical = base + 2 * effective STR + equipment base damage,
/// magical = 2 * effective INT.
pub fn hero_damage(hero: &Hero, bonuses: &EquipmentBonuses) -> DamageSplit {
    let effective = EffectiveStats::combine(*hero.stats(), bonuses);
    DamageSplit {
        physical: hero
            .base_damage()
            .saturating_add(effective.stats.strength.saturating_mul(2))
            .saturating_add(bonuses.base_damage),
        magical: effective.stats.intellect.saturating_mul(2),
    }
}

/// Resolve an enemy blow against the hero.
///
/// `dodge_roll` is uniform in [0, 100); the hero dodges when it is below
/// effective dexterity. Otherwise damage is reduced by defense with a floor of 1.
pub fn resolve_incoming_hit(
    enemy_damage: u32,
    effective: &EffectiveStats,
    dodge_roll: f64,
) -> IncomingHit {
    if dodge_roll < f64::from(effective.stats.dexterity) {
        return IncomingHit::Dodged;
    }
    let reduction = effective
        .stats
        .defense
        .saturating_mul(DEFENSE_REDUCTION_PER_POINT);
    IncomingHit::Hit {
        damage: enemy_damage.saturating_sub(reduction).max(1),
    }
}

/// A 1-100 roll at or under the chance triggers a follow-up hit.
#[inline]
pub fn double_attack_triggers(chance: u32, roll: i32) -> bool {
    roll >= 1 && i64::from(roll) <= i64::from(chance)
}

/// The follow-up hit is half of the first, per channel.
#[inline]
pub fn follow_up(first: &DamageSplit) -> DamageSplit {
    first.scaled(FOLLOW_UP_PERCENT)
}

/// `roll` uniform in [0, 1); the item drops when it is below the chance.
#[inline]
pub fn loot_drops(drop_chance: f64, roll: f64) -> bool {
    roll < drop_chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::{Gender, HeroClass};
    use crate::value_objects::{Nickname, StatBlock};
    use chrono::{TimeZone, Utc};

    fn hero_with(stats: StatBlock) -> Hero {
        Hero::new(
            Nickname::new("Borin").unwrap(),
            HeroClass::Warrior,
            Gender::Male,
            "",
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        )
        .with_stats(stats)
    }

    fn effective(dexterity: u32, defense: u32) -> EffectiveStats {
        EffectiveStats {
            stats: StatBlock {
                dexterity,
                defense,
                ..Default::default()
            },
            double_attack_chance: 0,
        }
    }

    #[test]
    fn damage_with_equipment() {
        let hero = hero_with(StatBlock {
            strength: 3,
            intellect: 2,
            ..Default::default()
        });
        let bonuses = EquipmentBonuses {
            stats: StatBlock {
                strength: 2,
                intellect: 1,
                ..Default::default()
            },
            base_damage: 4,
            double_attack_chance: 0,
        };

        let split = hero_damage(&hero, &bonuses);
        assert_eq!(split.physical, 15 + 10 + 4);
        assert_eq!(split.magical, 6);
        assert_eq!(split.total(), 35);
    }

    #[test]
    fn fresh_hero_hits_for_base_damage() {
        let hero = hero_with(StatBlock::default());
        let split = hero_damage(&hero, &EquipmentBonuses::default());
        assert_eq!(split, DamageSplit::physical(15));
    }

    #[test]
    fn dodge_below_dexterity() {
        assert_eq!(
            resolve_incoming_hit(30, &effective(10, 0), 9.99),
            IncomingHit::Dodged
        );
        assert_eq!(
            resolve_incoming_hit(30, &effective(10, 0), 10.0),
            IncomingHit::Hit { damage: 30 }
        );
    }

    #[test]
    fn hundred_dexterity_always_dodges() {
        for roll in [0.0, 50.0, 99.999] {
            assert_eq!(
                resolve_incoming_hit(500, &effective(100, 0), roll),
                IncomingHit::Dodged
            );
        }
    }

    #[test]
    fn defense_reduces_to_minimum_of_one() {
        assert_eq!(
            resolve_incoming_hit(15, &effective(0, 4), 50.0),
            IncomingHit::Hit { damage: 7 }
        );
        assert_eq!(
            resolve_incoming_hit(15, &effective(0, 50), 50.0),
            IncomingHit::Hit { damage: 1 }
        );
    }

    #[test]
    fn double_attack_rolls() {
        assert!(!double_attack_triggers(0, 1));
        assert!(double_attack_triggers(15, 15));
        assert!(!double_attack_triggers(15, 16));
        assert!(double_attack_triggers(100, 100));
    }

    #[test]
    fn follow_up_is_half_per_channel() {
        let first = DamageSplit {
            physical: 29,
            magical: 7,
        };
        assert_eq!(
            follow_up(&first),
            DamageSplit {
                physical: 14,
                magical: 3
            }
        );
    }

    #[test]
    fn loot_roll_threshold() {
        assert!(!loot_drops(0.0, 0.0));
        assert!(loot_drops(0.25, 0.24));
        assert!(!loot_drops(0.25, 0.25));
    }
}
