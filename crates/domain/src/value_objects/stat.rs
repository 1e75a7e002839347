//! Stat value objects - the five allocatable hero stats and their aggregates.
//!
//! Provides type safety for stat references instead of using magic strings like "STR", "DEX".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use crate::error::DomainError;

/// The five hero stats that stat points can be spent on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stat {
    /// Strength - +2 physical damage per point
    Str,
    /// Intellect - +2 magical damage and +5 max mana per point
    Int,
    /// Dexterity - +1% dodge chance per point
    Dex,
    /// Vitality - +5 max HP per point
    Vit,
    /// Defense - -2 incoming damage per point
    Def,
}

impl Stat {
    /// Returns the short uppercase string representation (e.g., "STR", "DEX").
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Str => "STR",
            Self::Int => "INT",
            Self::Dex => "DEX",
            Self::Vit => "VIT",
            Self::Def => "DEF",
        }
    }

    /// Returns all five stats in display order.
    pub fn all() -> [Stat; 5] {
        [Self::Str, Self::Int, Self::Dex, Self::Vit, Self::Def]
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Stat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STR" | "STRENGTH" => Ok(Self::Str),
            "INT" | "INTELLECT" | "INTELLIGENCE" => Ok(Self::Int),
            "DEX" | "DEXTERITY" => Ok(Self::Dex),
            "VIT" | "VITALITY" => Ok(Self::Vit),
            "DEF" | "DEFENSE" | "DEFENCE" => Ok(Self::Def),
            _ => Err(DomainError::parse(format!("Unknown stat: {}", s))),
        }
    }
}

/// One value per stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub strength: u32,
    pub intellect: u32,
    pub dexterity: u32,
    pub vitality: u32,
    pub defense: u32,
}

impl StatBlock {
    pub fn get(&self, stat: Stat) -> u32 {
        match stat {
            Stat::Str => self.strength,
            Stat::Int => self.intellect,
            Stat::Dex => self.dexterity,
            Stat::Vit => self.vitality,
            Stat::Def => self.defense,
        }
    }

    pub fn get_mut(&mut self, stat: Stat) -> &mut u32 {
        match stat {
            Stat::Str => &mut self.strength,
            Stat::Int => &mut self.intellect,
            Stat::Dex => &mut self.dexterity,
            Stat::Vit => &mut self.vitality,
            Stat::Def => &mut self.defense,
        }
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        StatBlock {
            strength: self.strength + rhs.strength,
            intellect: self.intellect + rhs.intellect,
            dexterity: self.dexterity + rhs.dexterity,
            vitality: self.vitality + rhs.vitality,
            defense: self.defense + rhs.defense,
        }
    }
}

/// Sum of everything the hero currently has equipped.
///
/// Always recomputed from the equipped set, never cached on the hero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentBonuses {
    pub stats: StatBlock,
    /// Flat physical damage from weapons
    pub base_damage: u32,
    /// Percentage chance (1-100 roll) of a follow-up hit
    pub double_attack_chance: u32,
}

impl Add for EquipmentBonuses {
    type Output = EquipmentBonuses;

    fn add(self, rhs: EquipmentBonuses) -> EquipmentBonuses {
        EquipmentBonuses {
            stats: self.stats + rhs.stats,
            base_damage: self.base_damage + rhs.base_damage,
            double_attack_chance: self.double_attack_chance + rhs.double_attack_chance,
        }
    }
}

impl Sum for EquipmentBonuses {
    fn sum<I: Iterator<Item = EquipmentBonuses>>(iter: I) -> Self {
        iter.fold(EquipmentBonuses::default(), Add::add)
    }
}

/// Base stats plus equipment bonuses of the same kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveStats {
    pub stats: StatBlock,
    pub double_attack_chance: u32,
}

impl EffectiveStats {
    pub fn combine(base: StatBlock, bonuses: &EquipmentBonuses) -> Self {
        Self {
            stats: base + bonuses.stats,
            double_attack_chance: bonuses.double_attack_chance,
        }
    }

    pub fn get(&self, stat: Stat) -> u32 {
        self.stats.get(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_from_str() {
        assert_eq!(Stat::from_str("STR"), Ok(Stat::Str));
        assert_eq!(Stat::from_str("str"), Ok(Stat::Str));
        assert_eq!(Stat::from_str("Vitality"), Ok(Stat::Vit));
        assert_eq!(Stat::from_str("defence"), Ok(Stat::Def));
        assert!(Stat::from_str("LUCK").is_err());
    }

    #[test]
    fn test_stat_serde_uses_short_names() {
        let json = serde_json::to_string(&Stat::Dex).unwrap();
        assert_eq!(json, "\"DEX\"");
    }

    #[test]
    fn bonuses_sum_per_stat() {
        let sword = EquipmentBonuses {
            stats: StatBlock {
                strength: 5,
                ..Default::default()
            },
            base_damage: 4,
            double_attack_chance: 10,
        };
        let helm = EquipmentBonuses {
            stats: StatBlock {
                defense: 2,
                ..Default::default()
            },
            ..Default::default()
        };

        let total: EquipmentBonuses = [sword, helm].into_iter().sum();
        assert_eq!(total.stats.strength, 5);
        assert_eq!(total.stats.defense, 2);
        assert_eq!(total.base_damage, 4);
        assert_eq!(total.double_attack_chance, 10);
    }

    #[test]
    fn effective_stats_add_equipment_to_base() {
        let base = StatBlock {
            dexterity: 3,
            ..Default::default()
        };
        let bonuses = EquipmentBonuses {
            stats: StatBlock {
                dexterity: 1,
                ..Default::default()
            },
            double_attack_chance: 15,
            ..Default::default()
        };
        let effective = EffectiveStats::combine(base, &bonuses);
        assert_eq!(effective.get(Stat::Dex), 4);
        assert_eq!(effective.double_attack_chance, 15);
    }
}
