//! Skill catalog - five fixed abilities unlocked by level, paid for with mana

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// What a skill does when used. Percentages are whole numbers (75 = 75%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillEffect {
    /// Attack with a share of physical damage
    PhysicalStrike { percent: u32 },
    /// Attack with a share of magical damage
    ArcaneStrike { percent: u32 },
    /// Restore a share of max HP
    Heal { percent: u32 },
    /// Multiply the next attack's damage
    EmpowerNextAttack { percent: u32 },
    /// Deal a share of the enemy's current HP, plus one, as physical damage
    Execute { percent: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub level_requirement: u32,
    pub mana_cost: u32,
    pub effect: SkillEffect,
}

const CATALOG: [Skill; 5] = [
    Skill {
        id: 1,
        name: "Power Strike",
        description: "Deals 75% of physical damage",
        level_requirement: 5,
        mana_cost: 5,
        effect: SkillEffect::PhysicalStrike { percent: 75 },
    },
    Skill {
        id: 2,
        name: "Arcane Bolt",
        description: "Deals 75% of magical damage",
        level_requirement: 10,
        mana_cost: 5,
        effect: SkillEffect::ArcaneStrike { percent: 75 },
    },
    Skill {
        id: 3,
        name: "Second Wind",
        description: "Heals 25% of max HP",
        level_requirement: 15,
        mana_cost: 10,
        effect: SkillEffect::Heal { percent: 25 },
    },
    Skill {
        id: 4,
        name: "Battle Cry",
        description: "Next attack deals +50% damage",
        level_requirement: 20,
        mana_cost: 15,
        effect: SkillEffect::EmpowerNextAttack { percent: 150 },
    },
    Skill {
        id: 5,
        name: "Execute",
        description: "Deals 50% of the enemy's current HP plus one",
        level_requirement: 25,
        mana_cost: 20,
        effect: SkillEffect::Execute { percent: 50 },
    },
];

impl Skill {
    pub fn catalog() -> &'static [Skill] {
        &CATALOG
    }

    pub fn find(id: u8) -> Option<&'static Skill> {
        CATALOG.iter().find(|skill| skill.id == id)
    }

    /// Level and mana gate. Checks level first.
    pub fn check_usable(&self, hero_level: u32, hero_mana: u32) -> Result<(), DomainError> {
        if hero_level < self.level_requirement {
            return Err(DomainError::constraint(format!(
                "{} requires level {}",
                self.name, self.level_requirement
            )));
        }
        if hero_mana < self.mana_cost {
            return Err(DomainError::constraint(format!(
                "Not enough mana for {}: {} required",
                self.name, self.mana_cost
            )));
        }
        Ok(())
    }

    pub fn is_unlocked_at(&self, hero_level: u32) -> bool {
        hero_level >= self.level_requirement
    }
}

/// `value * percent / 100`, rounded down.
pub fn percent_of(value: u32, percent: u32) -> u32 {
    (u64::from(value) * u64::from(percent) / 100) as u32
}
