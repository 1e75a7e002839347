//! Skill usage. Mana is debited before the effect resolves.

use std::sync::Arc;

use questforge_domain::combat::hero_damage;
use questforge_domain::entities::percent_of;
use questforge_domain::{DamageSplit, HealOutcome, Skill, SkillEffect};

use crate::infrastructure::ports::{HeroRepo, InventoryRepo};

use super::auth::{require_hero, SessionContext};
use super::combat::{AttackOutcome, CombatUseCases};
use super::error::GameError;
use super::inventory::equipped_bonuses;

/// A catalog entry with whether the hero can use it now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillStatus {
    pub skill: &'static Skill,
    pub unlocked: bool,
    pub affordable: bool,
}

#[derive(Debug, Clone)]
pub enum SkillEffectOutcome {
    Attack(AttackOutcome),
    Heal(HealOutcome),
    Buff { percent: u32 },
}

#[derive(Debug, Clone)]
pub struct SkillOutcome {
    pub skill: &'static Skill,
    pub mana_left: u32,
    pub effect: SkillEffectOutcome,
    pub narrative: String,
}

pub struct SkillUseCases {
    heroes: Arc<dyn HeroRepo>,
    inventory: Arc<dyn InventoryRepo>,
    combat: Arc<CombatUseCases>,
}

impl SkillUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        inventory: Arc<dyn InventoryRepo>,
        combat: Arc<CombatUseCases>,
    ) -> Self {
        Self {
            heroes,
            inventory,
            combat,
        }
    }

    pub async fn list_skills(&self, session: &SessionContext) -> Result<Vec<SkillStatus>, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        Ok(Skill::catalog()
            .iter()
            .map(|skill| SkillStatus {
                skill,
                unlocked: skill.is_unlocked_at(hero.level()),
                affordable: hero.mana() >= skill.mana_cost,
            })
            .collect())
    }

    /// Use a skill.
    ///
    /// # Errors
    ///
    /// `State` for an unknown skill, a level below the requirement or too
    /// little mana. Nothing is written in those cases.
    #[tracing::instrument(skip(self))]
    pub async fn use_skill(
        &self,
        session: &SessionContext,
        skill_id: u8,
    ) -> Result<SkillOutcome, GameError> {
        let skill = Skill::find(skill_id)
            .ok_or_else(|| GameError::state(format!("Unknown skill: {}", skill_id)))?;
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        skill.check_usable(hero.level(), hero.mana())?;
        hero.spend_mana(skill.mana_cost)?;

        let (effect, narrative) = match skill.effect {
            SkillEffect::PhysicalStrike { percent } => {
                let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
                let damage = hero_damage(&hero, &bonuses).physical;
                let strike = DamageSplit::physical(percent_of(damage, percent));
                let outcome = self.combat.attack_with(&mut hero, Some(strike)).await?;
                let narrative = format!("{}! {}", skill.name, outcome.narrative);
                (SkillEffectOutcome::Attack(outcome), narrative)
            }
            SkillEffect::ArcaneStrike { percent } => {
                let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
                let damage = hero_damage(&hero, &bonuses).magical;
                let strike = DamageSplit::magical(percent_of(damage, percent));
                let outcome = self.combat.attack_with(&mut hero, Some(strike)).await?;
                let narrative = format!("{}! {}", skill.name, outcome.narrative);
                (SkillEffectOutcome::Attack(outcome), narrative)
            }
            SkillEffect::Execute { percent } => {
                let enemy = self.combat.current_enemy_for(&hero).await?;
                let remaining = u32::try_from(enemy.current_hp()).unwrap_or(0);
                let strike = DamageSplit::physical(percent_of(remaining, percent).saturating_add(1));
                let outcome = self.combat.attack_with(&mut hero, Some(strike)).await?;
                let narrative = format!("{}! {}", skill.name, outcome.narrative);
                (SkillEffectOutcome::Attack(outcome), narrative)
            }
            SkillEffect::Heal { percent } => {
                let healed = hero.heal(percent_of(hero.max_hp(), percent));
                self.heroes.save(&hero).await?;
                let narrative = match healed {
                    HealOutcome::Healed { amount_healed, new_hp } => format!(
                        "{}! You recover {} HP ({}/{}).",
                        skill.name,
                        amount_healed,
                        new_hp,
                        hero.max_hp()
                    ),
                    HealOutcome::AlreadyFull => {
                        format!("{}! You are already at full health.", skill.name)
                    }
                };
                (SkillEffectOutcome::Heal(healed), narrative)
            }
            SkillEffect::EmpowerNextAttack { percent } => {
                hero.grant_damage_buff(percent);
                self.heroes.save(&hero).await?;
                let narrative = format!(
                    "{}! Your next attack deals {}% damage.",
                    skill.name, percent
                );
                (SkillEffectOutcome::Buff { percent }, narrative)
            }
        };

        tracing::info!(skill = skill.name, mana_left = hero.mana(), "Skill used");
        Ok(SkillOutcome {
            skill,
            mana_left: hero.mana(),
            effect,
            narrative,
        })
    }
}
