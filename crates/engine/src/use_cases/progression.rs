//! Hero progression: streaks, rewards, stat points and effective stats.

use std::sync::Arc;

use questforge_domain::{EffectiveStats, Hero, LevelUpOutcome, Stat, StatAllocated, StreakUpdate};

use crate::infrastructure::ports::{ClockPort, HeroRepo, InventoryRepo};

use super::auth::{require_hero, SessionContext};
use super::error::GameError;
use super::inventory::equipped_bonuses;

pub struct ProgressionUseCases {
    heroes: Arc<dyn HeroRepo>,
    inventory: Arc<dyn InventoryRepo>,
    clock: Arc<dyn ClockPort>,
}

impl ProgressionUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        inventory: Arc<dyn InventoryRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            heroes,
            inventory,
            clock,
        }
    }

    /// Fetch the session's hero, running the daily streak check.
    pub async fn get_hero(&self, session: &SessionContext) -> Result<Hero, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        match hero.register_visit(self.clock.now()) {
            StreakUpdate::Unchanged => {}
            update => {
                tracing::info!(hero_id = %hero.id(), streak = hero.streak_days(), ?update, "Streak updated");
                self.heroes.save(&hero).await?;
            }
        }
        Ok(hero)
    }

    /// Credit XP and gold, resolve level-ups and persist.
    pub async fn add_rewards(
        &self,
        session: &SessionContext,
        xp: u32,
        gold: u32,
    ) -> Result<LevelUpOutcome, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        let outcome = hero.add_rewards(xp, gold);
        self.heroes.save(&hero).await?;
        if outcome.leveled_up() {
            tracing::info!(hero_id = %hero.id(), level = outcome.level, "Level up");
        }
        Ok(outcome)
    }

    /// Spend one stat point.
    ///
    /// # Errors
    ///
    /// `State` when the hero has no unallocated points; nothing is written.
    pub async fn allocate_stat(
        &self,
        session: &SessionContext,
        stat: Stat,
    ) -> Result<StatAllocated, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        let allocated = hero.allocate_stat(stat)?;
        self.heroes.save(&hero).await?;
        tracing::debug!(stat = stat.as_str(), value = allocated.new_value, "Stat allocated");
        Ok(allocated)
    }

    /// Base stats plus equipment, and the equipment's double-attack chance.
    pub async fn total_stats(&self, session: &SessionContext) -> Result<EffectiveStats, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
        Ok(EffectiveStats::combine(*hero.stats(), &bonuses))
    }
}
