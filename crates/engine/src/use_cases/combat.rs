//! Combat resolution against the hero's current enemy.
//!
//! Persistence order on a kill: hero rewards first, then loot, then the dead
//! enemy is removed and a replacement saved. A failure part-way leaves the old
//! enemy in place rather than a hero without rewards.

use std::sync::Arc;

use questforge_domain::combat::{
    double_attack_triggers, follow_up, hero_damage, loot_drops, resolve_incoming_hit,
};
use questforge_domain::{
    AcquisitionMethod, DamageSplit, DamageType, EffectiveStats, Enemy, Hero, HeroId,
    IncomingHit, InventoryItem, LevelUpOutcome,
};

use crate::infrastructure::ports::{
    ClockPort, EnemyRepo, HeroRepo, InventoryRepo, ItemLibraryRepo, RandomPort,
};

use super::auth::{require_hero, SessionContext};
use super::error::GameError;
use super::inventory::equipped_bonuses;

/// Rewards granted for a kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KillRewards {
    pub xp: u32,
    pub gold: u32,
    pub level_up: LevelUpOutcome,
}

/// Everything that happened during one attack.
#[derive(Debug, Clone)]
pub struct AttackOutcome {
    pub enemy_name: String,
    pub first_hit: DamageSplit,
    /// Second hit from the double-attack chance
    pub follow_up: Option<DamageSplit>,
    /// Damage multiplier consumed by this attack
    pub buff_percent: Option<u32>,
    pub enemy_defeated: bool,
    pub rewards: Option<KillRewards>,
    pub loot: Option<InventoryItem>,
    pub loot_text: Option<String>,
    /// Enemy spawned to replace a defeated one
    pub next_enemy: Option<Enemy>,
    pub narrative: String,
}

impl AttackOutcome {
    pub fn total_damage(&self) -> u32 {
        let extra = self.follow_up.map_or(0, |hit| hit.total());
        self.first_hit.total().saturating_add(extra)
    }
}

/// The result of an enemy blow against the hero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DamageTaken {
    pub enemy_name: String,
    pub damage_type: DamageType,
    pub hit: IncomingHit,
    pub hero_hp: u32,
    pub narrative: String,
}

pub struct CombatUseCases {
    heroes: Arc<dyn HeroRepo>,
    enemies: Arc<dyn EnemyRepo>,
    inventory: Arc<dyn InventoryRepo>,
    library: Arc<dyn ItemLibraryRepo>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
}

impl CombatUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        enemies: Arc<dyn EnemyRepo>,
        inventory: Arc<dyn InventoryRepo>,
        library: Arc<dyn ItemLibraryRepo>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            heroes,
            enemies,
            inventory,
            library,
            random,
            clock,
        }
    }

    // =========================================================================
    // Enemies
    // =========================================================================

    /// Roll a tier and a level offset for a hero at `hero_level`.
    pub fn generate_enemy(&self, hero_level: u32) -> Enemy {
        let tier_roll = self.random.gen_range(1, 100);
        let level_offset = self.random.gen_range(-2, 2);
        let enemy = Enemy::spawn(hero_level, tier_roll, level_offset);
        tracing::debug!(tier_roll, level_offset, rarity = %enemy.rarity(), level = enemy.level(), "Enemy generated");
        enemy
    }

    pub async fn current_enemy(&self, session: &SessionContext) -> Result<Enemy, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        self.current_enemy_for(&hero).await
    }

    /// The stored enemy, or a freshly generated and saved one.
    pub(crate) async fn current_enemy_for(&self, hero: &Hero) -> Result<Enemy, GameError> {
        if let Some(enemy) = self.enemies.get_current(hero.id()).await? {
            return Ok(enemy);
        }
        let enemy = self.generate_enemy(hero.level());
        self.enemies.save_current(hero.id(), &enemy).await?;
        tracing::info!(hero_id = %hero.id(), enemy = enemy.name(), level = enemy.level(), "Enemy appeared");
        Ok(enemy)
    }

    // =========================================================================
    // Damage
    // =========================================================================

    pub async fn hero_damage(&self, session: &SessionContext) -> Result<DamageSplit, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
        Ok(hero_damage(&hero, &bonuses))
    }

    /// Attack the current enemy. `None` or an all-zero split uses the hero's full damage.
    pub async fn attack(
        &self,
        session: &SessionContext,
        damage: Option<DamageSplit>,
    ) -> Result<AttackOutcome, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        self.attack_with(&mut hero, damage).await
    }

    /// Resolve an attack for an already loaded hero and persist the hero.
    ///
    /// Callers that changed the hero beforehand (mana, quest rewards) rely on
    /// this save to write those changes too.
    #[tracing::instrument(skip(self, hero), fields(hero_id = %hero.id()))]
    pub(crate) async fn attack_with(
        &self,
        hero: &mut Hero,
        requested: Option<DamageSplit>,
    ) -> Result<AttackOutcome, GameError> {
        let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
        let mut enemy = self.current_enemy_for(hero).await?;

        let base = match requested {
            Some(split) if split.total() > 0 => split,
            _ => hero_damage(hero, &bonuses),
        };
        let buff_percent = hero.consume_damage_buff();
        let first_hit = buff_percent.map_or(base, |percent| base.scaled(percent));
        enemy.apply_damage(first_hit.total());

        let roll = self.random.gen_range(1, 100);
        let follow_up_hit = double_attack_triggers(bonuses.double_attack_chance, roll)
            .then(|| follow_up(&first_hit));
        if let Some(extra) = follow_up_hit {
            enemy.apply_damage(extra.total());
        }
        tracing::debug!(roll, chance = bonuses.double_attack_chance, damage = first_hit.total(), "Attack resolved");

        let mut narrative = format!(
            "You hit {} for {} damage ({} physical, {} magical).",
            enemy.name(),
            first_hit.total(),
            first_hit.physical,
            first_hit.magical
        );
        if let Some(percent) = buff_percent {
            narrative.push_str(&format!(" Empowered at {}%.", percent));
        }
        if let Some(extra) = follow_up_hit {
            narrative.push_str(&format!(
                " Double attack! A second hit deals {} damage.",
                extra.total()
            ));
        }

        let mut outcome = AttackOutcome {
            enemy_name: enemy.name().to_string(),
            first_hit,
            follow_up: follow_up_hit,
            buff_percent,
            enemy_defeated: enemy.is_defeated(),
            rewards: None,
            loot: None,
            loot_text: None,
            next_enemy: None,
            narrative: String::new(),
        };

        if !enemy.is_defeated() {
            self.heroes.save(hero).await?;
            self.enemies.save_current(hero.id(), &enemy).await?;
            narrative.push_str(&format!(
                " {} has {} HP left.",
                enemy.name(),
                enemy.current_hp()
            ));
            outcome.narrative = narrative;
            return Ok(outcome);
        }

        let level_up = hero.add_rewards(enemy.reward_xp(), enemy.reward_gold());
        self.heroes.save(hero).await?;
        narrative.push_str(&format!(
            " {} is defeated! +{} XP, +{} gold.",
            enemy.name(),
            enemy.reward_xp(),
            enemy.reward_gold()
        ));
        if level_up.leveled_up() {
            narrative.push_str(&format!(" Level up! You are now level {}.", level_up.level));
        }
        tracing::info!(enemy = enemy.name(), xp = enemy.reward_xp(), level = hero.level(), "Enemy defeated");

        let loot = self.roll_loot(hero.id(), &enemy).await?;
        if let Some(owned) = &loot {
            let text = format!("Loot: {}", owned.item.name);
            narrative.push_str(&format!(" {}.", text));
            outcome.loot_text = Some(text);
        }

        self.enemies.delete_current(hero.id()).await?;
        let next = self.generate_enemy(hero.level());
        self.enemies.save_current(hero.id(), &next).await?;
        narrative.push_str(&format!(" A {} appears.", next.name()));

        outcome.rewards = Some(KillRewards {
            xp: enemy.reward_xp(),
            gold: enemy.reward_gold(),
            level_up,
        });
        outcome.loot = loot;
        outcome.next_enemy = Some(next);
        outcome.narrative = narrative;
        Ok(outcome)
    }

    /// Drop a random library item into the hero's inventory when the roll succeeds.
    async fn roll_loot(
        &self,
        hero_id: HeroId,
        enemy: &Enemy,
    ) -> Result<Option<InventoryItem>, GameError> {
        let roll = self.random.gen_unit();
        if !loot_drops(enemy.drop_chance(), roll) {
            return Ok(None);
        }
        let items = self.library.list().await?;
        let Some(last) = items.len().checked_sub(1) else {
            tracing::warn!("Loot dropped but the item library is empty");
            return Ok(None);
        };
        let pick = self
            .random
            .gen_range(0, i32::try_from(last).unwrap_or(i32::MAX));
        let Some(item) = usize::try_from(pick).ok().and_then(|i| items.get(i)) else {
            return Ok(None);
        };

        let owned = InventoryItem::new(
            hero_id,
            item.clone(),
            AcquisitionMethod::Looted,
            self.clock.now(),
        );
        self.inventory.add(&owned).await?;
        tracing::info!(roll, item = %owned.item.name, "Loot dropped");
        Ok(Some(owned))
    }

    /// The current enemy strikes the hero and the result is saved.
    pub async fn take_damage(&self, session: &SessionContext) -> Result<DamageTaken, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        let enemy = self.current_enemy_for(&hero).await?;
        let taken = self.strike_hero(&mut hero, &enemy).await?;
        self.heroes.save(&hero).await?;
        Ok(taken)
    }

    /// Resolve a blow from `enemy` against `hero` without saving the hero.
    pub(crate) async fn strike_hero(
        &self,
        hero: &mut Hero,
        enemy: &Enemy,
    ) -> Result<DamageTaken, GameError> {
        let bonuses = equipped_bonuses(self.inventory.as_ref(), hero.id()).await?;
        let effective = EffectiveStats::combine(*hero.stats(), &bonuses);
        let dodge_roll = self.random.gen_unit() * 100.0;
        let hit = resolve_incoming_hit(enemy.damage(), &effective, dodge_roll);

        let narrative = match hit {
            IncomingHit::Dodged => format!("You dodged the attack of {}!", enemy.name()),
            IncomingHit::Hit { damage } => {
                hero.apply_damage(damage);
                format!(
                    "{} hits you for {} {} damage.",
                    enemy.name(),
                    damage,
                    enemy.damage_type().to_string().to_lowercase()
                )
            }
        };
        tracing::debug!(dodge_roll, ?hit, hp = hero.hp(), "Enemy strike resolved");

        Ok(DamageTaken {
            enemy_name: enemy.name().to_string(),
            damage_type: enemy.damage_type(),
            hit,
            hero_hp: hero.hp(),
            narrative,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ScriptedRandom;
    use crate::infrastructure::ports::{
        MockEnemyRepo, MockHeroRepo, MockInventoryRepo, MockItemLibraryRepo, RepoError,
    };
    use crate::use_cases::test_support::Harness;
    use questforge_domain::{EnemyRarity, StatBlock};

    #[tokio::test]
    async fn first_access_spawns_and_keeps_an_enemy() {
        // tier 1 -> Easy, offset -2 floors at level 1
        let h = Harness::with_random(ScriptedRandom::new([1, -2], [])).await;
        let session = h.register("Tor").await;

        let combat = &h.app.use_cases.combat;
        let enemy = combat.current_enemy(&session).await.unwrap();
        assert_eq!(enemy.rarity(), EnemyRarity::Easy);
        assert_eq!(enemy.level(), 1);
        assert_eq!(enemy.current_hp(), enemy.max_hp());

        let again = combat.current_enemy(&session).await.unwrap();
        assert_eq!(again.id(), enemy.id());
    }

    #[tokio::test]
    async fn wounding_keeps_the_enemy() {
        // spawn Easy level 1 (50 hp); no double attack
        let h = Harness::with_random(ScriptedRandom::new([1, 0, 100], [])).await;
        let session = h.register("Tor").await;

        let outcome = h.app.use_cases.combat.attack(&session, None).await.unwrap();
        assert!(!outcome.enemy_defeated);
        assert_eq!(outcome.first_hit, DamageSplit::physical(15));
        assert!(outcome.follow_up.is_none());

        let enemy = h.app.use_cases.combat.current_enemy(&session).await.unwrap();
        assert_eq!(enemy.current_hp(), 35);
    }

    #[tokio::test]
    async fn kill_rewards_then_respawns() {
        // spawn Easy lvl 1, double-attack roll, respawn Hard lvl 1
        let h = Harness::with_random(ScriptedRandom::new([1, 0, 100, 90, 0], [0.5])).await;
        let session = h.register("Tor").await;

        let outcome = h
            .app
            .use_cases
            .combat
            .attack(&session, Some(DamageSplit::physical(60)))
            .await
            .unwrap();

        assert!(outcome.enemy_defeated);
        let rewards = outcome.rewards.unwrap();
        assert_eq!((rewards.xp, rewards.gold), (20, 20));
        assert!(outcome.loot.is_none());

        let hero = h.hero(&session).await;
        assert_eq!((hero.current_xp(), hero.gold()), (20, 20));

        let next = h.app.use_cases.combat.current_enemy(&session).await.unwrap();
        assert_eq!(next.rarity(), EnemyRarity::Hard);
        assert_eq!(Some(next.id()), outcome.next_enemy.map(|e| e.id()));
        assert_eq!(next.current_hp(), next.max_hp());
    }

    #[tokio::test]
    async fn kill_can_drop_loot() {
        // spawn Hard lvl 1 (200 hp, 25% drop), kill, loot roll hits, pick item 3
        let h = Harness::with_random(ScriptedRandom::new([95, 0, 100, 3, 1, 0], [0.1])).await;
        let session = h.register("Tor").await;
        let library = h.library().await;

        let outcome = h
            .app
            .use_cases
            .combat
            .attack(&session, Some(DamageSplit::magical(500)))
            .await
            .unwrap();

        assert!(outcome.enemy_defeated);
        let loot = outcome.loot.unwrap();
        assert_eq!(loot.item.id, library[3].id);
        assert_eq!(loot.acquisition_method, AcquisitionMethod::Looted);
        assert_eq!(outcome.loot_text.as_deref(), Some("Loot: Twin Daggers"));

        let owned = h.app.use_cases.inventory.list_inventory(&session).await.unwrap();
        assert_eq!(owned.len(), 1);
    }

    #[tokio::test]
    async fn double_attack_adds_half_a_hit() {
        // spawn Hard lvl 1, double-attack roll 10 <= 15
        let h = Harness::with_random(ScriptedRandom::new([95, 0, 10], [])).await;
        let session = h.register("Tor").await;
        let library = h.library().await;
        let daggers = h
            .app
            .use_cases
            .inventory
            .acquire(&session, library[3].id, AcquisitionMethod::Granted)
            .await
            .unwrap();
        h.app
            .use_cases
            .inventory
            .equip(&session, daggers.id, daggers.slot())
            .await
            .unwrap();

        let outcome = h
            .app
            .use_cases
            .combat
            .attack(&session, Some(DamageSplit::physical(40)))
            .await
            .unwrap();
        assert_eq!(outcome.follow_up, Some(DamageSplit::physical(20)));
        assert_eq!(outcome.total_damage(), 60);

        let enemy = h.app.use_cases.combat.current_enemy(&session).await.unwrap();
        assert_eq!(enemy.current_hp(), 140);
    }

    #[tokio::test]
    async fn pending_buff_scales_the_next_attack_once() {
        let h = Harness::with_random(ScriptedRandom::new([95, 0, 100, 100], [])).await;
        let mut hero = Harness::sample_hero();
        hero.grant_damage_buff(150);
        h.store.create(&hero).await.unwrap();
        let session = SessionContext::new(hero.id());

        let combat = &h.app.use_cases.combat;
        let first = combat.attack(&session, Some(DamageSplit::physical(20))).await.unwrap();
        assert_eq!(first.first_hit, DamageSplit::physical(30));
        assert_eq!(first.buff_percent, Some(150));

        let second = combat.attack(&session, Some(DamageSplit::physical(20))).await.unwrap();
        assert_eq!(second.first_hit, DamageSplit::physical(20));
        assert_eq!(h.hero(&session).await.damage_buff_percent(), None);
    }

    #[tokio::test]
    async fn dodge_leaves_hp_untouched() {
        // spawn Hard lvl 1 (damage 8); dodge roll 30 < 50 DEX
        let h = Harness::with_random(ScriptedRandom::new([95, 0], [0.3])).await;
        let hero = Harness::sample_hero().with_stats(StatBlock {
            dexterity: 50,
            ..StatBlock::default()
        });
        h.store.create(&hero).await.unwrap();
        let session = SessionContext::new(hero.id());

        let taken = h.app.use_cases.combat.take_damage(&session).await.unwrap();
        assert_eq!(taken.hit, IncomingHit::Dodged);
        assert_eq!(taken.hero_hp, hero.max_hp());
    }

    #[tokio::test]
    async fn defense_reduces_but_never_negates() {
        // spawn Hard lvl 1 (damage 8); roll 70 >= 0 DEX
        let h = Harness::with_random(ScriptedRandom::new([95, 0], [0.7, 0.7])).await;
        let hero = Harness::sample_hero().with_stats(StatBlock {
            defense: 3,
            ..StatBlock::default()
        });
        h.store.create(&hero).await.unwrap();
        let session = SessionContext::new(hero.id());

        let taken = h.app.use_cases.combat.take_damage(&session).await.unwrap();
        assert_eq!(taken.hit, IncomingHit::Hit { damage: 2 });
        assert_eq!(taken.hero_hp, hero.max_hp() - 2);

        let tank = Harness::sample_hero().with_stats(StatBlock {
            defense: 50,
            ..StatBlock::default()
        });
        h.store.create(&tank).await.unwrap();
        let taken = h
            .app
            .use_cases
            .combat
            .take_damage(&SessionContext::new(tank.id()))
            .await
            .unwrap();
        assert_eq!(taken.hit, IncomingHit::Hit { damage: 1 });
    }

    #[tokio::test]
    async fn failed_reward_save_keeps_the_dead_enemy_record() {
        let hero = Harness::sample_hero();
        let session = SessionContext::new(hero.id());

        let mut heroes = MockHeroRepo::new();
        heroes
            .expect_get()
            .returning(move |_| Ok(Some(hero.clone())));
        heroes
            .expect_save()
            .returning(|_| Err(RepoError::database("hero.save", "locked")));

        let mut enemies = MockEnemyRepo::new();
        enemies
            .expect_get_current()
            .returning(|_| Ok(Some(Enemy::spawn(1, 1, 0))));
        enemies.expect_delete_current().never();
        enemies.expect_save_current().never();

        let mut inventory = MockInventoryRepo::new();
        inventory.expect_list_for_hero().returning(|_| Ok(vec![]));

        let combat = CombatUseCases::new(
            Arc::new(heroes),
            Arc::new(enemies),
            Arc::new(inventory),
            Arc::new(MockItemLibraryRepo::new()),
            Arc::new(ScriptedRandom::quiet()),
            Harness::clock(),
        );

        let err = combat
            .attack(&session, Some(DamageSplit::physical(500)))
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Repo(_)));
    }
}
