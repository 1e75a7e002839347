//! Hero aggregate - the player's avatar, one per account
//!
//! # Rustic DDD Design
//!
//! - **Private fields**: derived stats (`max_hp`, `max_mana`) can only change
//!   through methods that keep them consistent with vitality/intellect
//! - **Newtypes**: `Nickname` for the validated, unique display name
//! - **Domain events**: mutations return outcome values (`LevelUpOutcome`, `HealOutcome`, ...)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::events::{HealOutcome, HeroDamageOutcome, LevelUpOutcome, StatAllocated, StreakUpdate};
use crate::value_objects::{Nickname, Stat, StatBlock};
use crate::HeroId;

/// Max HP with zero vitality
pub const BASE_MAX_HP: u32 = 100;
/// Max HP gained per vitality point
pub const HP_PER_VITALITY: u32 = 5;
/// Max mana with zero intellect
pub const BASE_MAX_MANA: u32 = 10;
/// Max mana gained per intellect point
pub const MANA_PER_INTELLECT: u32 = 5;
/// Base physical damage of a fresh hero
pub const BASE_DAMAGE: u32 = 15;
/// XP needed to leave level 1
pub const STARTING_XP_THRESHOLD: u32 = 100;

/// XP required to advance past `level`: `floor(level * 100 * 1.5)`.
pub fn xp_threshold_for(level: u32) -> u32 {
    level.saturating_mul(150)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeroClass {
    Warrior,
    Archer,
    Mage,
    Rogue,
}

impl fmt::Display for HeroClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warrior => write!(f, "Warrior"),
            Self::Archer => write!(f, "Archer"),
            Self::Mage => write!(f, "Mage"),
            Self::Rogue => write!(f, "Rogue"),
        }
    }
}

impl FromStr for HeroClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warrior" => Ok(Self::Warrior),
            "archer" => Ok(Self::Archer),
            "mage" => Ok(Self::Mage),
            "rogue" => Ok(Self::Rogue),
            _ => Err(DomainError::parse(format!("Unknown hero class: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Male => write!(f, "Male"),
            Self::Female => write!(f, "Female"),
        }
    }
}

impl FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(DomainError::parse(format!("Unknown gender: {}", s))),
        }
    }
}

/// Numeric hero state captured before a quest reward, restored verbatim on undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub current_xp: u32,
    pub xp_to_next_level: u32,
    pub gold: u32,
    pub hp: u32,
    pub mana: u32,
    pub stat_points: u32,
    pub stats: StatBlock,
}

/// The player's hero.
///
/// # Invariants
///
/// - `max_hp == 100 + vitality * 5` and `max_mana == 10 + intellect * 5`
/// - `hp <= max_hp` and `mana <= max_mana`
/// - `current_xp < xp_to_next_level` after every public mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    id: HeroId,
    nickname: Nickname,
    class: HeroClass,
    gender: Gender,
    appearance: String,

    level: u32,
    current_xp: u32,
    xp_to_next_level: u32,
    gold: u32,
    streak_days: u32,

    hp: u32,
    max_hp: u32,
    mana: u32,
    max_mana: u32,

    stat_points: u32,
    stats: StatBlock,
    base_damage: u32,
    /// Damage multiplier (percent) waiting to be consumed by the next attack
    damage_buff_percent: Option<u32>,

    last_login: DateTime<Utc>,
}

impl Hero {
    // =========================================================================
    // Constructor
    // =========================================================================

    /// Create a freshly registered hero with full HP and mana.
    pub fn new(
        nickname: Nickname,
        class: HeroClass,
        gender: Gender,
        appearance: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut hero = Self {
            id: HeroId::new(),
            nickname,
            class,
            gender,
            appearance: appearance.into(),
            level: 1,
            current_xp: 0,
            xp_to_next_level: STARTING_XP_THRESHOLD,
            gold: 0,
            streak_days: 0,
            hp: BASE_MAX_HP,
            max_hp: BASE_MAX_HP,
            mana: BASE_MAX_MANA,
            max_mana: BASE_MAX_MANA,
            stat_points: 0,
            stats: StatBlock::default(),
            base_damage: BASE_DAMAGE,
            damage_buff_percent: None,
            last_login: now,
        };
        hero.recompute_derived_stats();
        hero.restore_vitals();
        hero
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> HeroId {
        self.id
    }

    #[inline]
    pub fn nickname(&self) -> &Nickname {
        &self.nickname
    }

    #[inline]
    pub fn class(&self) -> HeroClass {
        self.class
    }

    #[inline]
    pub fn gender(&self) -> Gender {
        self.gender
    }

    #[inline]
    pub fn appearance(&self) -> &str {
        &self.appearance
    }

    #[inline]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[inline]
    pub fn current_xp(&self) -> u32 {
        self.current_xp
    }

    #[inline]
    pub fn xp_to_next_level(&self) -> u32 {
        self.xp_to_next_level
    }

    #[inline]
    pub fn gold(&self) -> u32 {
        self.gold
    }

    #[inline]
    pub fn streak_days(&self) -> u32 {
        self.streak_days
    }

    #[inline]
    pub fn hp(&self) -> u32 {
        self.hp
    }

    #[inline]
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    #[inline]
    pub fn mana(&self) -> u32 {
        self.mana
    }

    #[inline]
    pub fn max_mana(&self) -> u32 {
        self.max_mana
    }

    #[inline]
    pub fn stat_points(&self) -> u32 {
        self.stat_points
    }

    /// Allocated stats, without equipment.
    #[inline]
    pub fn stats(&self) -> &StatBlock {
        &self.stats
    }

    #[inline]
    pub fn base_damage(&self) -> u32 {
        self.base_damage
    }

    #[inline]
    pub fn damage_buff_percent(&self) -> Option<u32> {
        self.damage_buff_percent
    }

    #[inline]
    pub fn last_login(&self) -> DateTime<Utc> {
        self.last_login
    }

    // =========================================================================
    // Builder Methods
    // =========================================================================

    pub fn with_id(mut self, id: HeroId) -> Self {
        self.id = id;
        self
    }

    /// Replace allocated stats; derived stats are recomputed and vitals refilled.
    pub fn with_stats(mut self, stats: StatBlock) -> Self {
        self.stats = stats;
        self.recompute_derived_stats();
        self.restore_vitals();
        self
    }

    /// Jump straight to `level` with the matching XP threshold and no XP.
    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self.current_xp = 0;
        self.xp_to_next_level = if self.level == 1 {
            STARTING_XP_THRESHOLD
        } else {
            xp_threshold_for(self.level)
        };
        self
    }

    pub fn with_stat_points(mut self, points: u32) -> Self {
        self.stat_points = points;
        self
    }

    pub fn with_last_login(mut self, last_login: DateTime<Utc>) -> Self {
        self.last_login = last_login;
        self
    }

    // =========================================================================
    // Progression
    // =========================================================================

    /// `max_hp = 100 + vit*5`, `max_mana = 10 + int*5`; current values are clamped.
    pub fn recompute_derived_stats(&mut self) {
        self.max_hp = BASE_MAX_HP + self.stats.vitality * HP_PER_VITALITY;
        self.max_mana = BASE_MAX_MANA + self.stats.intellect * MANA_PER_INTELLECT;
        self.hp = self.hp.min(self.max_hp);
        self.mana = self.mana.min(self.max_mana);
    }

    fn restore_vitals(&mut self) {
        self.hp = self.max_hp;
        self.mana = self.max_mana;
    }

    /// Resolve every level-up the current XP pays for.
    ///
    /// Each level consumes its threshold, grants one stat point and fully
    /// restores HP and mana.
    pub fn check_level_up(&mut self) -> LevelUpOutcome {
        let mut levels_gained = 0;
        while self.current_xp >= self.xp_to_next_level {
            self.current_xp -= self.xp_to_next_level;
            self.level += 1;
            self.xp_to_next_level = xp_threshold_for(self.level);
            self.stat_points += 1;
            self.recompute_derived_stats();
            self.restore_vitals();
            levels_gained += 1;
        }
        LevelUpOutcome {
            levels_gained,
            level: self.level,
        }
    }

    /// Credit XP and gold, then resolve level-ups.
    pub fn add_rewards(&mut self, xp: u32, gold: u32) -> LevelUpOutcome {
        self.current_xp = self.current_xp.saturating_add(xp);
        self.gold = self.gold.saturating_add(gold);
        self.check_level_up()
    }

    /// Arithmetic reversal of a reward, clamped at zero. Does not undo level-ups.
    pub fn revoke_rewards(&mut self, xp: u32, gold: u32) {
        self.current_xp = self.current_xp.saturating_sub(xp);
        self.gold = self.gold.saturating_sub(gold);
    }

    /// Spend one unallocated point on `stat`.
    ///
    /// # Errors
    ///
    /// `InvalidStateTransition` when no points are left; nothing changes.
    pub fn allocate_stat(&mut self, stat: Stat) -> Result<StatAllocated, DomainError> {
        if self.stat_points == 0 {
            return Err(DomainError::invalid_state_transition(
                "No unallocated stat points",
            ));
        }
        self.stat_points -= 1;
        *self.stats.get_mut(stat) += 1;
        self.recompute_derived_stats();
        Ok(StatAllocated {
            stat,
            new_value: self.stats.get(stat),
            stat_points_left: self.stat_points,
        })
    }

    /// Streak bookkeeping on the first access of a new calendar day.
    pub fn register_visit(&mut self, now: DateTime<Utc>) -> StreakUpdate {
        let today = now.date_naive();
        let last = self.last_login.date_naive();
        if today <= last {
            return StreakUpdate::Unchanged;
        }

        let update = if last.succ_opt() == Some(today) {
            self.streak_days += 1;
            StreakUpdate::Extended {
                streak_days: self.streak_days,
            }
        } else {
            self.streak_days = 1;
            StreakUpdate::Reset
        };
        self.last_login = now;
        update
    }

    // =========================================================================
    // Vitals
    // =========================================================================

    /// Lose HP, clamped at zero.
    pub fn apply_damage(&mut self, amount: u32) -> HeroDamageOutcome {
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            HeroDamageOutcome::Exhausted {
                damage_dealt: amount,
            }
        } else {
            HeroDamageOutcome::Wounded {
                damage_dealt: amount,
                remaining_hp: self.hp,
            }
        }
    }

    /// Restore HP, capped at max HP.
    pub fn heal(&mut self, amount: u32) -> HealOutcome {
        if self.hp >= self.max_hp {
            return HealOutcome::AlreadyFull;
        }
        let new_hp = self.hp.saturating_add(amount).min(self.max_hp);
        let amount_healed = new_hp - self.hp;
        self.hp = new_hp;
        HealOutcome::Healed {
            amount_healed,
            new_hp,
        }
    }

    /// Debit mana for a skill.
    pub fn spend_mana(&mut self, cost: u32) -> Result<(), DomainError> {
        if self.mana < cost {
            return Err(DomainError::constraint(format!(
                "Not enough mana: {} required, {} available",
                cost, self.mana
            )));
        }
        self.mana -= cost;
        Ok(())
    }

    pub fn spend_gold(&mut self, amount: u32) -> Result<(), DomainError> {
        if self.gold < amount {
            return Err(DomainError::constraint(format!(
                "Not enough gold: {} required, {} available",
                amount, self.gold
            )));
        }
        self.gold -= amount;
        Ok(())
    }

    /// Store a damage multiplier for the next attack. A newer buff replaces an older one.
    pub fn grant_damage_buff(&mut self, percent: u32) {
        self.damage_buff_percent = Some(percent);
    }

    /// Take the pending damage multiplier, if any.
    pub fn consume_damage_buff(&mut self) -> Option<u32> {
        self.damage_buff_percent.take()
    }

    // =========================================================================
    // Snapshot / Undo
    // =========================================================================

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            level: self.level,
            current_xp: self.current_xp,
            xp_to_next_level: self.xp_to_next_level,
            gold: self.gold,
            hp: self.hp,
            mana: self.mana,
            stat_points: self.stat_points,
            stats: self.stats,
        }
    }

    /// Put every snapshotted field back exactly as captured.
    pub fn restore(&mut self, snapshot: &ProgressSnapshot) {
        self.level = snapshot.level;
        self.current_xp = snapshot.current_xp;
        self.xp_to_next_level = snapshot.xp_to_next_level;
        self.gold = snapshot.gold;
        self.stat_points = snapshot.stat_points;
        self.stats = snapshot.stats;
        self.max_hp = BASE_MAX_HP + self.stats.vitality * HP_PER_VITALITY;
        self.max_mana = BASE_MAX_MANA + self.stats.intellect * MANA_PER_INTELLECT;
        self.hp = snapshot.hp.min(self.max_hp);
        self.mana = snapshot.mana.min(self.max_mana);
    }
}
