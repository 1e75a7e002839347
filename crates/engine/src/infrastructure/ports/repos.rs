//! Repository port traits for database access.
//!
//! Every query is scoped by hero; nothing crosses from one hero to another.

use async_trait::async_trait;
use questforge_domain::{
    Enemy, EquipmentSlot, Goal, GoalId, Habit, HabitId, Hero, HeroId, InventoryItem,
    InventoryItemId, Item, ItemId,
};

use super::error::RepoError;

// =============================================================================
// Database Ports (one per aggregate)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeroRepo: Send + Sync {
    /// Insert a new hero. Fails with `ConstraintViolation` when the nickname is taken.
    async fn create(&self, hero: &Hero) -> Result<(), RepoError>;
    async fn get(&self, id: HeroId) -> Result<Option<Hero>, RepoError>;
    async fn get_by_nickname(&self, nickname: &str) -> Result<Option<Hero>, RepoError>;
    /// Update an existing hero.
    async fn save(&self, hero: &Hero) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GoalRepo: Send + Sync {
    async fn get(&self, id: GoalId) -> Result<Option<Goal>, RepoError>;
    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<Goal>, RepoError>;
    /// Upsert, including subgoals and snapshot.
    async fn save(&self, goal: &Goal) -> Result<(), RepoError>;
    async fn delete(&self, id: GoalId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HabitRepo: Send + Sync {
    async fn get(&self, id: HabitId) -> Result<Option<Habit>, RepoError>;
    /// Habits that are not completed yet.
    async fn list_active_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError>;
    async fn list_all_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError>;
    async fn save(&self, habit: &Habit) -> Result<(), RepoError>;
    async fn delete(&self, id: HabitId) -> Result<(), RepoError>;
}

/// Exactly one current enemy per hero.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnemyRepo: Send + Sync {
    async fn get_current(&self, hero_id: HeroId) -> Result<Option<Enemy>, RepoError>;
    /// Replace the hero's current enemy.
    async fn save_current(&self, hero_id: HeroId, enemy: &Enemy) -> Result<(), RepoError>;
    async fn delete_current(&self, hero_id: HeroId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemLibraryRepo: Send + Sync {
    async fn list(&self) -> Result<Vec<Item>, RepoError>;
    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepoError>;
    /// Write `items` only when the library is empty. Returns how many were inserted.
    async fn seed_if_empty(&self, items: &[Item]) -> Result<usize, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepo: Send + Sync {
    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<InventoryItem>, RepoError>;
    async fn get(&self, id: InventoryItemId) -> Result<Option<InventoryItem>, RepoError>;
    async fn add(&self, item: &InventoryItem) -> Result<(), RepoError>;
    /// Unequip whatever `hero_id` has in `slot`, then equip `id`.
    async fn equip_exclusive(
        &self,
        hero_id: HeroId,
        id: InventoryItemId,
        slot: EquipmentSlot,
    ) -> Result<(), RepoError>;
    async fn unequip(&self, id: InventoryItemId) -> Result<(), RepoError>;
}
