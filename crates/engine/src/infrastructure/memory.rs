//! In-memory storage for tests, scenarios and throwaway sessions.
//!
//! One `RwLock` guards all tables so multi-table operations (equip, nickname
//! uniqueness) see a consistent view.

use std::collections::HashMap;

use async_trait::async_trait;
use questforge_domain::{
    Enemy, EquipmentSlot, Goal, GoalId, Habit, HabitId, Hero, HeroId, InventoryItem,
    InventoryItemId, Item, ItemId,
};
use tokio::sync::RwLock;

use crate::infrastructure::ports::{
    EnemyRepo, GoalRepo, HabitRepo, HeroRepo, InventoryRepo, ItemLibraryRepo, RepoError,
};

#[derive(Default)]
struct Tables {
    heroes: HashMap<HeroId, Hero>,
    goals: HashMap<GoalId, Goal>,
    habits: HashMap<HabitId, Habit>,
    enemies: HashMap<HeroId, Enemy>,
    /// Library in insertion order
    library: Vec<Item>,
    inventory: HashMap<InventoryItemId, InventoryItem>,
}

/// Implements every repository port over plain maps.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn nickname_key(nickname: &str) -> String {
    nickname.trim().to_lowercase()
}

#[async_trait]
impl HeroRepo for InMemoryStore {
    async fn create(&self, hero: &Hero) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        let key = nickname_key(hero.nickname().as_str());
        if tables
            .heroes
            .values()
            .any(|h| nickname_key(h.nickname().as_str()) == key)
        {
            return Err(RepoError::constraint(format!(
                "Nickname already taken: {}",
                hero.nickname()
            )));
        }
        tables.heroes.insert(hero.id(), hero.clone());
        Ok(())
    }

    async fn get(&self, id: HeroId) -> Result<Option<Hero>, RepoError> {
        Ok(self.tables.read().await.heroes.get(&id).cloned())
    }

    async fn get_by_nickname(&self, nickname: &str) -> Result<Option<Hero>, RepoError> {
        let key = nickname_key(nickname);
        Ok(self
            .tables
            .read()
            .await
            .heroes
            .values()
            .find(|h| nickname_key(h.nickname().as_str()) == key)
            .cloned())
    }

    async fn save(&self, hero: &Hero) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        match tables.heroes.get_mut(&hero.id()) {
            Some(stored) => {
                *stored = hero.clone();
                Ok(())
            }
            None => Err(RepoError::not_found("Hero", hero.id())),
        }
    }
}

#[async_trait]
impl GoalRepo for InMemoryStore {
    async fn get(&self, id: GoalId) -> Result<Option<Goal>, RepoError> {
        Ok(self.tables.read().await.goals.get(&id).cloned())
    }

    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<Goal>, RepoError> {
        let tables = self.tables.read().await;
        let mut goals: Vec<Goal> = tables
            .goals
            .values()
            .filter(|g| g.hero_id() == hero_id)
            .cloned()
            .collect();
        goals.sort_by_key(|g| (g.created_at(), g.id()));
        Ok(goals)
    }

    async fn save(&self, goal: &Goal) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .goals
            .insert(goal.id(), goal.clone());
        Ok(())
    }

    async fn delete(&self, id: GoalId) -> Result<(), RepoError> {
        self.tables.write().await.goals.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl HabitRepo for InMemoryStore {
    async fn get(&self, id: HabitId) -> Result<Option<Habit>, RepoError> {
        Ok(self.tables.read().await.habits.get(&id).cloned())
    }

    async fn list_active_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError> {
        let mut habits = self.list_all_for_hero(hero_id).await?;
        habits.retain(|h| !h.is_completed());
        Ok(habits)
    }

    async fn list_all_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError> {
        let tables = self.tables.read().await;
        let mut habits: Vec<Habit> = tables
            .habits
            .values()
            .filter(|h| h.hero_id() == hero_id)
            .cloned()
            .collect();
        habits.sort_by_key(|h| (h.start_date(), h.id()));
        Ok(habits)
    }

    async fn save(&self, habit: &Habit) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .habits
            .insert(habit.id(), habit.clone());
        Ok(())
    }

    async fn delete(&self, id: HabitId) -> Result<(), RepoError> {
        self.tables.write().await.habits.remove(&id);
        Ok(())
    }
}

#[async_trait]
impl EnemyRepo for InMemoryStore {
    async fn get_current(&self, hero_id: HeroId) -> Result<Option<Enemy>, RepoError> {
        Ok(self.tables.read().await.enemies.get(&hero_id).cloned())
    }

    async fn save_current(&self, hero_id: HeroId, enemy: &Enemy) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .enemies
            .insert(hero_id, enemy.clone());
        Ok(())
    }

    async fn delete_current(&self, hero_id: HeroId) -> Result<(), RepoError> {
        self.tables.write().await.enemies.remove(&hero_id);
        Ok(())
    }
}

#[async_trait]
impl ItemLibraryRepo for InMemoryStore {
    async fn list(&self) -> Result<Vec<Item>, RepoError> {
        Ok(self.tables.read().await.library.clone())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepoError> {
        Ok(self
            .tables
            .read()
            .await
            .library
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn seed_if_empty(&self, items: &[Item]) -> Result<usize, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.library.is_empty() {
            return Ok(0);
        }
        tables.library.extend_from_slice(items);
        Ok(items.len())
    }
}

#[async_trait]
impl InventoryRepo for InMemoryStore {
    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<InventoryItem>, RepoError> {
        let tables = self.tables.read().await;
        let mut items: Vec<InventoryItem> = tables
            .inventory
            .values()
            .filter(|i| i.hero_id == hero_id)
            .cloned()
            .collect();
        items.sort_by_key(|i| (i.acquired_at, i.id));
        Ok(items)
    }

    async fn get(&self, id: InventoryItemId) -> Result<Option<InventoryItem>, RepoError> {
        Ok(self.tables.read().await.inventory.get(&id).cloned())
    }

    async fn add(&self, item: &InventoryItem) -> Result<(), RepoError> {
        self.tables
            .write()
            .await
            .inventory
            .insert(item.id, item.clone());
        Ok(())
    }

    async fn equip_exclusive(
        &self,
        hero_id: HeroId,
        id: InventoryItemId,
        slot: EquipmentSlot,
    ) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.inventory.contains_key(&id) {
            return Err(RepoError::not_found("InventoryItem", id));
        }
        for owned in tables.inventory.values_mut() {
            if owned.hero_id == hero_id && owned.is_equipped && owned.slot() == slot {
                owned.is_equipped = false;
            }
        }
        if let Some(target) = tables.inventory.get_mut(&id) {
            target.is_equipped = true;
        }
        Ok(())
    }

    async fn unequip(&self, id: InventoryItemId) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        match tables.inventory.get_mut(&id) {
            Some(owned) => {
                owned.is_equipped = false;
                Ok(())
            }
            None => Err(RepoError::not_found("InventoryItem", id)),
        }
    }
}
