//! SQLite-backed storage for every aggregate.
//!
//! Aggregates are stored as JSON documents next to the key columns used for
//! lookups and constraints (hero id, nickname, slot, equipped flag).

use async_trait::async_trait;
use questforge_domain::{
    Enemy, EquipmentSlot, Goal, GoalId, Habit, HabitId, Hero, HeroId, InventoryItem,
    InventoryItemId, Item, ItemId,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::infrastructure::ports::{
    EnemyRepo, GoalRepo, HabitRepo, HeroRepo, InventoryRepo, ItemLibraryRepo, RepoError,
};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS heroes (
        id TEXT PRIMARY KEY,
        nickname_key TEXT NOT NULL UNIQUE,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS goals (
        id TEXT PRIMARY KEY,
        hero_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        data TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_goals_hero ON goals(hero_id)",
    r#"
    CREATE TABLE IF NOT EXISTS habits (
        id TEXT PRIMARY KEY,
        hero_id TEXT NOT NULL,
        is_completed INTEGER NOT NULL,
        start_date TEXT NOT NULL,
        data TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_habits_hero ON habits(hero_id)",
    r#"
    CREATE TABLE IF NOT EXISTS enemies (
        hero_id TEXT PRIMARY KEY,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS items_library (
        position INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT NOT NULL UNIQUE,
        data TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS inventory (
        id TEXT PRIMARY KEY,
        hero_id TEXT NOT NULL,
        slot TEXT NOT NULL,
        is_equipped INTEGER NOT NULL DEFAULT 0,
        acquired_at TEXT NOT NULL,
        data TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_inventory_hero ON inventory(hero_id)",
];

/// SQLite implementation of all repository ports.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `db_path` and ensure the schema.
    pub async fn new(db_path: &str) -> Result<Self, RepoError> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", db_path))
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    /// Private in-memory database. A single connection keeps every query on the same database.
    pub async fn in_memory() -> Result<Self, RepoError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| RepoError::database("connect", e))?;
        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self, RepoError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| RepoError::database("schema", e))?;
        }
        Ok(Self { pool })
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, RepoError> {
    serde_json::to_string(value).map_err(RepoError::serialization)
}

fn from_row<T: DeserializeOwned>(row: &SqliteRow) -> Result<T, RepoError> {
    let json: String = row
        .try_get("data")
        .map_err(|e| RepoError::database("decode", e))?;
    serde_json::from_str(&json).map_err(RepoError::serialization)
}

fn from_rows<T: DeserializeOwned>(rows: &[SqliteRow]) -> Result<Vec<T>, RepoError> {
    rows.iter().map(from_row).collect()
}

fn nickname_key(nickname: &str) -> String {
    nickname.trim().to_lowercase()
}

// =============================================================================
// Heroes
// =============================================================================

#[async_trait]
impl HeroRepo for SqliteStore {
    async fn create(&self, hero: &Hero) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO heroes (id, nickname_key, data) VALUES (?, ?, ?)")
            .bind(hero.id().to_string())
            .bind(nickname_key(hero.nickname().as_str()))
            .bind(to_json(hero)?)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => RepoError::constraint(
                    format!("Nickname already taken: {}", hero.nickname()),
                ),
                other => RepoError::database("hero.create", other),
            })?;
        Ok(())
    }

    async fn get(&self, id: HeroId) -> Result<Option<Hero>, RepoError> {
        sqlx::query("SELECT data FROM heroes WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("hero.get", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn get_by_nickname(&self, nickname: &str) -> Result<Option<Hero>, RepoError> {
        sqlx::query("SELECT data FROM heroes WHERE nickname_key = ?")
            .bind(nickname_key(nickname))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("hero.get_by_nickname", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn save(&self, hero: &Hero) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE heroes SET data = ? WHERE id = ?")
            .bind(to_json(hero)?)
            .bind(hero.id().to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("hero.save", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Hero", hero.id()));
        }
        Ok(())
    }
}

// =============================================================================
// Goals
// =============================================================================

#[async_trait]
impl GoalRepo for SqliteStore {
    async fn get(&self, id: GoalId) -> Result<Option<Goal>, RepoError> {
        sqlx::query("SELECT data FROM goals WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("goal.get", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<Goal>, RepoError> {
        let rows = sqlx::query("SELECT data FROM goals WHERE hero_id = ? ORDER BY created_at, id")
            .bind(hero_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("goal.list_for_hero", e))?;
        from_rows(&rows)
    }

    async fn save(&self, goal: &Goal) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO goals (id, hero_id, created_at, data)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(goal.id().to_string())
        .bind(goal.hero_id().to_string())
        .bind(goal.created_at().to_rfc3339())
        .bind(to_json(goal)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("goal.save", e))?;
        Ok(())
    }

    async fn delete(&self, id: GoalId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM goals WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("goal.delete", e))?;
        Ok(())
    }
}

// =============================================================================
// Habits
// =============================================================================

#[async_trait]
impl HabitRepo for SqliteStore {
    async fn get(&self, id: HabitId) -> Result<Option<Habit>, RepoError> {
        sqlx::query("SELECT data FROM habits WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("habit.get", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn list_active_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError> {
        let rows = sqlx::query(
            "SELECT data FROM habits WHERE hero_id = ? AND is_completed = 0 ORDER BY start_date, id",
        )
        .bind(hero_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("habit.list_active_for_hero", e))?;
        from_rows(&rows)
    }

    async fn list_all_for_hero(&self, hero_id: HeroId) -> Result<Vec<Habit>, RepoError> {
        let rows = sqlx::query("SELECT data FROM habits WHERE hero_id = ? ORDER BY start_date, id")
            .bind(hero_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("habit.list_all_for_hero", e))?;
        from_rows(&rows)
    }

    async fn save(&self, habit: &Habit) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO habits (id, hero_id, is_completed, start_date, data)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                is_completed = excluded.is_completed,
                data = excluded.data
            "#,
        )
        .bind(habit.id().to_string())
        .bind(habit.hero_id().to_string())
        .bind(habit.is_completed())
        .bind(habit.start_date().to_rfc3339())
        .bind(to_json(habit)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("habit.save", e))?;
        Ok(())
    }

    async fn delete(&self, id: HabitId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM habits WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("habit.delete", e))?;
        Ok(())
    }
}

// =============================================================================
// Enemies
// =============================================================================

#[async_trait]
impl EnemyRepo for SqliteStore {
    async fn get_current(&self, hero_id: HeroId) -> Result<Option<Enemy>, RepoError> {
        sqlx::query("SELECT data FROM enemies WHERE hero_id = ?")
            .bind(hero_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("enemy.get_current", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn save_current(&self, hero_id: HeroId, enemy: &Enemy) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO enemies (hero_id, data) VALUES (?, ?)
            ON CONFLICT(hero_id) DO UPDATE SET data = excluded.data
            "#,
        )
        .bind(hero_id.to_string())
        .bind(to_json(enemy)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("enemy.save_current", e))?;
        Ok(())
    }

    async fn delete_current(&self, hero_id: HeroId) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM enemies WHERE hero_id = ?")
            .bind(hero_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("enemy.delete_current", e))?;
        Ok(())
    }
}

// =============================================================================
// Item library
// =============================================================================

#[async_trait]
impl ItemLibraryRepo for SqliteStore {
    async fn list(&self) -> Result<Vec<Item>, RepoError> {
        let rows = sqlx::query("SELECT data FROM items_library ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepoError::database("library.list", e))?;
        from_rows(&rows)
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepoError> {
        sqlx::query("SELECT data FROM items_library WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("library.get", e))?
            .map(|row| from_row(&row))
            .transpose()
    }

    async fn seed_if_empty(&self, items: &[Item]) -> Result<usize, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("library.seed", e))?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items_library")
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| RepoError::database("library.seed", e))?;
        if count > 0 {
            return Ok(0);
        }

        for item in items {
            sqlx::query("INSERT INTO items_library (id, data) VALUES (?, ?)")
                .bind(item.id.to_string())
                .bind(to_json(item)?)
                .execute(&mut *tx)
                .await
                .map_err(|e| RepoError::database("library.seed", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("library.seed", e))?;
        Ok(items.len())
    }
}

// =============================================================================
// Inventory
// =============================================================================

/// The `is_equipped` column is authoritative; the JSON copy may be stale.
fn inventory_from_row(row: &SqliteRow) -> Result<InventoryItem, RepoError> {
    let mut item: InventoryItem = from_row(row)?;
    item.is_equipped = row
        .try_get("is_equipped")
        .map_err(|e| RepoError::database("decode", e))?;
    Ok(item)
}

#[async_trait]
impl InventoryRepo for SqliteStore {
    async fn list_for_hero(&self, hero_id: HeroId) -> Result<Vec<InventoryItem>, RepoError> {
        let rows = sqlx::query(
            "SELECT data, is_equipped FROM inventory WHERE hero_id = ? ORDER BY acquired_at, id",
        )
        .bind(hero_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepoError::database("inventory.list_for_hero", e))?;
        rows.iter().map(inventory_from_row).collect()
    }

    async fn get(&self, id: InventoryItemId) -> Result<Option<InventoryItem>, RepoError> {
        sqlx::query("SELECT data, is_equipped FROM inventory WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RepoError::database("inventory.get", e))?
            .map(|row| inventory_from_row(&row))
            .transpose()
    }

    async fn add(&self, item: &InventoryItem) -> Result<(), RepoError> {
        sqlx::query(
            r#"
            INSERT INTO inventory (id, hero_id, slot, is_equipped, acquired_at, data)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.hero_id.to_string())
        .bind(item.slot().as_str())
        .bind(item.is_equipped)
        .bind(item.acquired_at.to_rfc3339())
        .bind(to_json(item)?)
        .execute(&self.pool)
        .await
        .map_err(|e| RepoError::database("inventory.add", e))?;
        Ok(())
    }

    async fn equip_exclusive(
        &self,
        hero_id: HeroId,
        id: InventoryItemId,
        slot: EquipmentSlot,
    ) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::database("inventory.equip", e))?;

        sqlx::query("UPDATE inventory SET is_equipped = 0 WHERE hero_id = ? AND slot = ?")
            .bind(hero_id.to_string())
            .bind(slot.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("inventory.equip", e))?;

        let result = sqlx::query("UPDATE inventory SET is_equipped = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepoError::database("inventory.equip", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("InventoryItem", id));
        }

        tx.commit()
            .await
            .map_err(|e| RepoError::database("inventory.equip", e))?;
        Ok(())
    }

    async fn unequip(&self, id: InventoryItemId) -> Result<(), RepoError> {
        let result = sqlx::query("UPDATE inventory SET is_equipped = 0 WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| RepoError::database("inventory.unequip", e))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("InventoryItem", id));
        }
        Ok(())
    }
}
