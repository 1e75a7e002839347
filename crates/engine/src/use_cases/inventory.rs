//! Inventory, equipment and the item shop.

use std::sync::Arc;

use questforge_domain::{
    equipment_bonuses, AcquisitionMethod, EquipmentBonuses, EquipmentSlot, HeroId, InventoryItem,
    InventoryItemId, Item, ItemId,
};

use crate::infrastructure::ports::{ClockPort, HeroRepo, InventoryRepo, ItemLibraryRepo};

use super::auth::{require_hero, SessionContext};
use super::error::GameError;

/// Bonuses of everything `hero_id` has equipped, read fresh from storage.
pub(crate) async fn equipped_bonuses(
    inventory: &dyn InventoryRepo,
    hero_id: HeroId,
) -> Result<EquipmentBonuses, GameError> {
    let owned = inventory.list_for_hero(hero_id).await?;
    Ok(equipment_bonuses(&owned))
}

pub struct InventoryUseCases {
    heroes: Arc<dyn HeroRepo>,
    library: Arc<dyn ItemLibraryRepo>,
    inventory: Arc<dyn InventoryRepo>,
    clock: Arc<dyn ClockPort>,
}

impl InventoryUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        library: Arc<dyn ItemLibraryRepo>,
        inventory: Arc<dyn InventoryRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            heroes,
            library,
            inventory,
            clock,
        }
    }

    pub async fn list_inventory(
        &self,
        session: &SessionContext,
    ) -> Result<Vec<InventoryItem>, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        Ok(self.inventory.list_for_hero(hero.id()).await?)
    }

    /// Every item template, in shop order.
    pub async fn library(&self) -> Result<Vec<Item>, GameError> {
        Ok(self.library.list().await?)
    }

    pub async fn calculate_equipment_bonuses(
        &self,
        session: &SessionContext,
    ) -> Result<EquipmentBonuses, GameError> {
        equipped_bonuses(self.inventory.as_ref(), session.hero_id).await
    }

    /// An inventory entry that belongs to the session's hero.
    async fn owned(
        &self,
        session: &SessionContext,
        id: InventoryItemId,
    ) -> Result<InventoryItem, GameError> {
        self.inventory
            .get(id)
            .await?
            .filter(|owned| owned.hero_id == session.hero_id)
            .ok_or_else(|| GameError::not_found("InventoryItem", id))
    }

    /// Put `id` into `slot`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// `NotFound` when the item is not the hero's; `Validation` when the item
    /// does not fit `slot`.
    pub async fn equip(
        &self,
        session: &SessionContext,
        id: InventoryItemId,
        slot: EquipmentSlot,
    ) -> Result<InventoryItem, GameError> {
        let mut owned = self.owned(session, id).await?;
        if owned.slot() != slot {
            return Err(GameError::validation(format!(
                "{} goes in {}, not {}",
                owned.item.name,
                owned.slot().as_str(),
                slot.as_str()
            )));
        }

        self.inventory
            .equip_exclusive(session.hero_id, id, slot)
            .await?;
        owned.is_equipped = true;
        tracing::info!(hero_id = %session.hero_id, item = %owned.item.name, slot = slot.as_str(), "Item equipped");
        Ok(owned)
    }

    pub async fn unequip(
        &self,
        session: &SessionContext,
        id: InventoryItemId,
    ) -> Result<InventoryItem, GameError> {
        let mut owned = self.owned(session, id).await?;
        self.inventory.unequip(id).await?;
        owned.is_equipped = false;
        tracing::info!(hero_id = %session.hero_id, item = %owned.item.name, "Item unequipped");
        Ok(owned)
    }

    /// Buy a library item with gold.
    ///
    /// # Errors
    ///
    /// `State` when the hero is under the level requirement or short on gold.
    #[tracing::instrument(skip(self))]
    pub async fn purchase(
        &self,
        session: &SessionContext,
        item_id: ItemId,
    ) -> Result<InventoryItem, GameError> {
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        let item = self.library_item(item_id).await?;

        if hero.level() < item.level_requirement {
            return Err(GameError::state(format!(
                "{} requires level {}",
                item.name, item.level_requirement
            )));
        }
        hero.spend_gold(item.price)?;

        let owned = InventoryItem::new(
            hero.id(),
            item,
            AcquisitionMethod::Purchased,
            self.clock.now(),
        );
        self.heroes.save(&hero).await?;
        self.inventory.add(&owned).await?;

        tracing::info!(item = %owned.item.name, gold_left = hero.gold(), "Item purchased");
        Ok(owned)
    }

    /// Add a library item for free.
    pub async fn acquire(
        &self,
        session: &SessionContext,
        item_id: ItemId,
        method: AcquisitionMethod,
    ) -> Result<InventoryItem, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let item = self.library_item(item_id).await?;
        let owned = InventoryItem::new(hero.id(), item, method, self.clock.now());
        self.inventory.add(&owned).await?;
        tracing::info!(item = %owned.item.name, method = %method, "Item acquired");
        Ok(owned)
    }

    async fn library_item(&self, item_id: ItemId) -> Result<Item, GameError> {
        self.library
            .get(item_id)
            .await?
            .ok_or_else(|| GameError::not_found("Item", item_id))
    }
}
