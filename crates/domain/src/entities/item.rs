//! Item entity - equipment templates from the shared library, and owned copies
//!
//! The library holds one `Item` per template. Ownership is an `InventoryItem`
//! that embeds the template plus the equipped flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{EquipmentBonuses, Stat, StatBlock};
use crate::{HeroId, InventoryItemId, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Weapon,
    Armor,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Weapon => write!(f, "Weapon"),
            Self::Armor => write!(f, "Armor"),
        }
    }
}

/// Where an item is worn. At most one equipped item per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Head,
    Body,
    Hands,
    Legs,
    Feet,
    MainHand,
    OffHand,
}

impl EquipmentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::Body => "body",
            Self::Hands => "hands",
            Self::Legs => "legs",
            Self::Feet => "feet",
            Self::MainHand => "main_hand",
            Self::OffHand => "off_hand",
        }
    }

    pub fn all() -> [EquipmentSlot; 7] {
        [
            Self::Head,
            Self::Body,
            Self::Hands,
            Self::Legs,
            Self::Feet,
            Self::MainHand,
            Self::OffHand,
        ]
    }
}

impl fmt::Display for EquipmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EquipmentSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Self::all()
            .into_iter()
            .find(|slot| slot.as_str() == normalized)
            .ok_or_else(|| DomainError::parse(format!("Unknown equipment slot: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponClass {
    Sword,
    Staff,
    Bow,
    Dagger,
}

/// A library item template
///
/// # Simple Data Struct
///
/// Any combination of bonuses is valid, so fields are public.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub slot: EquipmentSlot,
    pub weapon_class: Option<WeaponClass>,
    pub bonus: StatBlock,
    /// Flat physical damage added to attacks
    pub base_damage: u32,
    /// Percent chance (on a 1-100 roll) of a follow-up hit
    pub double_attack_chance: u32,
    pub price: u32,
    pub level_requirement: u32,
    pub image: Option<String>,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType, slot: EquipmentSlot) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            item_type,
            slot,
            weapon_class: None,
            bonus: StatBlock::default(),
            base_damage: 0,
            double_attack_chance: 0,
            price: 0,
            level_requirement: 1,
            image: None,
        }
    }

    pub fn with_bonus(mut self, stat: Stat, amount: u32) -> Self {
        *self.bonus.get_mut(stat) = amount;
        self
    }

    pub fn with_weapon_class(mut self, class: WeaponClass) -> Self {
        self.weapon_class = Some(class);
        self
    }

    pub fn with_base_damage(mut self, base_damage: u32) -> Self {
        self.base_damage = base_damage;
        self
    }

    pub fn with_double_attack_chance(mut self, chance: u32) -> Self {
        self.double_attack_chance = chance;
        self
    }

    pub fn with_price(mut self, price: u32) -> Self {
        self.price = price;
        self
    }

    pub fn with_level_requirement(mut self, level: u32) -> Self {
        self.level_requirement = level;
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn bonuses(&self) -> EquipmentBonuses {
        EquipmentBonuses {
            stats: self.bonus,
            base_damage: self.base_damage,
            double_attack_chance: self.double_attack_chance,
        }
    }
}

/// An item owned by a hero
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub hero_id: HeroId,
    /// Copy of the library template at acquisition time
    pub item: Item,
    pub is_equipped: bool,
    pub acquired_at: DateTime<Utc>,
    pub acquisition_method: AcquisitionMethod,
}

impl InventoryItem {
    pub fn new(
        hero_id: HeroId,
        item: Item,
        acquisition_method: AcquisitionMethod,
        acquired_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: InventoryItemId::new(),
            hero_id,
            item,
            is_equipped: false,
            acquired_at,
            acquisition_method,
        }
    }

    #[inline]
    pub fn slot(&self) -> EquipmentSlot {
        self.item.slot
    }
}

/// How an item was acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMethod {
    Purchased,
    Looted,
    Granted,
}

impl fmt::Display for AcquisitionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Purchased => write!(f, "Purchased"),
            Self::Looted => write!(f, "Looted"),
            Self::Granted => write!(f, "Granted"),
        }
    }
}

/// Sum the bonuses of every equipped item in `inventory`.
pub fn equipment_bonuses<'a>(
    inventory: impl IntoIterator<Item = &'a InventoryItem>,
) -> EquipmentBonuses {
    inventory
        .into_iter()
        .filter(|owned| owned.is_equipped)
        .map(|owned| owned.item.bonuses())
        .sum()
}

/// Items written to an empty library on first start.
pub fn starter_library() -> Vec<Item> {
    vec![
        Item::new("Wooden Sword", ItemType::Weapon, EquipmentSlot::MainHand)
            .with_weapon_class(WeaponClass::Sword)
            .with_bonus(Stat::Str, 2)
            .with_base_damage(2)
            .with_price(10)
            .with_image("items/wooden_sword.png"),
        Item::new("Steel Sword", ItemType::Weapon, EquipmentSlot::MainHand)
            .with_weapon_class(WeaponClass::Sword)
            .with_bonus(Stat::Str, 5)
            .with_base_damage(5)
            .with_price(100)
            .with_level_requirement(3)
            .with_image("items/steel_sword.png"),
        Item::new("Novice Staff", ItemType::Weapon, EquipmentSlot::MainHand)
            .with_weapon_class(WeaponClass::Staff)
            .with_bonus(Stat::Int, 3)
            .with_price(15)
            .with_image("items/novice_staff.png"),
        Item::new("Twin Daggers", ItemType::Weapon, EquipmentSlot::OffHand)
            .with_weapon_class(WeaponClass::Dagger)
            .with_bonus(Stat::Dex, 2)
            .with_double_attack_chance(15)
            .with_price(120)
            .with_level_requirement(4)
            .with_image("items/twin_daggers.png"),
        Item::new("Cloth Shirt", ItemType::Armor, EquipmentSlot::Body)
            .with_bonus(Stat::Def, 1)
            .with_price(5)
            .with_image("items/cloth_shirt.png"),
        Item::new("Leather Jacket", ItemType::Armor, EquipmentSlot::Body)
            .with_bonus(Stat::Def, 3)
            .with_bonus(Stat::Dex, 1)
            .with_price(50)
            .with_level_requirement(2)
            .with_image("items/leather_jacket.png"),
        Item::new("Iron Helm", ItemType::Armor, EquipmentSlot::Head)
            .with_bonus(Stat::Def, 2)
            .with_price(40)
            .with_level_requirement(2)
            .with_image("items/iron_helm.png"),
    ]
}
