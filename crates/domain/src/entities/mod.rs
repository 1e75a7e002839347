//! Domain entities - enemies, items and the skill catalog

mod enemy;
mod item;
mod skill;

pub use enemy::{DamageType, Enemy, EnemyRarity, RarityProfile};
pub use item::{
    equipment_bonuses, starter_library, AcquisitionMethod, EquipmentSlot, InventoryItem, Item,
    ItemType, WeaponClass,
};
pub use skill::{percent_of, Skill, SkillEffect};
