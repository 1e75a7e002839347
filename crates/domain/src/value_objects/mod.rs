//! Value objects: validated names, stats and time windows.

mod names;
mod stat;
mod time_frame;

pub use names::{Nickname, Title};
pub use stat::{EffectiveStats, EquipmentBonuses, Stat, StatBlock};
pub use time_frame::TimeFrame;
