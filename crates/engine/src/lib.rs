//! QuestForge Engine library.
//!
//! Turns real-life goals and habits into hero progression and combat.
//!
//! ## Structure
//!
//! - `use_cases/` - Player actions orchestrated across the ports
//! - `infrastructure/` - Port traits and their adapters (SQLite, in-memory, clock, RNG)
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
