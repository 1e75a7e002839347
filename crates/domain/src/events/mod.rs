//! Domain Events
//!
//! Return types from aggregate mutations, communicating what happened when
//! state was modified. Callers turn these into log lines and alert messages.

pub mod combat_events;
pub mod habit_events;
pub mod hero_events;

pub use combat_events::*;
pub use habit_events::*;
pub use hero_events::*;
