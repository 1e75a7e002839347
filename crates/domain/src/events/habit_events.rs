//! Habit-related domain events

use serde::{Deserialize, Serialize};

/// What a day rollover changed on a habit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverOutcome {
    /// Days the cursor moved forward
    pub days_advanced: u32,
    /// Days newly counted as missed
    pub missed_days_added: u32,
    /// The active day was failed because its time window closed
    pub window_closed: bool,
    /// The tracking period ended during this rollover
    pub period_closed: bool,
}

impl RolloverOutcome {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Outcome of finishing the current habit day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitDayFinished {
    /// Day checked; more days to go
    Checked { checked_days: u32 },
    /// Final day checked; the habit is complete
    HabitCompleted { checked_days: u32 },
}
