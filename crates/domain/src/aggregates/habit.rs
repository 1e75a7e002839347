//! Habit aggregate - a long-term goal tracked day by day
//!
//! Each calendar day from `start_date` moves through
//! `Pending -> Started -> Finished`, or ends `Failed` when it is skipped or its
//! time window closes. Day rollover is computed from the clock, never from
//! elapsed-call counts, so refreshing twice at the same instant changes nothing.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::events::{HabitDayFinished, RolloverOutcome};
use crate::value_objects::{TimeFrame, Title};
use crate::{HabitId, HeroId};

/// Reward for each finished day
pub const CHECKIN_XP: u32 = 25;
pub const CHECKIN_GOLD: u32 = 10;
/// Extra reward per checked day when the final day is finished
pub const FINAL_BONUS_XP_PER_DAY: u32 = 30;
pub const FINAL_BONUS_GOLD_PER_DAY: u32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DailyState {
    #[default]
    Pending,
    Started,
    Finished,
    Failed,
}

impl DailyState {
    /// Finished or failed; the day can no longer change.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed)
    }
}

impl fmt::Display for DailyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Started => write!(f, "started"),
            Self::Finished => write!(f, "finished"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    id: HabitId,
    hero_id: HeroId,
    title: Title,
    description: String,
    total_days: u32,
    start_date: DateTime<Utc>,
    #[serde(default)]
    time_frame: TimeFrame,
    current_day: u32,
    checked_days: u32,
    missed_days: u32,
    is_completed: bool,
    daily_state: DailyState,
    last_update_date: Option<DateTime<Utc>>,
}

impl Habit {
    /// Create a habit whose first day is the calendar day of `start_date`.
    ///
    /// # Errors
    ///
    /// `Validation` when `total_days` is zero.
    pub fn new(
        hero_id: HeroId,
        title: Title,
        description: impl Into<String>,
        total_days: u32,
        time_frame: TimeFrame,
        start_date: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if total_days == 0 {
            return Err(DomainError::validation("A habit must last at least one day"));
        }
        Ok(Self {
            id: HabitId::new(),
            hero_id,
            title,
            description: description.into(),
            total_days,
            start_date,
            time_frame,
            current_day: 1,
            checked_days: 0,
            missed_days: 0,
            is_completed: false,
            daily_state: DailyState::Pending,
            last_update_date: None,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> HabitId {
        self.id
    }

    #[inline]
    pub fn hero_id(&self) -> HeroId {
        self.hero_id
    }

    #[inline]
    pub fn title(&self) -> &Title {
        &self.title
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn total_days(&self) -> u32 {
        self.total_days
    }

    #[inline]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    #[inline]
    pub fn time_frame(&self) -> TimeFrame {
        self.time_frame
    }

    #[inline]
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    #[inline]
    pub fn checked_days(&self) -> u32 {
        self.checked_days
    }

    #[inline]
    pub fn missed_days(&self) -> u32 {
        self.missed_days
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[inline]
    pub fn daily_state(&self) -> DailyState {
        self.daily_state
    }

    #[inline]
    pub fn last_update_date(&self) -> Option<DateTime<Utc>> {
        self.last_update_date
    }

    pub fn progress(&self) -> f64 {
        f64::from(self.current_day) / f64::from(self.total_days) * 100.0
    }

    /// Rewards owed for finishing the final day.
    pub fn final_bonus(&self) -> (u32, u32) {
        (
            self.checked_days.saturating_mul(FINAL_BONUS_XP_PER_DAY),
            self.checked_days.saturating_mul(FINAL_BONUS_GOLD_PER_DAY),
        )
    }

    fn start_day(&self) -> NaiveDate {
        self.start_date.date_naive()
    }

    fn has_begun(&self, now: DateTime<Utc>) -> bool {
        now.date_naive() >= self.start_day()
    }

    // =========================================================================
    // Day rollover
    // =========================================================================

    /// Bring the day cursor up to `now`.
    ///
    /// Leaving a day that was never closed counts it as missed, as does every
    /// day jumped over. Once the period is over the final day is closed and the
    /// habit completes. On the active day, a closed time window fails a
    /// pending or started day.
    pub fn refresh(&mut self, now: DateTime<Utc>) -> RolloverOutcome {
        let mut outcome = RolloverOutcome::default();
        if self.is_completed || !self.has_begun(now) {
            return outcome;
        }

        let elapsed = (now.date_naive() - self.start_day()).num_days();
        let days_passed = u32::try_from(elapsed.saturating_add(1)).unwrap_or(u32::MAX);
        let target_day = days_passed.min(self.total_days);

        if target_day > self.current_day {
            let delta = target_day - self.current_day;
            let left_open = u32::from(!self.daily_state.is_closed());
            outcome.days_advanced = delta;
            outcome.missed_days_added = left_open + (delta - 1);
            self.current_day = target_day;
            self.daily_state = DailyState::Pending;
        }

        if days_passed > self.total_days {
            if !self.daily_state.is_closed() {
                outcome.missed_days_added += 1;
                self.daily_state = DailyState::Failed;
            }
            self.is_completed = true;
            outcome.period_closed = true;
        } else if matches!(self.daily_state, DailyState::Pending | DailyState::Started)
            && self.time_frame.has_ended(now.time())
        {
            self.daily_state = DailyState::Failed;
            outcome.missed_days_added += 1;
            outcome.window_closed = true;
        }

        self.missed_days += outcome.missed_days_added;
        if !outcome.is_noop() {
            self.last_update_date = Some(now);
        }
        outcome
    }

    // =========================================================================
    // Daily transitions
    // =========================================================================

    /// `Pending -> Started`. Call [`Habit::refresh`] with the same `now` first.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.is_completed {
            return Err(DomainError::invalid_state_transition(
                "Habit is already completed",
            ));
        }
        if !self.has_begun(now) {
            return Err(DomainError::invalid_state_transition(format!(
                "Habit starts on {}",
                self.start_day()
            )));
        }
        if self.time_frame.has_ended(now.time()) {
            return Err(DomainError::invalid_state_transition(format!(
                "Today's window {} has closed",
                self.time_frame
            )));
        }
        if self.daily_state != DailyState::Pending {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot start a day that is {}",
                self.daily_state
            )));
        }
        self.daily_state = DailyState::Started;
        self.last_update_date = Some(now);
        Ok(())
    }

    /// `Started -> Finished`. Finishing the final day completes the habit.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<HabitDayFinished, DomainError> {
        if self.daily_state != DailyState::Started {
            return Err(DomainError::invalid_state_transition(format!(
                "Cannot finish a day that is {}",
                self.daily_state
            )));
        }
        if self.time_frame.has_ended(now.time()) {
            return Err(DomainError::invalid_state_transition(format!(
                "Today's window {} has closed",
                self.time_frame
            )));
        }
        self.daily_state = DailyState::Finished;
        self.checked_days += 1;
        self.last_update_date = Some(now);

        if self.current_day >= self.total_days {
            self.is_completed = true;
            Ok(HabitDayFinished::HabitCompleted {
                checked_days: self.checked_days,
            })
        } else {
            Ok(HabitDayFinished::Checked {
                checked_days: self.checked_days,
            })
        }
    }
}
