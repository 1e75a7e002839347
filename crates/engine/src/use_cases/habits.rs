//! Long-term habits: creation, daily start/finish and day rollover.

use std::sync::Arc;

use chrono::{DateTime, Days, NaiveTime, Utc};
use questforge_domain::aggregates::{CHECKIN_GOLD, CHECKIN_XP};
use questforge_domain::{
    Habit, HabitDayFinished, HabitId, LevelUpOutcome, RolloverOutcome, TimeFrame, Title,
};

use crate::infrastructure::ports::{ClockPort, HabitRepo, HeroRepo};

use super::auth::{require_hero, SessionContext};
use super::error::GameError;

#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub description: String,
    pub total_days: u32,
    pub time_frame: TimeFrame,
}

/// Something a rollover changed that the player should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitAlert {
    pub habit_id: HabitId,
    pub title: String,
    pub outcome: RolloverOutcome,
    pub narrative: String,
}

#[derive(Debug, Clone)]
pub struct HabitsView {
    /// Active habits after rollover
    pub habits: Vec<Habit>,
    pub alerts: Vec<HabitAlert>,
}

#[derive(Debug, Clone)]
pub struct FinishedDay {
    pub habit: Habit,
    pub day: HabitDayFinished,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub level_up: LevelUpOutcome,
    pub narrative: String,
}

/// First midnight strictly after `now`.
fn next_midnight(now: DateTime<Utc>) -> Result<DateTime<Utc>, GameError> {
    now.date_naive()
        .checked_add_days(Days::new(1))
        .map(|day| day.and_time(NaiveTime::MIN).and_utc())
        .ok_or_else(|| GameError::validation("Start date out of range"))
}

fn alert_for(habit: &Habit, outcome: RolloverOutcome) -> HabitAlert {
    let mut parts = Vec::new();
    if outcome.days_advanced > 0 {
        parts.push(format!("Now on day {}/{}", habit.current_day(), habit.total_days()));
    }
    if outcome.window_closed {
        parts.push(format!("today's window {} closed", habit.time_frame()));
    }
    if outcome.missed_days_added > 0 {
        parts.push(format!("{} day(s) missed", outcome.missed_days_added));
    }
    if outcome.period_closed {
        parts.push(format!(
            "the habit ended with {}/{} days checked",
            habit.checked_days(),
            habit.total_days()
        ));
    }
    HabitAlert {
        habit_id: habit.id(),
        title: habit.title().to_string(),
        outcome,
        narrative: format!("\"{}\": {}.", habit.title(), parts.join(", ")),
    }
}

pub struct HabitUseCases {
    heroes: Arc<dyn HeroRepo>,
    habits: Arc<dyn HabitRepo>,
    clock: Arc<dyn ClockPort>,
}

impl HabitUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        habits: Arc<dyn HabitRepo>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            heroes,
            habits,
            clock,
        }
    }

    async fn owned_habit(&self, session: &SessionContext, id: HabitId) -> Result<Habit, GameError> {
        self.habits
            .get(id)
            .await?
            .filter(|habit| habit.hero_id() == session.hero_id)
            .ok_or_else(|| GameError::not_found("Habit", id))
    }

    /// Create a habit starting at the next midnight.
    pub async fn create_habit(
        &self,
        session: &SessionContext,
        form: NewHabit,
    ) -> Result<Habit, GameError> {
        let title = Title::new(form.title)?;
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let start = next_midnight(self.clock.now())?;
        let habit = Habit::new(
            hero.id(),
            title,
            form.description.trim(),
            form.total_days,
            form.time_frame,
            start,
        )?;
        self.habits.save(&habit).await?;
        tracing::info!(habit_id = %habit.id(), total_days = habit.total_days(), start = %start, "Habit created");
        Ok(habit)
    }

    pub async fn delete_habit(&self, session: &SessionContext, id: HabitId) -> Result<(), GameError> {
        let habit = self.owned_habit(session, id).await?;
        self.habits.delete(habit.id()).await?;
        Ok(())
    }

    /// Active habits brought up to `now`. Changed habits are saved.
    #[tracing::instrument(skip(self))]
    pub async fn list_habits(
        &self,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> Result<HabitsView, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let mut habits = Vec::new();
        let mut alerts = Vec::new();

        for mut habit in self.habits.list_active_for_hero(hero.id()).await? {
            let outcome = habit.refresh(now);
            if !outcome.is_noop() {
                self.habits.save(&habit).await?;
                tracing::info!(
                    habit_id = %habit.id(),
                    day = habit.current_day(),
                    missed = outcome.missed_days_added,
                    period_closed = outcome.period_closed,
                    "Habit rolled over"
                );
                alerts.push(alert_for(&habit, outcome));
            }
            if !habit.is_completed() {
                habits.push(habit);
            }
        }

        habits.sort_by_key(|h| h.start_date());
        Ok(HabitsView { habits, alerts })
    }

    /// Every habit, finished ones included, without rollover.
    pub async fn list_all_habits(&self, session: &SessionContext) -> Result<Vec<Habit>, GameError> {
        let mut habits = self.habits.list_all_for_hero(session.hero_id).await?;
        habits.sort_by_key(|h| (h.is_completed(), h.start_date()));
        Ok(habits)
    }

    /// Load and roll over, saving if anything changed.
    async fn current_habit(
        &self,
        session: &SessionContext,
        id: HabitId,
        now: DateTime<Utc>,
    ) -> Result<Habit, GameError> {
        let mut habit = self.owned_habit(session, id).await?;
        if !habit.refresh(now).is_noop() {
            self.habits.save(&habit).await?;
        }
        Ok(habit)
    }

    pub async fn start_habit(
        &self,
        session: &SessionContext,
        id: HabitId,
        now: DateTime<Utc>,
    ) -> Result<Habit, GameError> {
        let mut habit = self.current_habit(session, id, now).await?;
        habit.start(now)?;
        self.habits.save(&habit).await?;
        tracing::info!(habit_id = %id, day = habit.current_day(), "Habit day started");
        Ok(habit)
    }

    /// Check today off and pay the check-in reward, plus the final bonus on the last day.
    #[tracing::instrument(skip(self))]
    pub async fn finish_habit(
        &self,
        session: &SessionContext,
        id: HabitId,
        now: DateTime<Utc>,
    ) -> Result<FinishedDay, GameError> {
        let mut habit = self.current_habit(session, id, now).await?;
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;

        let day = habit.finish(now)?;
        let (bonus_xp, bonus_gold) = match day {
            HabitDayFinished::HabitCompleted { .. } => habit.final_bonus(),
            HabitDayFinished::Checked { .. } => (0, 0),
        };
        let reward_xp = CHECKIN_XP + bonus_xp;
        let reward_gold = CHECKIN_GOLD + bonus_gold;
        let level_up = hero.add_rewards(reward_xp, reward_gold);

        self.heroes.save(&hero).await?;
        self.habits.save(&habit).await?;

        let mut narrative = match day {
            HabitDayFinished::Checked { checked_days } => format!(
                "Day {}/{} of \"{}\" done ({} checked). +{} XP, +{} gold.",
                habit.current_day(),
                habit.total_days(),
                habit.title(),
                checked_days,
                reward_xp,
                reward_gold
            ),
            HabitDayFinished::HabitCompleted { checked_days } => format!(
                "Habit \"{}\" complete with {}/{} days checked! +{} XP, +{} gold.",
                habit.title(),
                checked_days,
                habit.total_days(),
                reward_xp,
                reward_gold
            ),
        };
        if level_up.leveled_up() {
            narrative.push_str(&format!(" Level up! You are now level {}.", level_up.level));
        }
        tracing::info!(habit_id = %id, ?day, reward_xp, "Habit day finished");

        Ok(FinishedDay {
            habit,
            day,
            reward_xp,
            reward_gold,
            level_up,
            narrative,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedClock;
    use crate::infrastructure::ports::{MockHabitRepo, MockHeroRepo, RepoError};
    use crate::use_cases::test_support::Harness;
    use chrono::Duration;
    use questforge_domain::DailyState;

    fn form(total_days: u32) -> NewHabit {
        NewHabit {
            title: "Morning run".to_string(),
            description: String::new(),
            total_days,
            time_frame: TimeFrame::AllDay,
        }
    }

    #[tokio::test]
    async fn habits_start_at_the_next_midnight() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habit = h
            .app
            .use_cases
            .habits
            .create_habit(&session, form(5))
            .await
            .unwrap();

        let expected = next_midnight(h.now()).unwrap();
        assert_eq!(habit.start_date(), expected);
        assert!(habit.start_date() > h.now());
        assert_eq!(habit.start_date() - h.now(), Duration::hours(14));
    }

    #[tokio::test]
    async fn invalid_forms_are_rejected() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;

        let err = habits.create_habit(&session, form(0)).await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        let blank = NewHabit {
            title: "  ".into(),
            ..form(3)
        };
        let err = habits.create_habit(&session, blank).await.unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
    }

    #[tokio::test]
    async fn skipped_days_are_counted_once() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&session, form(5)).await.unwrap();

        let now = habit.start_date() + Duration::days(3) + Duration::hours(10);
        let view = habits.list_habits(&session, now).await.unwrap();
        assert_eq!(view.alerts.len(), 1);
        assert_eq!(view.alerts[0].outcome.missed_days_added, 3);
        let listed = &view.habits[0];
        assert_eq!((listed.current_day(), listed.missed_days()), (4, 3));
        assert_eq!(listed.daily_state(), DailyState::Pending);

        let again = habits.list_habits(&session, now).await.unwrap();
        assert!(again.alerts.is_empty());
        assert_eq!(again.habits[0].missed_days(), 3);
    }

    #[tokio::test]
    async fn current_day_is_clamped_and_the_period_closes() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&session, form(2)).await.unwrap();

        let now = habit.start_date() + Duration::days(5);
        let view = habits.list_habits(&session, now).await.unwrap();
        assert!(view.habits.is_empty());
        assert!(view.alerts[0].outcome.period_closed);
        assert!(view.alerts[0].narrative.contains("0/2 days checked"));

        let all = habits.list_all_habits(&session).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].is_completed());
        assert_eq!((all[0].current_day(), all[0].missed_days()), (2, 2));
    }

    #[tokio::test]
    async fn finishing_a_day_pays_the_checkin_reward() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&session, form(3)).await.unwrap();
        let now = habit.start_date() + Duration::hours(7);

        let started = habits.start_habit(&session, habit.id(), now).await.unwrap();
        assert_eq!(started.daily_state(), DailyState::Started);

        let done = habits.finish_habit(&session, habit.id(), now).await.unwrap();
        assert_eq!(done.day, HabitDayFinished::Checked { checked_days: 1 });
        assert_eq!((done.reward_xp, done.reward_gold), (25, 10));

        let hero = h.hero(&session).await;
        assert_eq!((hero.current_xp(), hero.gold()), (25, 10));

        let err = habits.finish_habit(&session, habit.id(), now).await.unwrap_err();
        assert!(matches!(err, GameError::State(msg) if msg.contains("finished")));
    }

    #[tokio::test]
    async fn last_day_adds_the_final_bonus() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&session, form(1)).await.unwrap();
        let now = habit.start_date() + Duration::hours(7);

        habits.start_habit(&session, habit.id(), now).await.unwrap();
        let done = habits.finish_habit(&session, habit.id(), now).await.unwrap();
        assert_eq!(done.day, HabitDayFinished::HabitCompleted { checked_days: 1 });
        assert_eq!((done.reward_xp, done.reward_gold), (25 + 30, 10 + 15));
        assert!(done.habit.is_completed());

        let view = habits.list_habits(&session, now).await.unwrap();
        assert!(view.habits.is_empty());
    }

    #[tokio::test]
    async fn future_habits_cannot_be_started() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&session, form(3)).await.unwrap();

        let err = habits
            .start_habit(&session, habit.id(), h.now())
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::State(msg) if msg.contains("starts on")));
    }

    #[tokio::test]
    async fn a_closed_window_fails_the_day() {
        let h = Harness::new().await;
        let session = h.register("Ada").await;
        let habits = &h.app.use_cases.habits;
        let windowed = NewHabit {
            time_frame: TimeFrame::parse("06:00 - 08:00").unwrap(),
            ..form(3)
        };
        let habit = habits.create_habit(&session, windowed).await.unwrap();
        let late = habit.start_date() + Duration::hours(9);

        let view = habits.list_habits(&session, late).await.unwrap();
        assert!(view.alerts[0].outcome.window_closed);
        assert_eq!(view.habits[0].missed_days(), 1);
        assert_eq!(view.habits[0].daily_state(), DailyState::Failed);

        let err = habits.start_habit(&session, habit.id(), late).await.unwrap_err();
        assert!(matches!(err, GameError::State(_)));

        let next_morning = habit.start_date() + Duration::days(1) + Duration::hours(7);
        let started = habits
            .start_habit(&session, habit.id(), next_morning)
            .await
            .unwrap();
        assert_eq!(started.current_day(), 2);
        assert_eq!(started.missed_days(), 1);
    }

    #[tokio::test]
    async fn other_heroes_habits_are_not_found() {
        let h = Harness::new().await;
        let owner = h.register("Ada").await;
        let other = h.register("Bo").await;
        let habits = &h.app.use_cases.habits;
        let habit = habits.create_habit(&owner, form(3)).await.unwrap();

        let err = habits.delete_habit(&other, habit.id()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
    }

    #[tokio::test]
    async fn failed_reward_save_leaves_the_habit_unfinished() {
        let hero = Harness::sample_hero();
        let hero_id = hero.id();
        let start = next_midnight(Harness::now_fixed()).unwrap();
        let mut habit = Habit::new(
            hero_id,
            Title::new("Read").unwrap(),
            "",
            3,
            TimeFrame::AllDay,
            start,
        )
        .unwrap();
        let now = start + Duration::hours(7);
        habit.refresh(now);
        habit.start(now).unwrap();
        let habit_id = habit.id();

        let mut heroes = MockHeroRepo::new();
        heroes.expect_get().returning(move |_| Ok(Some(hero.clone())));
        heroes
            .expect_save()
            .returning(|_| Err(RepoError::database("hero.save", "disk full")));
        let mut repo = MockHabitRepo::new();
        repo.expect_get().returning(move |_| Ok(Some(habit.clone())));
        repo.expect_save().never();

        let habits = HabitUseCases::new(
            Arc::new(heroes),
            Arc::new(repo),
            Arc::new(FixedClock(Harness::now_fixed())),
        );
        let err = habits
            .finish_habit(&SessionContext::new(hero_id), habit_id, now)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Repo(_)));
    }
}
