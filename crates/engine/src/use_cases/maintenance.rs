//! Periodic upkeep: deadline penalties and habit rollover in one call.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::auth::SessionContext;
use super::error::GameError;
use super::habits::{HabitAlert, HabitUseCases};
use super::quests::{PenaltyReport, QuestUseCases};

#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub penalties: Vec<PenaltyReport>,
    pub habit_alerts: Vec<HabitAlert>,
}

impl TickReport {
    /// Nothing happened.
    pub fn is_quiet(&self) -> bool {
        self.penalties.is_empty() && self.habit_alerts.is_empty()
    }

    pub fn narratives(&self) -> Vec<&str> {
        self.penalties
            .iter()
            .map(|p| p.narrative.as_str())
            .chain(self.habit_alerts.iter().map(|a| a.narrative.as_str()))
            .collect()
    }
}

pub struct MaintenanceUseCases {
    quests: Arc<QuestUseCases>,
    habits: Arc<HabitUseCases>,
}

impl MaintenanceUseCases {
    pub fn new(quests: Arc<QuestUseCases>, habits: Arc<HabitUseCases>) -> Self {
        Self { quests, habits }
    }

    /// Run every time-driven rule up to `now`.
    #[tracing::instrument(skip(self))]
    pub async fn tick(
        &self,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> Result<TickReport, GameError> {
        let penalties = self.quests.check_deadlines(session, now).await?;
        let habit_alerts = self.habits.list_habits(session, now).await?.alerts;

        let report = TickReport {
            penalties,
            habit_alerts,
        };
        if !report.is_quiet() {
            tracing::info!(
                penalties = report.penalties.len(),
                habit_alerts = report.habit_alerts.len(),
                "Maintenance tick"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::habits::NewHabit;
    use crate::use_cases::quests::NewGoal;
    use crate::use_cases::test_support::Harness;
    use chrono::Duration;
    use questforge_domain::{Difficulty, TimeFrame};

    #[tokio::test]
    async fn tick_collects_penalties_and_rollovers() {
        let h = Harness::new().await;
        let session = h.register("Tam").await;
        let now = h.now();

        h.app
            .use_cases
            .quests
            .create_goal(
                &session,
                NewGoal {
                    title: "Taxes".into(),
                    description: String::new(),
                    deadline: now + Duration::hours(1),
                    difficulty: Difficulty::Hard,
                },
            )
            .await
            .unwrap();
        let habit = h
            .app
            .use_cases
            .habits
            .create_habit(
                &session,
                NewHabit {
                    title: "Stretch".into(),
                    description: String::new(),
                    total_days: 10,
                    time_frame: TimeFrame::AllDay,
                },
            )
            .await
            .unwrap();

        let maintenance = &h.app.use_cases.maintenance;
        assert!(maintenance.tick(&session, now).await.unwrap().is_quiet());

        let later = habit.start_date() + Duration::days(2) + Duration::hours(1);
        let report = maintenance.tick(&session, later).await.unwrap();
        assert_eq!(report.penalties.len(), 1);
        assert_eq!(report.habit_alerts.len(), 1);
        assert_eq!(report.narratives().len(), 2);
        assert!(report.narratives()[0].contains("Taxes"));

        assert!(maintenance.tick(&session, later).await.unwrap().is_quiet());
    }

    #[tokio::test]
    async fn tick_for_a_stale_session_fails() {
        let h = Harness::new().await;
        let stale = SessionContext::new(Harness::sample_hero().id());

        let err = h
            .app
            .use_cases
            .maintenance
            .tick(&stale, h.now())
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Session(_)));
    }
}
