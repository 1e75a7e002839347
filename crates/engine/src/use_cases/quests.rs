//! Quests: goal management, completion with undo, subgoals and deadline penalties.

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use questforge_domain::{
    Difficulty, Goal, GoalEdit, GoalId, LevelUpOutcome, Reopened, SubGoal, SubGoalId, Title,
};

use crate::infrastructure::ports::{
    ClockPort, GoalRepo, HeroRepo, SubgoalSuggestion, SubgoalSuggestionPort, SuggestionRequest,
};

use super::auth::{require_hero, SessionContext};
use super::combat::{AttackOutcome, CombatUseCases, DamageTaken};
use super::error::GameError;

/// Goal creation form.
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalSort {
    /// Earliest deadline first
    Deadline,
    /// Most progressed first
    Progress,
    /// Hardest first
    Difficulty,
    /// Oldest first
    Created,
}

/// Order `goals` in place. Ties keep their previous order.
pub fn sort_goals(goals: &mut [Goal], by: GoalSort) {
    match by {
        GoalSort::Deadline => goals.sort_by_key(|g| g.deadline()),
        GoalSort::Progress => goals.sort_by(|a, b| {
            b.progress()
                .partial_cmp(&a.progress())
                .unwrap_or(Ordering::Equal)
        }),
        GoalSort::Difficulty => goals.sort_by_key(|g| std::cmp::Reverse(g.difficulty())),
        GoalSort::Created => goals.sort_by_key(|g| g.created_at()),
    }
}

#[derive(Debug, Clone)]
pub struct CompletedGoal {
    pub goal: Goal,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub level_up: LevelUpOutcome,
    /// The automatic attack that follows every completion
    pub strike: AttackOutcome,
    pub narrative: String,
}

#[derive(Debug, Clone)]
pub enum GoalCompletion {
    AlreadyCompleted,
    Completed(Box<CompletedGoal>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollback {
    /// Every snapshotted field restored
    Exact,
    /// Legacy goal without a snapshot; only the reward was subtracted
    Approximate { xp: u32, gold: u32 },
}

#[derive(Debug, Clone)]
pub struct UndoOutcome {
    pub goal: Goal,
    pub rollback: Rollback,
    pub narrative: String,
}

#[derive(Debug, Clone)]
pub struct SubgoalToggle {
    pub goal: Goal,
    /// Set when this toggle finished the last open subgoal
    pub completion: Option<GoalCompletion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PenaltyReport {
    pub goal_id: GoalId,
    pub goal_title: String,
    pub taken: DamageTaken,
    pub narrative: String,
}

pub struct QuestUseCases {
    heroes: Arc<dyn HeroRepo>,
    goals: Arc<dyn GoalRepo>,
    combat: Arc<CombatUseCases>,
    suggestions: Arc<dyn SubgoalSuggestionPort>,
    clock: Arc<dyn ClockPort>,
}

impl QuestUseCases {
    pub fn new(
        heroes: Arc<dyn HeroRepo>,
        goals: Arc<dyn GoalRepo>,
        combat: Arc<CombatUseCases>,
        suggestions: Arc<dyn SubgoalSuggestionPort>,
        clock: Arc<dyn ClockPort>,
    ) -> Self {
        Self {
            heroes,
            goals,
            combat,
            suggestions,
            clock,
        }
    }

    /// A goal that belongs to the session's hero.
    async fn owned_goal(&self, session: &SessionContext, id: GoalId) -> Result<Goal, GameError> {
        self.goals
            .get(id)
            .await?
            .filter(|goal| goal.hero_id() == session.hero_id)
            .ok_or_else(|| GameError::not_found("Goal", id))
    }

    // =========================================================================
    // Management
    // =========================================================================

    pub async fn create_goal(
        &self,
        session: &SessionContext,
        form: NewGoal,
    ) -> Result<Goal, GameError> {
        self.create_with_subgoals(session, form, Vec::new()).await
    }

    async fn create_with_subgoals(
        &self,
        session: &SessionContext,
        form: NewGoal,
        subgoals: Vec<SubGoal>,
    ) -> Result<Goal, GameError> {
        let title = Title::new(form.title)?;
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let goal = Goal::new(
            hero.id(),
            title,
            form.description.trim(),
            form.deadline,
            form.difficulty,
            self.clock.now(),
        )
        .with_subgoals(subgoals);
        self.goals.save(&goal).await?;
        tracing::info!(goal_id = %goal.id(), difficulty = %goal.difficulty(), subgoals = goal.subgoals().len(), "Goal created");
        Ok(goal)
    }

    /// Ask the suggestion collaborator to break a goal down.
    pub async fn suggest_subgoals(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<SubgoalSuggestion>, GameError> {
        Ok(self.suggestions.suggest(request).await?)
    }

    /// Create a goal whose subgoals come from the suggestion collaborator.
    ///
    /// # Errors
    ///
    /// `Validation` for an empty list or any suggestion without a title.
    pub async fn create_goal_with_suggestions(
        &self,
        session: &SessionContext,
        form: NewGoal,
        suggestions: Vec<SubgoalSuggestion>,
    ) -> Result<Goal, GameError> {
        if suggestions.is_empty() {
            return Err(GameError::validation("No subgoals were suggested"));
        }
        let subgoals = suggestions
            .into_iter()
            .map(|s| {
                let description = s.description.trim();
                let description = (!description.is_empty()).then(|| description.to_string());
                Ok(SubGoal::new(Title::new(s.title)?, description))
            })
            .collect::<Result<Vec<_>, GameError>>()?;
        self.create_with_subgoals(session, form, subgoals).await
    }

    pub async fn edit_goal(
        &self,
        session: &SessionContext,
        id: GoalId,
        edit: GoalEdit,
    ) -> Result<Goal, GameError> {
        let mut goal = self.owned_goal(session, id).await?;
        goal.edit(edit)?;
        self.goals.save(&goal).await?;
        Ok(goal)
    }

    pub async fn delete_goal(&self, session: &SessionContext, id: GoalId) -> Result<(), GameError> {
        let goal = self.owned_goal(session, id).await?;
        self.goals.delete(goal.id()).await?;
        tracing::info!(goal_id = %id, "Goal deleted");
        Ok(())
    }

    /// Incomplete goals first, each group by deadline.
    pub async fn list_goals(&self, session: &SessionContext) -> Result<Vec<Goal>, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let mut goals = self.goals.list_for_hero(hero.id()).await?;
        goals.sort_by_key(|g| (g.is_completed(), g.deadline()));
        Ok(goals)
    }

    /// Case-insensitive substring match on title and description.
    pub async fn search_goals(
        &self,
        session: &SessionContext,
        query: &str,
    ) -> Result<Vec<Goal>, GameError> {
        let needle = query.trim().to_lowercase();
        let goals = self.list_goals(session).await?;
        if needle.is_empty() {
            return Ok(goals);
        }
        Ok(goals
            .into_iter()
            .filter(|g| {
                g.title().as_str().to_lowercase().contains(&needle)
                    || g.description().to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub async fn list_goals_sorted(
        &self,
        session: &SessionContext,
        by: GoalSort,
    ) -> Result<Vec<Goal>, GameError> {
        let hero = require_hero(self.heroes.as_ref(), session).await?;
        let mut goals = self.goals.list_for_hero(hero.id()).await?;
        sort_goals(&mut goals, by);
        Ok(goals)
    }

    // =========================================================================
    // Subgoals
    // =========================================================================

    pub async fn add_subgoal(
        &self,
        session: &SessionContext,
        goal_id: GoalId,
        title: &str,
        description: Option<String>,
    ) -> Result<Goal, GameError> {
        let title = Title::new(title)?;
        let mut goal = self.owned_goal(session, goal_id).await?;
        goal.add_subgoal(title, description)?;
        self.goals.save(&goal).await?;
        Ok(goal)
    }

    pub async fn rename_subgoal(
        &self,
        session: &SessionContext,
        goal_id: GoalId,
        subgoal_id: SubGoalId,
        title: &str,
    ) -> Result<Goal, GameError> {
        let title = Title::new(title)?;
        let mut goal = self.owned_goal(session, goal_id).await?;
        goal.rename_subgoal(subgoal_id, title)?;
        self.goals.save(&goal).await?;
        Ok(goal)
    }

    pub async fn remove_subgoal(
        &self,
        session: &SessionContext,
        goal_id: GoalId,
        subgoal_id: SubGoalId,
    ) -> Result<Goal, GameError> {
        let mut goal = self.owned_goal(session, goal_id).await?;
        goal.remove_subgoal(subgoal_id)?;
        self.goals.save(&goal).await?;
        Ok(goal)
    }

    /// Check or uncheck a subgoal. Checking the last open one completes the goal.
    pub async fn toggle_subgoal(
        &self,
        session: &SessionContext,
        goal_id: GoalId,
        subgoal_id: SubGoalId,
        completed: bool,
    ) -> Result<SubgoalToggle, GameError> {
        let mut goal = self.owned_goal(session, goal_id).await?;
        let all_done = goal.set_subgoal_completed(subgoal_id, completed)?;
        self.goals.save(&goal).await?;

        if !all_done {
            return Ok(SubgoalToggle {
                goal,
                completion: None,
            });
        }

        let completion = self.complete_goal(session, goal_id).await?;
        let goal = match &completion {
            GoalCompletion::Completed(done) => done.goal.clone(),
            GoalCompletion::AlreadyCompleted => goal,
        };
        Ok(SubgoalToggle {
            goal,
            completion: Some(completion),
        })
    }

    // =========================================================================
    // Completion
    // =========================================================================

    /// Reward the hero for a goal and strike the current enemy.
    ///
    /// The hero's pre-reward state is kept on the goal for
    /// [`QuestUseCases::undo_complete_goal`].
    #[tracing::instrument(skip(self))]
    pub async fn complete_goal(
        &self,
        session: &SessionContext,
        id: GoalId,
    ) -> Result<GoalCompletion, GameError> {
        let mut goal = self.owned_goal(session, id).await?;
        if goal.is_completed() {
            return Ok(GoalCompletion::AlreadyCompleted);
        }
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;

        goal.complete(hero.snapshot())?;
        let difficulty = goal.difficulty();
        let (reward_xp, reward_gold) = (difficulty.reward_xp(), difficulty.reward_gold());
        let level_up = hero.add_rewards(reward_xp, reward_gold);

        self.heroes.save(&hero).await?;
        self.goals.save(&goal).await?;
        tracing::info!(goal_id = %id, reward_xp, level = hero.level(), "Goal completed");

        let strike = self.combat.attack_with(&mut hero, None).await?;

        let mut narrative = format!(
            "Quest \"{}\" complete! +{} XP, +{} gold.",
            goal.title(),
            reward_xp,
            reward_gold
        );
        if level_up.leveled_up() {
            narrative.push_str(&format!(" Level up! You are now level {}.", level_up.level));
        }
        narrative.push_str(" Quest strike: ");
        narrative.push_str(&strike.narrative);

        Ok(GoalCompletion::Completed(Box::new(CompletedGoal {
            goal,
            reward_xp,
            reward_gold,
            level_up,
            strike,
            narrative,
        })))
    }

    /// Reopen a completed goal and roll the hero back.
    ///
    /// # Errors
    ///
    /// `State` when the goal is not completed.
    #[tracing::instrument(skip(self))]
    pub async fn undo_complete_goal(
        &self,
        session: &SessionContext,
        id: GoalId,
    ) -> Result<UndoOutcome, GameError> {
        let mut goal = self.owned_goal(session, id).await?;
        let mut hero = require_hero(self.heroes.as_ref(), session).await?;

        let (rollback, narrative) = match goal.reopen()? {
            Reopened::FromSnapshot(snapshot) => {
                hero.restore(&snapshot);
                (
                    Rollback::Exact,
                    format!("Quest \"{}\" reopened. Progress restored.", goal.title()),
                )
            }
            Reopened::WithoutSnapshot { xp, gold } => {
                hero.revoke_rewards(xp, gold);
                tracing::warn!(goal_id = %id, xp, gold, "No snapshot on goal, approximate rollback");
                (
                    Rollback::Approximate { xp, gold },
                    format!(
                        "Quest \"{}\" reopened. Partial rollback: -{} XP, -{} gold; level-ups were kept.",
                        goal.title(),
                        xp,
                        gold
                    ),
                )
            }
        };

        self.heroes.save(&hero).await?;
        self.goals.save(&goal).await?;
        Ok(UndoOutcome {
            goal,
            rollback,
            narrative,
        })
    }

    // =========================================================================
    // Deadlines
    // =========================================================================

    /// Let the current enemy strike once for every goal past its deadline and grace window.
    ///
    /// Each goal is penalized at most once. Every strike is resolved first and
    /// the hero saved once, then the goals are flagged. A failed goal write can
    /// repeat a strike on the next pass but never drops one.
    #[tracing::instrument(skip(self))]
    pub async fn check_deadlines(
        &self,
        session: &SessionContext,
        now: DateTime<Utc>,
    ) -> Result<Vec<PenaltyReport>, GameError> {
        let due: Vec<Goal> = self
            .goals
            .list_for_hero(session.hero_id)
            .await?
            .into_iter()
            .filter(|g| g.penalty_due(now))
            .collect();
        if due.is_empty() {
            return Ok(Vec::new());
        }

        let mut hero = require_hero(self.heroes.as_ref(), session).await?;
        let enemy = self.combat.current_enemy_for(&hero).await?;

        let mut struck = Vec::with_capacity(due.len());
        for goal in due {
            let taken = self.combat.strike_hero(&mut hero, &enemy).await?;
            struck.push((goal, taken));
        }
        self.heroes.save(&hero).await?;

        let mut reports = Vec::with_capacity(struck.len());
        for (mut goal, taken) in struck {
            goal.mark_penalized();
            self.goals.save(&goal).await?;
            tracing::info!(goal_id = %goal.id(), hit = ?taken.hit, hp = taken.hero_hp, "Deadline penalty");

            let narrative = format!("Deadline missed for \"{}\". {}", goal.title(), taken.narrative);
            reports.push(PenaltyReport {
                goal_id: goal.id(),
                goal_title: goal.title().to_string(),
                taken,
                narrative,
            });
        }

        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::ScriptedRandom;
    use crate::infrastructure::ports::{
        MockGoalRepo, MockSubgoalSuggestionPort, RepoError, SuggestionError,
    };
    use crate::use_cases::test_support::Harness;
    use chrono::Duration;
    use questforge_domain::{HeroId, IncomingHit};
    use std::sync::Mutex;

    fn form(title: &str, difficulty: Difficulty, deadline: DateTime<Utc>) -> NewGoal {
        NewGoal {
            title: title.to_string(),
            description: String::new(),
            deadline,
            difficulty,
        }
    }

    fn completed(completion: GoalCompletion) -> CompletedGoal {
        match completion {
            GoalCompletion::Completed(done) => *done,
            GoalCompletion::AlreadyCompleted => panic!("goal was already completed"),
        }
    }

    #[tokio::test]
    async fn easy_goal_rewards_fifty_and_strikes() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Clean desk", Difficulty::Easy, h.now() + Duration::days(1)))
            .await
            .unwrap();

        let done = completed(quests.complete_goal(&session, goal.id()).await.unwrap());
        assert_eq!((done.reward_xp, done.reward_gold), (50, 50));
        assert!(!done.level_up.leveled_up());
        assert!(done.strike.total_damage() > 0);

        let hero = h.hero(&session).await;
        assert_eq!((hero.level(), hero.current_xp(), hero.gold()), (1, 50, 50));

        let again = quests.complete_goal(&session, goal.id()).await.unwrap();
        assert!(matches!(again, GoalCompletion::AlreadyCompleted));
    }

    #[tokio::test]
    async fn epic_goal_resolves_two_level_ups() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        h.app
            .use_cases
            .progression
            .add_rewards(&session, 90, 0)
            .await
            .unwrap();
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Ship it", Difficulty::Epic, h.now() + Duration::days(7)))
            .await
            .unwrap();

        let done = completed(quests.complete_goal(&session, goal.id()).await.unwrap());
        assert_eq!(done.level_up.levels_gained, 2);

        let hero = h.hero(&session).await;
        assert_eq!(hero.level(), 3);
        assert_eq!(hero.current_xp(), 190);
        assert_eq!(hero.xp_to_next_level(), 450);
        assert_eq!(hero.stat_points(), 2);
        assert_eq!((hero.hp(), hero.mana()), (hero.max_hp(), hero.max_mana()));
    }

    #[tokio::test]
    async fn undo_restores_the_snapshot_exactly() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        h.app
            .use_cases
            .progression
            .add_rewards(&session, 70, 5)
            .await
            .unwrap();
        let before = h.hero(&session).await.snapshot();

        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Ship it", Difficulty::Hard, h.now() + Duration::days(7)))
            .await
            .unwrap();
        quests.complete_goal(&session, goal.id()).await.unwrap();
        assert_ne!(h.hero(&session).await.snapshot(), before);

        let undo = quests.undo_complete_goal(&session, goal.id()).await.unwrap();
        assert_eq!(undo.rollback, Rollback::Exact);
        assert!(!undo.goal.is_completed());
        assert!(undo.goal.snapshot().is_none());
        assert_eq!(h.hero(&session).await.snapshot(), before);

        let err = quests
            .undo_complete_goal(&session, goal.id())
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::State(_)));
    }

    #[tokio::test]
    async fn legacy_goal_without_snapshot_rolls_back_approximately() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Old quest", Difficulty::Medium, h.now()))
            .await
            .unwrap();
        quests.complete_goal(&session, goal.id()).await.unwrap();

        let stored = GoalRepo::get(h.store.as_ref(), goal.id()).await.unwrap().unwrap();
        let mut json = serde_json::to_value(&stored).unwrap();
        json.as_object_mut().unwrap().remove("snapshot");
        let legacy: Goal = serde_json::from_value(json).unwrap();
        GoalRepo::save(h.store.as_ref(), &legacy).await.unwrap();

        let undo = quests.undo_complete_goal(&session, goal.id()).await.unwrap();
        assert_eq!(undo.rollback, Rollback::Approximate { xp: 100, gold: 100 });
        assert!(undo.narrative.contains("Partial rollback"));

        let hero = h.hero(&session).await;
        assert_eq!((hero.current_xp(), hero.gold()), (0, 0));
    }

    #[tokio::test]
    async fn deadline_penalty_fires_once_after_grace() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let now = h.now();
        let late = quests
            .create_goal(&session, form("Late", Difficulty::Easy, now - Duration::minutes(10)))
            .await
            .unwrap();
        quests
            .create_goal(&session, form("In grace", Difficulty::Easy, now - Duration::minutes(3)))
            .await
            .unwrap();

        let reports = quests.check_deadlines(&session, now).await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].goal_id, late.id());
        // quiet rolls: Easy level 1 enemy hits for 3, never dodged
        assert_eq!(reports[0].taken.hit, IncomingHit::Hit { damage: 3 });
        assert_eq!(h.hero(&session).await.hp(), 97);

        let again = quests.check_deadlines(&session, now).await.unwrap();
        assert!(again.is_empty());
        assert_eq!(h.hero(&session).await.hp(), 97);

        let later = quests
            .check_deadlines(&session, now + Duration::minutes(3))
            .await
            .unwrap();
        assert_eq!(later.len(), 1);
        assert_eq!(h.hero(&session).await.hp(), 94);
    }

    #[tokio::test]
    async fn completing_the_last_subgoal_completes_the_goal() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Move house", Difficulty::Medium, h.now() + Duration::days(3)))
            .await
            .unwrap();
        let goal = quests.add_subgoal(&session, goal.id(), "Pack", None).await.unwrap();
        let goal = quests
            .add_subgoal(&session, goal.id(), "Drive", Some("Rent a van".into()))
            .await
            .unwrap();
        let (first, second) = (goal.subgoals()[0].id, goal.subgoals()[1].id);

        let toggle = quests.toggle_subgoal(&session, goal.id(), first, true).await.unwrap();
        assert!(toggle.completion.is_none());
        assert_eq!(toggle.goal.progress(), 50.0);

        let toggle = quests.toggle_subgoal(&session, goal.id(), second, true).await.unwrap();
        assert!(matches!(toggle.completion, Some(GoalCompletion::Completed(_))));
        assert!(toggle.goal.is_completed());
        assert_eq!(h.hero(&session).await.current_xp(), 100);

        let err = quests
            .add_subgoal(&session, goal.id(), "Unpack", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::State(_)));
    }

    #[tokio::test]
    async fn list_search_and_sort() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let now = h.now();

        let soon = quests
            .create_goal(&session, form("Read a book", Difficulty::Easy, now + Duration::days(1)))
            .await
            .unwrap();
        let later = quests
            .create_goal(
                &session,
                NewGoal {
                    description: "Finish the BOOK club list".to_string(),
                    ..form("Club", Difficulty::Epic, now + Duration::days(9))
                },
            )
            .await
            .unwrap();
        let done = quests
            .create_goal(&session, form("Water plants", Difficulty::Medium, now))
            .await
            .unwrap();
        quests.complete_goal(&session, done.id()).await.unwrap();

        let ids = |goals: Vec<Goal>| goals.into_iter().map(|g| g.id()).collect::<Vec<_>>();

        let listed = quests.list_goals(&session).await.unwrap();
        assert_eq!(ids(listed), vec![soon.id(), later.id(), done.id()]);

        let found = quests.search_goals(&session, "book").await.unwrap();
        assert_eq!(ids(found), vec![soon.id(), later.id()]);

        let by_difficulty = quests
            .list_goals_sorted(&session, GoalSort::Difficulty)
            .await
            .unwrap();
        assert_eq!(ids(by_difficulty), vec![later.id(), done.id(), soon.id()]);

        let by_progress = quests
            .list_goals_sorted(&session, GoalSort::Progress)
            .await
            .unwrap();
        assert_eq!(by_progress[0].id(), done.id());
    }

    #[tokio::test]
    async fn editing_difficulty_of_a_completed_goal_is_rejected() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Stretch", Difficulty::Easy, h.now()))
            .await
            .unwrap();

        let edited = quests
            .edit_goal(
                &session,
                goal.id(),
                GoalEdit {
                    title: Some(Title::new("Stretch daily").unwrap()),
                    ..GoalEdit::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.title().as_str(), "Stretch daily");

        quests.complete_goal(&session, goal.id()).await.unwrap();
        let err = quests
            .edit_goal(
                &session,
                goal.id(),
                GoalEdit {
                    difficulty: Some(Difficulty::Epic),
                    ..GoalEdit::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::State(_)));
    }

    #[tokio::test]
    async fn goals_of_other_heroes_are_invisible() {
        let h = Harness::new().await;
        let mine = h.register("Mira").await;
        let theirs = h.register("Oren").await;
        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&theirs, form("Secret", Difficulty::Easy, h.now()))
            .await
            .unwrap();

        let err = quests.complete_goal(&mine, goal.id()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
        let err = quests.delete_goal(&mine, goal.id()).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound { .. }));
        assert!(quests.list_goals(&mine).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn suggested_subgoals_are_validated() {
        let mut port = MockSubgoalSuggestionPort::new();
        port.expect_suggest().returning(|request| {
            assert_eq!(request.difficulty, Difficulty::Hard);
            Ok(vec![
                SubgoalSuggestion {
                    title: "Plan route".into(),
                    description: "  ".into(),
                },
                SubgoalSuggestion {
                    title: "Book hostels".into(),
                    description: "Cheap ones".into(),
                },
            ])
        });
        let h = Harness::with_suggestions(Arc::new(port)).await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;

        let request = SuggestionRequest {
            title: "Cycle to Rome".into(),
            description: String::new(),
            difficulty: Difficulty::Hard,
        };
        let suggestions = quests.suggest_subgoals(&request).await.unwrap();
        let goal = quests
            .create_goal_with_suggestions(
                &session,
                form("Cycle to Rome", Difficulty::Hard, h.now() + Duration::days(30)),
                suggestions,
            )
            .await
            .unwrap();
        assert_eq!(goal.subgoals().len(), 2);
        assert_eq!(goal.subgoals()[0].description, None);
        assert_eq!(goal.subgoals()[1].description.as_deref(), Some("Cheap ones"));

        let err = quests
            .create_goal_with_suggestions(&session, form("Empty", Difficulty::Easy, h.now()), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));

        let blank = vec![SubgoalSuggestion {
            title: "   ".into(),
            description: String::new(),
        }];
        let err = quests
            .create_goal_with_suggestions(&session, form("Blank", Difficulty::Easy, h.now()), blank)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Validation(_)));
        assert_eq!(quests.list_goals(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn collaborator_outage_surfaces_as_suggestion_error() {
        let h = Harness::new().await;
        let request = SuggestionRequest {
            title: "Anything".into(),
            description: String::new(),
            difficulty: Difficulty::Easy,
        };
        let err = h
            .app
            .use_cases
            .quests
            .suggest_subgoals(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Suggestion(SuggestionError::Unavailable)));
    }

    #[tokio::test]
    async fn quest_strike_can_finish_an_enemy() {
        // spawn Easy lvl 1 (50 hp), double roll, respawn Easy
        let h = Harness::with_random(ScriptedRandom::new([1, 0, 100, 1, 0], [0.5])).await;
        let session = h.register("Mira").await;
        h.app
            .use_cases
            .combat
            .attack(&session, Some(questforge_domain::DamageSplit::physical(40)))
            .await
            .unwrap();

        let quests = &h.app.use_cases.quests;
        let goal = quests
            .create_goal(&session, form("Finish", Difficulty::Easy, h.now()))
            .await
            .unwrap();
        let done = completed(quests.complete_goal(&session, goal.id()).await.unwrap());
        assert!(done.strike.enemy_defeated);

        let hero = h.hero(&session).await;
        assert_eq!(hero.current_xp(), 50 + 20);
    }

    #[tokio::test]
    async fn failed_goal_write_keeps_earlier_strikes_on_the_hero() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let now = h.now();
        let overdue = |title: &str| {
            Goal::new(
                session.hero_id,
                Title::new(title).unwrap(),
                "",
                now - Duration::hours(1),
                Difficulty::Easy,
                now - Duration::days(1),
            )
        };
        let due = vec![overdue("Taxes"), overdue("Dentist")];
        let first_id = due[0].id();

        let saved = Arc::new(Mutex::new(Vec::<Goal>::new()));
        let mut goals = MockGoalRepo::new();
        goals
            .expect_list_for_hero()
            .returning(move |_| Ok(due.clone()));
        let mut seq = mockall::Sequence::new();
        let record = saved.clone();
        goals
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |goal| {
                record.lock().unwrap().push(goal.clone());
                Ok(())
            });
        goals
            .expect_save()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(RepoError::database("goal.save", "locked")));

        let combat = Arc::new(CombatUseCases::new(
            h.store.clone(),
            h.store.clone(),
            h.store.clone(),
            h.store.clone(),
            Arc::new(ScriptedRandom::quiet()),
            Harness::clock(),
        ));
        let quests = QuestUseCases::new(
            h.store.clone(),
            Arc::new(goals),
            combat,
            Arc::new(crate::infrastructure::suggestions::UnavailableSuggestions),
            Harness::clock(),
        );

        let err = quests.check_deadlines(&session, now).await.unwrap_err();
        assert!(matches!(err, GameError::Repo(_)));

        // both strikes landed and were saved; only the first goal is flagged
        assert_eq!(h.hero(&session).await.hp(), 94);
        let saved = saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id(), first_id);
        assert!(saved[0].penalty_applied());
    }

    #[tokio::test]
    async fn stale_session_cannot_list_goals() {
        let h = Harness::new().await;
        let stale = SessionContext::new(HeroId::new());
        let quests = &h.app.use_cases.quests;

        let err = quests.list_goals(&stale).await.unwrap_err();
        assert!(matches!(err, GameError::Session(_)));
        let err = quests
            .list_goals_sorted(&stale, GoalSort::Deadline)
            .await
            .unwrap_err();
        assert!(matches!(err, GameError::Session(_)));
    }

    #[tokio::test]
    async fn progress_sort_uses_subgoals_of_completed_goals() {
        let h = Harness::new().await;
        let session = h.register("Mira").await;
        let quests = &h.app.use_cases.quests;
        let deadline = h.now() + Duration::days(2);

        let partial = quests
            .create_goal(&session, form("Paint", Difficulty::Easy, deadline))
            .await
            .unwrap();
        let partial = quests.add_subgoal(&session, partial.id(), "Walls", None).await.unwrap();
        let partial = quests.add_subgoal(&session, partial.id(), "Doors", None).await.unwrap();
        let walls = partial.subgoals()[0].id;
        quests.toggle_subgoal(&session, partial.id(), walls, true).await.unwrap();
        quests.complete_goal(&session, partial.id()).await.unwrap();

        let bare = quests
            .create_goal(&session, form("Call mom", Difficulty::Easy, deadline))
            .await
            .unwrap();
        quests.complete_goal(&session, bare.id()).await.unwrap();

        let sorted = quests
            .list_goals_sorted(&session, GoalSort::Progress)
            .await
            .unwrap();
        assert_eq!(sorted[0].id(), bare.id());
        assert_eq!(sorted[1].progress(), 50.0);
    }
}
