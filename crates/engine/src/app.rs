//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{
    ClockPort, EnemyRepo, GoalRepo, HabitRepo, HeroRepo, InventoryRepo, ItemLibraryRepo,
    RandomPort, SubgoalSuggestionPort,
};
use crate::use_cases;

/// Main application state.
///
/// Holds every repository port and use case for one running game.
pub struct App {
    pub repositories: Repositories,
    pub use_cases: UseCases,
}

/// Container for all repository ports.
#[derive(Clone)]
pub struct Repositories {
    pub hero: Arc<dyn HeroRepo>,
    pub goal: Arc<dyn GoalRepo>,
    pub habit: Arc<dyn HabitRepo>,
    pub enemy: Arc<dyn EnemyRepo>,
    pub library: Arc<dyn ItemLibraryRepo>,
    pub inventory: Arc<dyn InventoryRepo>,
}

impl Repositories {
    /// Use one store for every port.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: HeroRepo
            + GoalRepo
            + HabitRepo
            + EnemyRepo
            + ItemLibraryRepo
            + InventoryRepo
            + 'static,
    {
        Self {
            hero: store.clone(),
            goal: store.clone(),
            habit: store.clone(),
            enemy: store.clone(),
            library: store.clone(),
            inventory: store,
        }
    }
}

/// Container for all use cases.
pub struct UseCases {
    pub auth: use_cases::AuthUseCases,
    pub progression: use_cases::ProgressionUseCases,
    pub inventory: use_cases::InventoryUseCases,
    pub combat: Arc<use_cases::CombatUseCases>,
    pub skills: use_cases::SkillUseCases,
    pub quests: Arc<use_cases::QuestUseCases>,
    pub habits: Arc<use_cases::HabitUseCases>,
    pub maintenance: use_cases::MaintenanceUseCases,
}

impl App {
    /// Wire every use case over a single store.
    pub fn new<S>(
        store: Arc<S>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        suggestions: Arc<dyn SubgoalSuggestionPort>,
    ) -> Self
    where
        S: HeroRepo
            + GoalRepo
            + HabitRepo
            + EnemyRepo
            + ItemLibraryRepo
            + InventoryRepo
            + 'static,
    {
        Self::from_repositories(Repositories::from_store(store), random, clock, suggestions)
    }

    pub fn from_repositories(
        repositories: Repositories,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        suggestions: Arc<dyn SubgoalSuggestionPort>,
    ) -> Self {
        let repos = &repositories;

        let combat = Arc::new(use_cases::CombatUseCases::new(
            repos.hero.clone(),
            repos.enemy.clone(),
            repos.inventory.clone(),
            repos.library.clone(),
            random,
            clock.clone(),
        ));
        let quests = Arc::new(use_cases::QuestUseCases::new(
            repos.hero.clone(),
            repos.goal.clone(),
            combat.clone(),
            suggestions,
            clock.clone(),
        ));
        let habits = Arc::new(use_cases::HabitUseCases::new(
            repos.hero.clone(),
            repos.habit.clone(),
            clock.clone(),
        ));

        let use_cases = UseCases {
            auth: use_cases::AuthUseCases::new(repos.hero.clone(), clock.clone()),
            progression: use_cases::ProgressionUseCases::new(
                repos.hero.clone(),
                repos.inventory.clone(),
                clock.clone(),
            ),
            inventory: use_cases::InventoryUseCases::new(
                repos.hero.clone(),
                repos.library.clone(),
                repos.inventory.clone(),
                clock,
            ),
            skills: use_cases::SkillUseCases::new(
                repos.hero.clone(),
                repos.inventory.clone(),
                combat.clone(),
            ),
            maintenance: use_cases::MaintenanceUseCases::new(quests.clone(), habits.clone()),
            combat,
            quests,
            habits,
        };

        Self {
            repositories,
            use_cases,
        }
    }
}
