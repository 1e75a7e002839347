//! Shared fixtures for use-case tests.
//!
//! A `Harness` wires a full [`App`] over an in-memory store seeded with the
//! starter library, a fixed clock and scripted rolls.
//!
//! ```rust,ignore
//! let h = Harness::with_random(ScriptedRandom::new([95, 0, 100], [])).await;
//! let session = h.register("Mira").await;
//! h.app.use_cases.combat.attack(&session, None).await.unwrap();
//! ```

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use questforge_domain::{starter_library, Gender, Hero, HeroClass, Item, Nickname};

use crate::app::App;
use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
use crate::infrastructure::memory::InMemoryStore;
use crate::infrastructure::ports::{
    ClockPort, HeroRepo, ItemLibraryRepo, SubgoalSuggestionPort,
};
use crate::infrastructure::suggestions::UnavailableSuggestions;

use super::auth::{RegisterHero, SessionContext};

pub(crate) struct Harness {
    pub app: App,
    pub store: Arc<InMemoryStore>,
}

impl Harness {
    /// Quiet rolls: Easy enemies at the lowest level, no dodges, no drops.
    pub async fn new() -> Self {
        Self::build(ScriptedRandom::quiet(), Arc::new(UnavailableSuggestions)).await
    }

    pub async fn with_random(random: ScriptedRandom) -> Self {
        Self::build(random, Arc::new(UnavailableSuggestions)).await
    }

    pub async fn with_suggestions(suggestions: Arc<dyn SubgoalSuggestionPort>) -> Self {
        Self::build(ScriptedRandom::quiet(), suggestions).await
    }

    async fn build(random: ScriptedRandom, suggestions: Arc<dyn SubgoalSuggestionPort>) -> Self {
        let store = Arc::new(InMemoryStore::new());
        store.seed_if_empty(&starter_library()).await.unwrap();
        let app = App::new(store.clone(), Arc::new(random), Self::clock(), suggestions);
        Self { app, store }
    }

    /// The instant every harness clock is pinned to (a Monday, 10:00 UTC).
    pub fn now_fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0).unwrap()
    }

    pub fn now(&self) -> DateTime<Utc> {
        Self::now_fixed()
    }

    pub fn clock() -> Arc<dyn ClockPort> {
        Arc::new(FixedClock(Self::now_fixed()))
    }

    /// A level 1 warrior that is not stored anywhere.
    pub fn sample_hero() -> Hero {
        Hero::new(
            Nickname::new("Sample").unwrap(),
            HeroClass::Warrior,
            Gender::Female,
            "",
            Self::now_fixed(),
        )
        .with_stat_points(0)
    }

    pub async fn register(&self, nickname: &str) -> SessionContext {
        let (_, session) = self
            .app
            .use_cases
            .auth
            .register(RegisterHero {
                nickname: nickname.to_string(),
                class: "Warrior".to_string(),
                gender: "Female".to_string(),
                appearance: String::new(),
            })
            .await
            .unwrap();
        session
    }

    pub async fn hero(&self, session: &SessionContext) -> Hero {
        HeroRepo::get(self.store.as_ref(), session.hero_id)
            .await
            .unwrap()
            .unwrap()
    }

    pub async fn library(&self) -> Vec<Item> {
        ItemLibraryRepo::list(self.store.as_ref()).await.unwrap()
    }
}
