//! Registration and the explicit session value.

use std::sync::Arc;

use questforge_domain::{Gender, Hero, HeroClass, HeroId, Nickname};

use crate::infrastructure::ports::{ClockPort, HeroRepo};

use super::error::GameError;

/// The logged-in hero. Passed explicitly into every use case; never stored in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionContext {
    pub hero_id: HeroId,
}

impl SessionContext {
    pub fn new(hero_id: HeroId) -> Self {
        Self { hero_id }
    }
}

/// Raw registration form.
#[derive(Debug, Clone)]
pub struct RegisterHero {
    pub nickname: String,
    pub class: String,
    pub gender: String,
    pub appearance: String,
}

/// Load the session's hero or fail with `GameError::Session`.
pub(crate) async fn require_hero(
    heroes: &dyn HeroRepo,
    session: &SessionContext,
) -> Result<Hero, GameError> {
    heroes
        .get(session.hero_id)
        .await?
        .ok_or(GameError::Session(session.hero_id))
}

pub struct AuthUseCases {
    heroes: Arc<dyn HeroRepo>,
    clock: Arc<dyn ClockPort>,
}

impl AuthUseCases {
    pub fn new(heroes: Arc<dyn HeroRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { heroes, clock }
    }

    /// Create a hero with full HP and mana and open a session for it.
    ///
    /// # Errors
    ///
    /// `Validation` for a bad nickname, class or gender; `Integrity` when the
    /// nickname is taken.
    #[tracing::instrument(skip(self, form), fields(nickname = %form.nickname))]
    pub async fn register(&self, form: RegisterHero) -> Result<(Hero, SessionContext), GameError> {
        let nickname = Nickname::new(form.nickname)?;
        let class: HeroClass = form.class.parse()?;
        let gender: Gender = form.gender.parse()?;

        let hero = Hero::new(nickname, class, gender, form.appearance.trim(), self.clock.now());
        self.heroes.create(&hero).await?;

        tracing::info!(hero_id = %hero.id(), class = %class, "Hero registered");
        let session = SessionContext::new(hero.id());
        Ok((hero, session))
    }

    pub async fn login(&self, nickname: &str) -> Result<SessionContext, GameError> {
        let hero = self
            .heroes
            .get_by_nickname(nickname)
            .await?
            .ok_or_else(|| GameError::not_found("Hero", nickname.trim()))?;
        tracing::info!(hero_id = %hero.id(), "Hero logged in");
        Ok(SessionContext::new(hero.id()))
    }

    /// Ends the session. The hero record stays.
    pub fn logout(&self, session: SessionContext) {
        tracing::info!(hero_id = %session.hero_id, "Hero logged out");
    }
}
