//! QuestForge Engine - Main entry point.
//!
//! Opens the SQLite store, seeds the item library and, when a hero nickname is
//! configured, runs the maintenance tick (deadline penalties and habit
//! rollover) for that hero until interrupted.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use questforge_domain::starter_library;
use questforge_engine::infrastructure::{
    clock::{OffsetClock, SeededRandom, SystemClock, SystemRandom},
    config::EngineConfig,
    ports::{ClockPort, ItemLibraryRepo, RandomPort},
    sqlite::SqliteStore,
    suggestions::UnavailableSuggestions,
};
use questforge_engine::use_cases::GameError;
use questforge_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the binary may run from `crates/engine`).
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questforge_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting QuestForge Engine");

    let config = EngineConfig::from_env();
    tracing::info!(
        db = %config.db_path,
        seeded = config.rng_seed.is_some(),
        tick_secs = config.tick_interval.as_secs(),
        "Configuration loaded"
    );

    let store = Arc::new(SqliteStore::new(&config.db_path).await?);
    let seeded = store.seed_if_empty(&starter_library()).await?;
    if seeded > 0 {
        tracing::info!(items = seeded, "Seeded item library");
    }

    let mut clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
    if config.time_offset_minutes != 0 {
        tracing::warn!(minutes = config.time_offset_minutes, "Debug time skip active");
        clock = Arc::new(OffsetClock::new(
            clock,
            chrono::Duration::minutes(config.time_offset_minutes),
        ));
    }
    let random: Arc<dyn RandomPort> = match config.rng_seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(SystemRandom::new()),
    };

    let app = App::new(
        store,
        random,
        clock.clone(),
        Arc::new(UnavailableSuggestions),
    );

    let Some(nickname) = config.hero_nickname.as_deref() else {
        tracing::info!("QUESTFORGE_HERO not set, nothing to maintain");
        return Ok(());
    };

    let session = match app.use_cases.auth.login(nickname).await {
        Ok(session) => session,
        Err(GameError::NotFound { .. }) => {
            tracing::warn!(nickname, "No hero with that nickname");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let hero = app.use_cases.progression.get_hero(&session).await?;
    tracing::info!(
        hero_id = %hero.id(),
        level = hero.level(),
        streak = hero.streak_days(),
        "Logged in"
    );

    let mut ticker = tokio::time::interval(config.tick_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match app.use_cases.maintenance.tick(&session, clock.now()).await {
                    Ok(report) => {
                        for line in report.narratives() {
                            tracing::info!("{}", line);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Maintenance tick failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                app.use_cases.auth.logout(session);
                tracing::info!("Shutting down");
                return Ok(());
            }
        }
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
