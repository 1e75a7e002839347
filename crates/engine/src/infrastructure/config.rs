//! Engine configuration read from the environment.

use std::str::FromStr;
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "questforge.db";
const DEFAULT_TICK_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// SQLite database file
    pub db_path: String,
    /// Seed for reproducible runs; `None` uses system randomness
    pub rng_seed: Option<u64>,
    /// Period of the maintenance tick
    pub tick_interval: Duration,
    /// Nickname the runner logs in as
    pub hero_nickname: Option<String>,
    /// Debug time skip added to the system clock
    pub time_offset_minutes: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_DB_PATH.to_string(),
            rng_seed: None,
            tick_interval: Duration::from_secs(DEFAULT_TICK_SECS),
            hero_nickname: None,
            time_offset_minutes: 0,
        }
    }
}

impl EngineConfig {
    /// Read `QUESTFORGE_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let tick_secs = parse_or(value("QUESTFORGE_TICK_SECS"), "QUESTFORGE_TICK_SECS", DEFAULT_TICK_SECS);
        let tick_secs = if tick_secs == 0 {
            tracing::warn!("QUESTFORGE_TICK_SECS must be positive, using {}", DEFAULT_TICK_SECS);
            DEFAULT_TICK_SECS
        } else {
            tick_secs
        };

        Self {
            db_path: value("QUESTFORGE_DB").unwrap_or(defaults.db_path),
            rng_seed: value("QUESTFORGE_RNG_SEED").and_then(|raw| match raw.parse() {
                Ok(seed) => Some(seed),
                Err(e) => {
                    tracing::warn!(value = %raw, error = %e, "Ignoring invalid QUESTFORGE_RNG_SEED");
                    None
                }
            }),
            tick_interval: Duration::from_secs(tick_secs),
            hero_nickname: value("QUESTFORGE_HERO"),
            time_offset_minutes: parse_or(
                value("QUESTFORGE_TIME_OFFSET_MINUTES"),
                "QUESTFORGE_TIME_OFFSET_MINUTES",
                0,
            ),
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    T::Err: std::fmt::Display,
{
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!(key, value = %raw, error = %e, "Invalid value, using default {}", default);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> EngineConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EngineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]), EngineConfig::default());
    }

    #[test]
    fn values_are_read() {
        let config = config_from(&[
            ("QUESTFORGE_DB", "/tmp/hero.db"),
            ("QUESTFORGE_RNG_SEED", "1234"),
            ("QUESTFORGE_TICK_SECS", "15"),
            ("QUESTFORGE_HERO", " Aria "),
            ("QUESTFORGE_TIME_OFFSET_MINUTES", "-30"),
        ]);
        assert_eq!(config.db_path, "/tmp/hero.db");
        assert_eq!(config.rng_seed, Some(1234));
        assert_eq!(config.tick_interval, Duration::from_secs(15));
        assert_eq!(config.hero_nickname.as_deref(), Some("Aria"));
        assert_eq!(config.time_offset_minutes, -30);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("QUESTFORGE_RNG_SEED", "not-a-seed"),
            ("QUESTFORGE_TICK_SECS", "0"),
            ("QUESTFORGE_TIME_OFFSET_MINUTES", "soon"),
            ("QUESTFORGE_HERO", "   "),
        ]);
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.tick_interval, Duration::from_secs(60));
        assert_eq!(config.time_offset_minutes, 0);
        assert_eq!(config.hero_nickname, None);
    }
}
