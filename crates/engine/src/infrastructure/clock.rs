//! Clock and random implementations.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::infrastructure::ports::{ClockPort, RandomPort};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Shifts another clock by a fixed amount. Used for the debug time skip.
pub struct OffsetClock {
    inner: Arc<dyn ClockPort>,
    offset: Duration,
}

impl OffsetClock {
    pub fn new(inner: Arc<dyn ClockPort>, offset: Duration) -> Self {
        Self { inner, offset }
    }
}

impl ClockPort for OffsetClock {
    fn now(&self) -> DateTime<Utc> {
        self.inner.now() + self.offset
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible random source for replaying a run.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut guard = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl RandomPort for SeededRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.with_rng(|rng| rng.gen_range(min..=max))
    }

    fn gen_unit(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Scripted random for testing.
///
/// Integer and unit draws are served from separate queues. An exhausted queue
/// falls back to the low end of the requested range, and to `0.99` for units
/// (never dodges, never drops).
#[cfg(test)]
pub struct ScriptedRandom {
    ints: Mutex<std::collections::VecDeque<i32>>,
    units: Mutex<std::collections::VecDeque<f64>>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(ints: impl IntoIterator<Item = i32>, units: impl IntoIterator<Item = f64>) -> Self {
        Self {
            ints: Mutex::new(ints.into_iter().collect()),
            units: Mutex::new(units.into_iter().collect()),
        }
    }

    /// No scripted draws at all.
    pub fn quiet() -> Self {
        Self::new([], [])
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.ints
            .lock()
            .unwrap()
            .pop_front()
            .map(|v| v.clamp(min, max))
            .unwrap_or(min)
    }

    fn gen_unit(&self) -> f64 {
        self.units.lock().unwrap().pop_front().unwrap_or(0.99)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let draws_a: Vec<i32> = (0..20).map(|_| a.gen_range(1, 100)).collect();
        let draws_b: Vec<i32> = (0..20).map(|_| b.gen_range(1, 100)).collect();
        assert_eq!(draws_a, draws_b);
        assert!(draws_a.iter().all(|v| (1..=100).contains(v)));
    }

    #[test]
    fn seeded_unit_stays_in_range() {
        let rng = SeededRandom::new(7);
        for _ in 0..100 {
            let unit = rng.gen_unit();
            assert!((0.0..1.0).contains(&unit));
        }
    }

    #[test]
    fn offset_clock_shifts_time() {
        let base = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let clock = OffsetClock::new(Arc::new(FixedClock(base)), Duration::minutes(90));
        assert_eq!(clock.now(), base + Duration::minutes(90));
    }

    #[test]
    fn scripted_random_clamps_and_falls_back() {
        let rng = ScriptedRandom::new([150, -7], [0.25]);
        assert_eq!(rng.gen_range(1, 100), 100);
        assert_eq!(rng.gen_range(-2, 2), -2);
        assert_eq!(rng.gen_range(1, 100), 1);
        assert_eq!(rng.gen_unit(), 0.25);
        assert_eq!(rng.gen_unit(), 0.99);
    }
}
