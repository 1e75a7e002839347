//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Utc};

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    /// Uniform float in `[0, 1)`.
    fn gen_unit(&self) -> f64;
}
