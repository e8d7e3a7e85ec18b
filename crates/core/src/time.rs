use chrono::{DateTime, Duration, TimeZone, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
///
/// The quiz countdown is wall-clock anchored (`remaining = limit - (now -
/// started_at)`), so everything that touches time goes through this seam.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests and doc examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Never panics; the constant is a valid unix timestamp.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.timestamp_opt(FIXED_TEST_TIMESTAMP, 0).unwrap()
}
