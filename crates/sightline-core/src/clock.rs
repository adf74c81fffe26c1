//! Capture-time source for observed contexts.

use chrono::{DateTime, SubsecRound, Utc};

/// Source of the server-observed capture time.
///
/// Implementations must return UTC timestamps truncated to microseconds,
/// the resolution of storage keys.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}

/// Clock pinned to a single instant, used by tests and replay tooling.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self(time.trunc_subsecs(6))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_system_clock_microsecond_resolution() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000, 0);
    }

    #[test]
    fn test_fixed_clock_truncates() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::nanoseconds(6_789);
        let clock = FixedClock::new(t);
        assert_eq!(clock.now().nanosecond(), 6_000);
        assert_eq!(clock.now(), clock.now());
    }
}
