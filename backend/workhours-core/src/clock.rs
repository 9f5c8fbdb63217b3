// src/clock.rs
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::sync::{Arc, Mutex};

/// Source of "now" for everything that depends on today's date.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// Wall-clock time in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Manually driven clock. Clones share the same instant, so a test can keep
/// one handle and move time for the service holding the other.
#[derive(Debug, Clone)]
pub struct TestClock {
    current_time: Arc<Mutex<NaiveDateTime>>,
}

impl TestClock {
    pub fn new(datetime_str: &str) -> Self {
        let dt = NaiveDateTime::parse_from_str(datetime_str, "%Y-%m-%d %H:%M:%S")
            .unwrap_or_else(|_| panic!("Invalid datetime string for TestClock: {}", datetime_str));
        Self::at(dt)
    }

    pub fn at(datetime: NaiveDateTime) -> Self {
        Self {
            current_time: Arc::new(Mutex::new(datetime)),
        }
    }

    pub fn set(&self, datetime: NaiveDateTime) {
        let mut guard = self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = datetime;
    }

    pub fn advance(&self, duration: Duration) {
        let mut guard = self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard += duration;
    }
}

impl Clock for TestClock {
    fn now(&self) -> NaiveDateTime {
        *self
            .current_time
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_shares_time_between_clones() {
        let clock = TestClock::new("2025-03-12 08:30:00");
        let handle = clock.clone();

        handle.advance(Duration::days(2));

        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 14).unwrap());
    }

    #[test]
    fn test_clock_set_moves_across_midnight() {
        let clock = TestClock::new("2025-03-12 23:59:59");
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 12).unwrap());

        clock.advance(Duration::seconds(1));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 13).unwrap());

        clock.set(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
