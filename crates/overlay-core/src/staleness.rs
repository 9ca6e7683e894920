//! Time gate for freshness checks

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Remembers when each configuration name was last checked for changes.
///
/// Independent of the per-file load times kept by the file cache.
#[derive(Debug, Default)]
pub struct StalenessController {
    last_check: Mutex<HashMap<String, Instant>>,
}

impl StalenessController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is due for a check, recording `now` as its check time
    /// if so.
    ///
    /// Due when it has never been checked or more than `delay` has passed.
    /// Deciding and recording happen under one lock, so of several
    /// concurrent callers only one sees `true`.
    pub fn take_due(&self, name: &str, now: Instant, delay: Duration) -> bool {
        let mut last_check = self.last_check.lock();
        let due = match last_check.get(name) {
            None => true,
            Some(last) => now.saturating_duration_since(*last) > delay,
        };
        if due {
            last_check.insert(name.to_string(), now);
        }
        due
    }

    pub fn last_check(&self, name: &str) -> Option<Instant> {
        self.last_check.lock().get(name).copied()
    }

    pub fn clear(&self) {
        self.last_check.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_access_is_due_then_gated() {
        let gate = StalenessController::new();
        let t0 = Instant::now();
        let delay = Duration::from_secs(300);

        assert!(gate.take_due("app", t0, delay));
        assert!(!gate.take_due("app", t0 + Duration::from_secs(10), delay));
        assert!(!gate.take_due("app", t0 + delay, delay));
        assert!(gate.take_due("app", t0 + delay + Duration::from_secs(1), delay));
        assert_eq!(gate.last_check("app"), Some(t0 + delay + Duration::from_secs(1)));
    }

    #[test]
    fn names_are_gated_independently() {
        let gate = StalenessController::new();
        let t0 = Instant::now();
        let delay = Duration::from_secs(300);

        assert!(gate.take_due("a", t0, delay));
        assert!(gate.take_due("b", t0, delay));
        assert!(!gate.take_due("a", t0, delay));
    }

    #[test]
    fn zero_delay_checks_every_distinct_instant() {
        let gate = StalenessController::new();
        let t0 = Instant::now();

        assert!(gate.take_due("a", t0, Duration::ZERO));
        assert!(gate.take_due("a", t0 + Duration::from_millis(1), Duration::ZERO));
    }

    #[test]
    fn clear_forgets_everything() {
        let gate = StalenessController::new();
        let t0 = Instant::now();
        gate.take_due("a", t0, Duration::from_secs(300));
        gate.clear();
        assert!(gate.take_due("a", t0, Duration::from_secs(300)));
    }
}
