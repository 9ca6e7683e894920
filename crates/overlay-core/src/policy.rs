//! Reload policy: the store-wide "frozen" switch and the check interval

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

/// Default interval between freshness checks for one name.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(300);

/// Store-wide reload settings.
#[derive(Debug)]
pub struct ReloadPolicy {
    disabled: AtomicBool,
    delay_ms: AtomicU64,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self::new(false, DEFAULT_RELOAD_DELAY)
    }
}

impl ReloadPolicy {
    pub fn new(disabled: bool, delay: Duration) -> Self {
        Self {
            disabled: AtomicBool::new(disabled),
            delay_ms: AtomicU64::new(duration_ms(delay)),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.disabled.store(disabled, Ordering::SeqCst);
    }

    /// Set the flag, returning the previous value.
    pub fn swap_disabled(&self, disabled: bool) -> bool {
        self.disabled.swap(disabled, Ordering::SeqCst)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms.load(Ordering::SeqCst))
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(duration_ms(delay), Ordering::SeqCst);
    }

    /// Disable reloading until the returned guard is dropped.
    ///
    /// Guards nest: each one restores exactly the value it replaced.
    pub fn disable(&self) -> ReloadGuard<'_> {
        let previous = self.swap_disabled(true);
        ReloadGuard {
            policy: self,
            previous,
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Restores the previous reload-disabled flag on drop, including on unwind.
#[must_use = "reloading is re-enabled as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ReloadGuard<'a> {
    policy: &'a ReloadPolicy,
    previous: bool,
}

impl ReloadGuard<'_> {
    /// The flag value that will be restored.
    pub fn previous(&self) -> bool {
        self.previous
    }
}

impl Drop for ReloadGuard<'_> {
    fn drop(&mut self) {
        self.policy.set_disabled(self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let policy = ReloadPolicy::default();
        assert!(!policy.is_disabled());
        assert_eq!(policy.delay(), Duration::from_secs(300));
    }

    #[test]
    fn guards_nest_and_restore() {
        let policy = ReloadPolicy::default();
        {
            let outer = policy.disable();
            assert!(!outer.previous());
            {
                let inner = policy.disable();
                assert!(inner.previous());
                assert!(policy.is_disabled());
            }
            assert!(policy.is_disabled());
        }
        assert!(!policy.is_disabled());
    }

    #[test]
    fn guard_restores_on_panic() {
        let policy = ReloadPolicy::default();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = policy.disable();
            panic!("boom");
        }));
        assert!(result.is_err());
        assert!(!policy.is_disabled());
    }
}
