use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of node creation timestamps (milliseconds since the UNIX epoch).
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;

    /// The value `now_ms` would return, without advancing the clock.
    fn peek_ms(&self) -> u64 {
        self.now_ms()
    }
}

/// Wall-clock time.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Deterministic clock for tests.
///
/// Returns `start`, then advances by `step` on every read.
#[derive(Debug)]
pub struct FixedClock {
    next: AtomicU64,
    step: u64,
}

impl FixedClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
            step,
        }
    }

    /// A clock frozen at `at`.
    pub fn frozen(at: u64) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> u64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }

    fn peek_ms(&self) -> u64 {
        self.next.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }

    #[test]
    fn fixed_clock_advances_by_step() {
        let clock = FixedClock::new(100, 10);
        assert_eq!(clock.now_ms(), 100);
        assert_eq!(clock.now_ms(), 110);
        assert_eq!(clock.now_ms(), 120);
    }

    #[test]
    fn peek_does_not_advance() {
        let clock = FixedClock::new(5, 1);
        assert_eq!(clock.peek_ms(), 5);
        assert_eq!(clock.peek_ms(), 5);
        assert_eq!(clock.now_ms(), 5);
        assert_eq!(clock.peek_ms(), 6);
    }

    #[test]
    fn frozen_clock_never_moves() {
        let clock = FixedClock::frozen(42);
        assert_eq!(clock.now_ms(), 42);
        assert_eq!(clock.now_ms(), 42);
    }
}
