//! Time source for combo timing, in seconds.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::time::Instant;

pub trait Clock: Send {
    /// Seconds since an arbitrary fixed origin; never decreases
    fn now(&self) -> f64;
}

/// Monotonic clock backed by the tokio timer, so paused test time applies
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Settable clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        let clock = Self::default();
        clock.set(start);
        clock
    }

    pub fn set(&self, secs: f64) {
        self.bits.store(secs.to_bits(), Ordering::SeqCst);
    }

    pub fn advance(&self, secs: f64) {
        self.set(self.now() + secs);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_manual_clock_is_shared() {
        let clock = ManualClock::new(1.5);
        let other = clock.clone();
        other.advance(0.25);
        assert_eq!(clock.now(), 1.75);
    }

    #[test]
    fn test_default_manual_clock_starts_at_zero() {
        assert_eq!(ManualClock::default().now(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_system_clock_follows_tokio_time() {
        let clock = SystemClock::new();
        tokio::time::advance(Duration::from_millis(2500)).await;
        let now = clock.now();
        assert!((now - 2.5).abs() < 1e-3, "now = {}", now);
    }
}
