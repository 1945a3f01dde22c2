use parking_lot::Mutex;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of the current instant used to stamp and check expirations.
pub trait Clock: Debug + Send + Sync + 'static {
    fn now(&self) -> Instant;
}

/// Reads the monotonic system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the other to the cache.
///
/// ```rust
/// use plain_ttl_cache::{Cache, Config, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let cache = Cache::builder(Config::new())
///     .clock(clock.clone())
///     .build()
///     .unwrap();
///
/// cache.set("key", 1, Duration::from_secs(10));
/// clock.advance(Duration::from_secs(11));
/// assert_eq!(cache.get("key"), None);
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Moves the clock forward. An advance past the largest representable instant leaves the
    /// clock unchanged.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        if let Some(advanced) = now.checked_add(by) {
            *now = advanced;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}
