use crate::Stats;
use crate::config::Config;
use crate::error::Result;
use parking_lot::Mutex;
use std::borrow::Borrow;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::time::{Duration, Instant};
use store::Store;
use sweeper::Sweeper;

mod builder;
pub(crate) mod clock;
mod entry;
mod expiration;
pub(crate) mod stats;
mod store;
mod sweeper;

pub use builder::Builder;
pub use expiration::Expiration;
pub use store::{EvictionListener, RemovalCause};

pub(crate) type RandomState = ahash::RandomState;

/// Thread-safe in-memory cache with per-entry TTL.
///
/// All entries live in a single map behind a reader/writer lock: [`Cache::get`] takes the read
/// lock, every mutation takes the write lock. Expired entries are hidden on read right away and
/// removed by a background sweeper thread, if the cache was configured with a non-zero cleanup
/// interval. The sweeper can additionally purge the whole cache once a lifespan has elapsed.
///
/// Wrap the cache in a [`std::sync::Arc`] to share it between threads. Dropping the cache, or
/// calling [`Cache::shutdown`], stops the sweeper.
#[derive(Debug)]
pub struct Cache<K, V, S = RandomState> {
    store: Arc<Store<K, V, S>>,
    sweeper: Mutex<Option<Sweeper>>,
    metrics_last_accessed: Mutex<Instant>,
}

impl<K, V> Cache<K, V, RandomState>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache whose entries set with [`Expiration::Default`] use `default_ttl`, and which
    /// sweeps expired entries every `cleanup_interval`.
    ///
    /// A `default_ttl` of [`Expiration::Default`] (or [`Duration::ZERO`]) means entries never
    /// expire by default. A zero `cleanup_interval` starts no sweeper.
    ///
    /// # Errors
    ///
    /// Fails if the sweeper thread cannot be spawned.
    pub fn new(default_ttl: impl Into<Expiration>, cleanup_interval: Duration) -> Result<Self> {
        Self::with_config(
            Config::new()
                .with_default_ttl(default_ttl)
                .with_cleanup_interval(cleanup_interval),
        )
    }

    /// # Errors
    ///
    /// Fails if the sweeper thread cannot be spawned.
    pub fn with_config(config: Config) -> Result<Self> {
        Self::builder(config).build()
    }
}

impl<K, V> Cache<K, V, RandomState> {
    pub fn builder(config: Config) -> Builder<K, V, RandomState> {
        Builder::new(config)
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// Returns the value corresponding to the key, unless it is absent or expired.
    ///
    /// An expired entry is not removed here; it stays in memory until the next sweep or an
    /// explicit [`Cache::delete`]. The value is cloned, consider wrapping values in
    /// [`std::sync::Arc`] if cloning is expensive.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.get(key)
    }

    /// Inserts a key-value pair, replacing any previous value and expiration of the key.
    ///
    /// `ttl` accepts an [`Expiration`] or a [`Duration`]; [`Duration::ZERO`] selects the default
    /// TTL of the cache.
    pub fn set(&self, key: K, value: V, ttl: impl Into<Expiration>) {
        self.store.set(key, value, ttl.into())
    }

    /// Removes the key. Returns whether it was present, including entries that had expired but
    /// were not swept yet. Deleting an absent key does nothing.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.store.delete(key)
    }

    /// Removes all expired entries right away and returns how many were removed.
    ///
    /// Holds the write lock for the whole scan.
    pub fn delete_expired(&self) -> usize {
        self.store.delete_expired()
    }
}

impl<K, V, S> Cache<K, V, S> {
    pub(crate) fn from_parts(store: Arc<Store<K, V, S>>, sweeper: Option<Sweeper>) -> Self {
        Self {
            store,
            sweeper: Mutex::new(sweeper),
            metrics_last_accessed: Mutex::new(Instant::now()),
        }
    }

    /// Removes all entries, expired or not, and returns how many were removed.
    pub fn purge(&self) -> usize {
        self.store.purge()
    }

    /// Number of entries held, including expired entries not swept yet.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The TTL used for entries set with [`Expiration::Default`]. Never [`Expiration::Default`]
    /// itself.
    pub fn default_ttl(&self) -> Expiration {
        self.store.default_ttl()
    }

    /// Whether the sweeper thread is still running. It is not once the cache was shut down, its
    /// lifespan elapsed, or if it was created without a cleanup interval.
    pub fn is_sweeping(&self) -> bool {
        self.sweeper
            .lock()
            .as_ref()
            .is_some_and(Sweeper::is_running)
    }

    /// Stops the sweeper and waits for its thread to exit. Calling it more than once, or after
    /// the lifespan purge already stopped the sweeper, does nothing. The cache stays usable,
    /// expired entries are then only hidden on read.
    pub fn shutdown(&self) {
        let sweeper = self.sweeper.lock().take();

        if let Some(mut sweeper) = sweeper {
            sweeper.stop();
        }
    }

    /// Returns the counters collected since the previous call and resets them.
    pub fn stats(&self) -> Stats {
        let millis_elapsed = {
            let mut guard = self.metrics_last_accessed.lock();
            let millis_elapsed = guard.elapsed().as_millis();
            *guard = Instant::now();
            millis_elapsed
        };

        self.store.counters().take(millis_elapsed)
    }
}
