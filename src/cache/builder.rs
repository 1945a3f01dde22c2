use crate::cache::clock::{Clock, SystemClock};
use crate::cache::store::{EvictionListener, RemovalCause, Store};
use crate::cache::sweeper::Sweeper;
use crate::cache::{Cache, RandomState};
use crate::config::Config;
use crate::error::Result;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use tracing::warn;

/// Configures the parts of a [`Cache`] that are not plain data: the clock, the hasher and the
/// eviction listener.
///
/// Created by [`Cache::builder`].
pub struct Builder<K, V, S = RandomState> {
    config: Config,
    clock: Arc<dyn Clock>,
    hash_builder: S,
    listener: Option<EvictionListener<K, V>>,
}

impl<K, V> Builder<K, V, RandomState> {
    pub(crate) fn new(config: Config) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            hash_builder: RandomState::default(),
            listener: None,
        }
    }
}

impl<K, V, S> Builder<K, V, S> {
    /// Replaces the system clock, e.g. with a [`crate::ManualClock`] in tests.
    pub fn clock(mut self, clock: impl Clock) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn hasher<T>(self, hash_builder: T) -> Builder<K, V, T> {
        Builder {
            config: self.config,
            clock: self.clock,
            hash_builder,
            listener: self.listener,
        }
    }

    /// Registers a callback invoked for every entry removed by a delete, a sweep or a purge.
    ///
    /// The callback runs after the store lock is released, so it may call back into the cache.
    /// Removals by sweeps and lifespan purges run it on the sweeper thread.
    pub fn on_evicted(
        mut self,
        listener: impl Fn(K, V, RemovalCause) + Send + Sync + 'static,
    ) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }
}

impl<K, V, S> Builder<K, V, S>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    /// Creates the cache and starts its sweeper if the cleanup interval is non-zero.
    ///
    /// # Errors
    ///
    /// Fails if the sweeper thread cannot be spawned.
    pub fn build(self) -> Result<Cache<K, V, S>> {
        let Builder {
            config,
            clock,
            hash_builder,
            listener,
            ..
        } = self;

        let store = Arc::new(Store::with_hasher(
            config.default_ttl,
            clock,
            hash_builder,
            listener,
        ));

        let sweeper = if config.sweeps() {
            Some(Sweeper::start(
                Arc::clone(&store),
                config.cleanup_interval,
                config.lifespan,
            )?)
        } else {
            if let Some(lifespan) = config.lifespan {
                warn!(
                    ?lifespan,
                    "lifespan is ignored because the cleanup interval is zero"
                );
            }
            None
        };

        Ok(Cache::from_parts(store, sweeper))
    }
}

impl<K, V, S> fmt::Debug for Builder<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}
