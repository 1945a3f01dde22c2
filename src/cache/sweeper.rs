use crate::cache::store::Store;
use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace};

const THREAD_NAME: &str = "plain-ttl-cache-sweeper";

/// Background thread removing expired entries every `interval` and, if a lifespan is set,
/// purging the whole store once it elapses.
///
/// Stopping is idempotent. It is safe to stop a sweeper that already terminated on its own
/// after the lifespan purge.
#[derive(Debug)]
pub(crate) struct Sweeper {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    pub(crate) fn start<K, V, S>(
        store: Arc<Store<K, V, S>>,
        interval: Duration,
        lifespan: Option<Duration>,
    ) -> Result<Self>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
        S: BuildHasher + Send + Sync + 'static,
    {
        let signal = Arc::new(StopSignal::default());
        let purge_at = lifespan
            .filter(|lifespan| !lifespan.is_zero())
            .and_then(|lifespan| store.clock().now().checked_add(lifespan));

        let thread_signal = Arc::clone(&signal);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(store, thread_signal, interval, purge_at))
            .map_err(Error::SpawnSweeper)?;

        debug!(?interval, ?lifespan, "sweeper started");

        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub(crate) fn stop(&mut self) {
        self.signal.stop();

        let Some(handle) = self.handle.take() else {
            return;
        };

        // An eviction listener running on the sweeper thread may drop the cache.
        if handle.thread().id() == thread::current().id() {
            return;
        }

        if handle.join().is_err() {
            error!("sweeper thread panicked");
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

#[derive(Debug, Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    condvar: Condvar,
}

impl StopSignal {
    fn stop(&self) {
        let mut stopped = self.stopped.lock();
        *stopped = true;
        self.condvar.notify_all();
    }

    /// Blocks until a stop is requested or `deadline` passes. Without a deadline only a stop
    /// wakes the caller. Returns whether a stop was requested.
    fn wait_until(&self, deadline: Option<Instant>) -> bool {
        let mut stopped = self.stopped.lock();

        if !*stopped {
            match deadline {
                Some(deadline) => {
                    self.condvar.wait_until(&mut stopped, deadline);
                }
                None => self.condvar.wait(&mut stopped),
            }
        }

        *stopped
    }
}

/// `purge_at` is measured on the store clock, sweeps are scheduled on the system clock.
fn run<K, V, S>(
    store: Arc<Store<K, V, S>>,
    signal: Arc<StopSignal>,
    interval: Duration,
    purge_at: Option<Instant>,
) where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    let mut next_sweep = Instant::now().checked_add(interval);

    loop {
        let wake_at = match purge_at {
            Some(purge_at) => {
                let remaining = purge_at.saturating_duration_since(store.clock().now());
                earliest(next_sweep, Instant::now().checked_add(remaining))
            }
            None => next_sweep,
        };

        if signal.wait_until(wake_at) {
            debug!("sweeper stopped");
            return;
        }

        if purge_at.is_some_and(|purge_at| store.clock().now() >= purge_at) {
            let purged = store.purge();
            info!(purged, "cache lifespan elapsed, purged all entries");
            return;
        }

        if next_sweep.is_some_and(|next_sweep| Instant::now() >= next_sweep) {
            let removed = store.delete_expired();
            trace!(removed, "swept expired entries");
            next_sweep = Instant::now().checked_add(interval);
        }
    }
}

fn earliest(a: Option<Instant>, b: Option<Instant>) -> Option<Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
