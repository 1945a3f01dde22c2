use std::sync::atomic::{AtomicU64, Ordering};

/// Counters collected since the previous call to [`crate::Cache::stats`].
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Stats {
    pub hit_count: u64,
    pub miss_count: u64,
    /// Entries removed by sweeps because their TTL had elapsed.
    pub expired_count: u64,
    /// Entries removed by purges, whether triggered manually or by the lifespan.
    pub purged_count: u64,
    pub millis_elapsed: u128,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    hit_count: AtomicU64,
    miss_count: AtomicU64,
    expired_count: AtomicU64,
    purged_count: AtomicU64,
}

impl Counters {
    pub(crate) fn increment_hit_count(&self) {
        self.hit_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn increment_miss_count(&self) {
        self.miss_count.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn add_expired_count(&self, count: u64) {
        self.expired_count.fetch_add(count, Ordering::AcqRel);
    }

    pub(crate) fn add_purged_count(&self, count: u64) {
        self.purged_count.fetch_add(count, Ordering::AcqRel);
    }

    /// Reads all counters and resets them to zero.
    pub(crate) fn take(&self, millis_elapsed: u128) -> Stats {
        Stats {
            hit_count: self.hit_count.swap(0, Ordering::AcqRel),
            miss_count: self.miss_count.swap(0, Ordering::AcqRel),
            expired_count: self.expired_count.swap(0, Ordering::AcqRel),
            purged_count: self.purged_count.swap(0, Ordering::AcqRel),
            millis_elapsed,
        }
    }
}
