use crate::cache::RandomState;
use crate::cache::clock::Clock;
use crate::cache::entry::Entry;
use crate::cache::expiration::Expiration;
use crate::cache::stats::Counters;
use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::sync::Arc;

/// Why an entry left the cache.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RemovalCause {
    /// Removed by [`crate::Cache::delete`].
    Deleted,
    /// Removed by a sweep after its TTL had elapsed.
    Expired,
    /// Removed by a purge, either manual or at the end of the cache lifespan.
    Purged,
}

/// Called with every entry removed by a delete, sweep or purge. Overwrites by `set` are not
/// reported.
pub type EvictionListener<K, V> = Box<dyn Fn(K, V, RemovalCause) + Send + Sync>;

pub(crate) struct Store<K, V, S = RandomState> {
    entries: RwLock<HashMap<K, Entry<V>, S>>,
    default_ttl: Expiration,
    clock: Arc<dyn Clock>,
    counters: Counters,
    listener: Option<EvictionListener<K, V>>,
}

impl<K, V, S> Store<K, V, S> {
    pub(crate) fn with_hasher(
        default_ttl: Expiration,
        clock: Arc<dyn Clock>,
        hash_builder: S,
        listener: Option<EvictionListener<K, V>>,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::with_hasher(hash_builder)),
            default_ttl: default_ttl.as_default_ttl(),
            clock,
            counters: Counters::default(),
            listener,
        }
    }

    pub(crate) fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub(crate) fn default_ttl(&self) -> Expiration {
        self.default_ttl
    }

    pub(crate) fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Number of entries held, including expired entries no sweep has removed yet.
    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Removes every entry, expired or not.
    pub(crate) fn purge(&self) -> usize {
        let removed: Vec<(K, Entry<V>)> = {
            let mut entries = self.entries.write();

            if self.listener.is_none() {
                let count = entries.len();
                entries.clear();
                self.counters.add_purged_count(count as u64);
                return count;
            }

            entries.drain().collect()
        };

        let count = removed.len();
        self.counters.add_purged_count(count as u64);
        self.notify(removed, RemovalCause::Purged);
        count
    }

    fn notify(&self, removed: Vec<(K, Entry<V>)>, cause: RemovalCause) {
        if let Some(listener) = &self.listener {
            for (key, entry) in removed {
                listener(key, entry.into_value(), cause);
            }
        }
    }
}

impl<K, V, S> Store<K, V, S>
where
    K: Clone + Eq + Hash,
    V: Clone,
    S: BuildHasher,
{
    /// Returns a clone of the value, or `None` if the key is absent or expired.
    ///
    /// An expired entry is left in place for the next sweep.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let now = self.clock.now();
        let entries = self.entries.read();

        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                self.counters.increment_hit_count();
                Some(entry.value().clone())
            }
            _ => {
                self.counters.increment_miss_count();
                None
            }
        }
    }

    pub(crate) fn set(&self, key: K, value: V, ttl: Expiration) {
        let expires_at = ttl
            .resolve(self.default_ttl)
            .and_then(|ttl| self.clock.now().checked_add(ttl));

        let mut entries = self.entries.write();
        entries.insert(key, Entry::new(value, expires_at));
    }

    /// Removes the key and reports whether it was present, expired or not.
    pub(crate) fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let removed = self.entries.write().remove_entry(key);

        match removed {
            Some(removed) => {
                self.notify(vec![removed], RemovalCause::Deleted);
                true
            }
            None => false,
        }
    }

    /// Removes every expired entry while holding the write lock for the whole scan.
    pub(crate) fn delete_expired(&self) -> usize {
        let now = self.clock.now();

        let removed = {
            let mut entries = self.entries.write();

            if self.listener.is_none() {
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired(now));
                let count = before - entries.len();
                self.counters.add_expired_count(count as u64);
                return count;
            }

            let expired_keys: Vec<K> = entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone())
                .collect();

            expired_keys
                .iter()
                .filter_map(|key| entries.remove_entry(key))
                .collect::<Vec<_>>()
        };

        let count = removed.len();
        self.counters.add_expired_count(count as u64);
        self.notify(removed, RemovalCause::Expired);
        count
    }
}

impl<K, V, S> fmt::Debug for Store<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.len())
            .field("default_ttl", &self.default_ttl)
            .field("clock", &self.clock)
            .field("counters", &self.counters)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use parking_lot::Mutex;
    use std::time::Duration;

    fn store_with(clock: &ManualClock, default_ttl: Expiration) -> Store<String, String> {
        Store::with_hasher(default_ttl, Arc::new(clock.clone()), RandomState::default(), None)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn it_gets_what_was_set() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);

        // when
        store.set("key1".into(), "value1".into(), Expiration::Never);

        // then
        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.get("key2"), None);
    }

    #[test]
    fn it_hides_expired_entries_without_removing_them() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("key".into(), "value".into(), Expiration::After(ms(10)));

        // when
        clock.advance(ms(5));
        let before = store.get("key");
        clock.advance(ms(10));
        let after = store.get("key");

        // then
        assert_eq!(before, Some("value".to_string()));
        assert_eq!(after, None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn it_treats_the_deadline_itself_as_alive() {
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("key".into(), "value".into(), Expiration::After(ms(10)));

        clock.advance(ms(10));

        assert_eq!(store.get("key"), Some("value".to_string()));
    }

    #[test]
    fn it_resolves_the_default_ttl() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::After(ms(10)));

        // when
        store.set("default".into(), "a".into(), Expiration::Default);
        store.set("explicit".into(), "b".into(), Expiration::After(ms(10)));
        clock.advance(ms(9));

        // then
        assert_eq!(store.get("default"), Some("a".to_string()));
        assert_eq!(store.get("explicit"), Some("b".to_string()));

        clock.advance(ms(2));
        assert_eq!(store.get("default"), None);
        assert_eq!(store.get("explicit"), None);
    }

    #[test]
    fn it_treats_a_default_default_as_never() {
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Default);

        store.set("key".into(), "value".into(), Expiration::Default);
        clock.advance(Duration::from_secs(86_400 * 365));

        assert_eq!(store.default_ttl(), Expiration::Never);
        assert_eq!(store.get("key"), Some("value".to_string()));
    }

    #[test]
    fn it_overwrites_value_and_ttl() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("key".into(), "v1".into(), Expiration::Never);

        // when
        store.set("key".into(), "v2".into(), Expiration::After(ms(5)));

        // then
        assert_eq!(store.get("key"), Some("v2".to_string()));
        clock.advance(ms(6));
        assert_eq!(store.get("key"), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn it_never_expires_on_overflowing_deadline() {
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);

        store.set("key".into(), "value".into(), Expiration::After(Duration::MAX));
        clock.advance(Duration::from_secs(86_400 * 365 * 100));

        assert_eq!(store.get("key"), Some("value".to_string()));
    }

    #[test]
    fn it_deletes_idempotently() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("key".into(), "value".into(), Expiration::Never);

        // when
        let first = store.delete("key");
        let second = store.delete("key");

        // then
        assert!(first);
        assert!(!second);
        assert!(!store.delete("missing"));
        assert_eq!(store.get("key"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn it_deletes_only_expired_entries() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("short".into(), "a".into(), Expiration::After(ms(1)));
        store.set("long".into(), "b".into(), Expiration::After(ms(100)));
        store.set("forever".into(), "c".into(), Expiration::Never);

        // when
        clock.advance(ms(2));
        let removed = store.delete_expired();

        // then
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("long"), Some("b".to_string()));
        assert_eq!(store.get("forever"), Some("c".to_string()));
        assert_eq!(store.counters().take(0).expired_count, 1);
    }

    #[test]
    fn it_purges_everything() {
        // given
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("a".into(), "1".into(), Expiration::Never);
        store.set("b".into(), "2".into(), Expiration::After(ms(1)));

        // when
        let purged = store.purge();

        // then
        assert_eq!(purged, 2);
        assert_eq!(store.len(), 0);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.counters().take(0).purged_count, 2);
    }

    #[test]
    fn it_notifies_the_listener_with_the_cause() {
        // given
        let clock = ManualClock::new();
        let removed = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&removed);
        let listener: EvictionListener<String, String> = Box::new(move |key, value, cause| {
            sink.lock().push((key, value, cause));
        });
        let store = Store::with_hasher(
            Expiration::Never,
            Arc::new(clock.clone()),
            RandomState::default(),
            Some(listener),
        );
        store.set("deleted".into(), "1".into(), Expiration::Never);
        store.set("expired".into(), "2".into(), Expiration::After(ms(1)));
        store.set("purged".into(), "3".into(), Expiration::Never);
        store.set("purged".into(), "4".into(), Expiration::Never);

        // when
        store.delete("deleted");
        store.delete("deleted");
        clock.advance(ms(2));
        store.delete_expired();
        store.purge();

        // then
        let removed = removed.lock();
        assert_eq!(
            *removed,
            vec![
                ("deleted".to_string(), "1".to_string(), RemovalCause::Deleted),
                ("expired".to_string(), "2".to_string(), RemovalCause::Expired),
                ("purged".to_string(), "4".to_string(), RemovalCause::Purged),
            ]
        );
    }

    #[test]
    fn it_lets_the_listener_use_the_store() {
        // given
        let clock = ManualClock::new();
        let store: Arc<Store<String, String>> = Arc::new_cyclic(|weak| {
            let weak: std::sync::Weak<Store<String, String>> = weak.clone();
            let listener: EvictionListener<String, String> = Box::new(move |key, _, _| {
                if let Some(store) = weak.upgrade() {
                    store.set(format!("{key}-gone"), "tombstone".into(), Expiration::Never);
                }
            });
            Store::with_hasher(
                Expiration::Never,
                Arc::new(clock.clone()),
                RandomState::default(),
                Some(listener),
            )
        });
        store.set("key".into(), "value".into(), Expiration::Never);

        // when
        store.delete("key");

        // then
        assert_eq!(store.get("key-gone"), Some("tombstone".to_string()));
    }

    #[test]
    fn it_counts_hits_and_misses() {
        let clock = ManualClock::new();
        let store = store_with(&clock, Expiration::Never);
        store.set("key".into(), "value".into(), Expiration::After(ms(1)));

        store.get("key");
        store.get("missing");
        clock.advance(ms(2));
        store.get("key");

        let stats = store.counters().take(0);
        assert_eq!(stats.hit_count, 1);
        assert_eq!(stats.miss_count, 2);
    }
}
