//! Process-lifetime cache with a fixed time-to-live per entry.
//!
//! Entries are cloned out on read. Concurrent writers may overwrite each
//! other; callers treat the cache as best effort.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

#[derive(Debug)]
struct Entry<V> {
    expires_at: Instant,
    value: V,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns a clone of the live value, evicting it if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` and drops every entry that has already expired.
    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.lock();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key, Entry { expires_at: now + self.ttl, value });
    }

    /// Number of stored entries, expired ones included until the next
    /// insert or read of their key.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_live_entries() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("octocat".to_string(), vec![1, 2, 3]);

        assert_eq!(cache.get(&"octocat".to_string()), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(&"hubot".to_string()), None);
    }

    #[test]
    fn expired_entries_miss_and_are_evicted() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert(1u32, "stale");
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn inserts_prune_other_expired_keys() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("ada", 1);
        cache.insert("grace", 2);
        cache.insert("linus", 3);

        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn inserts_keep_live_keys() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("ada", 1);
        cache.insert("grace", 2);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"ada"), Some(1));
    }

    #[test]
    fn insert_overwrites_previous_value() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert((), 1);
        cache.insert((), 2);
        assert_eq!(cache.get(&()), Some(2));

        cache.clear();
        assert_eq!(cache.get(&()), None);
    }
}
