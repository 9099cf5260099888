use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::{Page, QueryKey};

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    pages: Vec<Page<T>>,
    updated_at: Instant,
}

/// Pages per query key, considered fresh for `stale_time` after the last update.
#[derive(Debug, Clone)]
pub struct QueryCache<T> {
    stale_time: Duration,
    entries: HashMap<QueryKey, CacheEntry<T>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_TIME)
    }
}

impl<T> QueryCache<T> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            stale_time,
            entries: HashMap::new(),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    pub fn is_fresh(&self, key: &QueryKey, now: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| self.entry_is_fresh(entry, now))
    }

    fn entry_is_fresh(&self, entry: &CacheEntry<T>, now: Instant) -> bool {
        now.saturating_duration_since(entry.updated_at) < self.stale_time
    }

    pub fn invalidate(&mut self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drops stale entries and returns how many were removed.
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        let stale_time = self.stale_time;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.updated_at) < stale_time);
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Clone> QueryCache<T> {
    pub fn store(&mut self, key: &QueryKey, pages: &[Page<T>], now: Instant) {
        if pages.is_empty() {
            return;
        }
        self.entries.insert(
            key.clone(),
            CacheEntry {
                pages: pages.to_vec(),
                updated_at: now,
            },
        );
    }

    /// Cached pages for `key` if they are still fresh.
    pub fn fresh(&self, key: &QueryKey, now: Instant) -> Option<Vec<Page<T>>> {
        self.entries
            .get(key)
            .filter(|entry| self.entry_is_fresh(entry, now))
            .map(|entry| entry.pages.clone())
    }
}
