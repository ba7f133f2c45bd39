// src/services/cache.rs

//! In-memory page cache with time-based expiry.
//!
//! Entries are keyed by selection and page number. Expired entries are
//! dropped lazily: on lookup, and opportunistically whenever a new page is
//! stored. There is no background sweeper.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::models::{CacheConfig, PageKey, ResultItem};

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually advanced clock.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// A cached page of normalized results.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Items in upstream order
    pub items: Vec<ResultItem>,

    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// The page held fewer items than requested; no further pages exist
    pub exhausted: bool,
}

impl CacheEntry {
    /// Check if the entry is still fresh at `now`.
    pub fn is_valid(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at < ttl
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Page cache shared by everything that composes a browser.
pub struct PageCache {
    entries: DashMap<PageKey, CacheEntry>,
    config: CacheConfig,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Thread-safe handle to the cache.
pub type SharedPageCache = Arc<PageCache>;

impl PageCache {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: config.ttl(),
            config,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get a fresh entry, evicting it if it has expired.
    pub fn get(&self, key: &PageKey) -> Option<CacheEntry> {
        if !self.config.enabled {
            return None;
        }

        let now = self.clock.now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_valid(now, self.ttl) {
                log::debug!("Cache hit for {}", key);
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.clone());
            }
        }

        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_valid(now, self.ttl))
            .is_some()
        {
            log::debug!("Cache expired for {}", key);
        } else {
            log::debug!("Cache miss for {}", key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a freshly fetched page.
    pub fn insert(&self, key: PageKey, items: Vec<ResultItem>, exhausted: bool) -> CacheEntry {
        let entry = CacheEntry {
            items,
            fetched_at: self.clock.now(),
            exhausted,
        };
        if !self.config.enabled {
            return entry;
        }

        self.evict_expired();
        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.evict_oldest();
        }

        log::debug!("Stored {} items for {}", entry.items.len(), key);
        self.entries.insert(key, entry.clone());
        entry
    }

    /// Remove expired entries.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_valid(now, self.ttl));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            log::debug!("Evicted {} expired cache entries", evicted);
        }
        evicted
    }

    /// Remove the oldest quarter of entries when at capacity.
    fn evict_oldest(&self) {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().fetched_at))
            .collect();
        entries.sort_by_key(|(_, fetched_at)| *fetched_at);

        let to_remove = (self.config.max_entries / 4).max(1);
        for (key, _) in entries.into_iter().take(to_remove) {
            self.entries.remove(&key);
        }
        log::debug!("Evicted {} oldest cache entries", to_remove);
    }

    /// Clear all cache entries.
    pub fn clear(&self) {
        self.entries.clear();
        log::info!("Cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let total_entries = self.entries.len();
        let expired_entries = self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_valid(now, self.ttl))
            .count();

        CacheStats {
            total_entries,
            valid_entries: total_entries - expired_entries,
            expired_entries,
            max_entries: self.config.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
