//! Two-tier TTL cache of feed query results.
//!
//! Entries move through `Fresh -> Stale -> Expired` as they age. An entry is
//! only ever replaced whole, never edited, so readers holding an
//! `Arc<CacheEntry>` always see a consistent batch.

use std::{
  collections::HashMap,
  sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicU64, Ordering},
  },
  time::Duration,
};

use shelf_core::event::Event;
use tokio::time::Instant;

/// One cached query result.
#[derive(Debug)]
pub struct CacheEntry {
  pub events:      Vec<Event>,
  pub captured_at: Instant,
}

impl CacheEntry {
  pub fn age(&self) -> Duration { self.captured_at.elapsed() }
}

/// Where a key sits in its lifecycle.
#[derive(Debug, Clone)]
pub enum Lookup {
  /// Younger than the short TTL: serve as is.
  Fresh(Arc<CacheEntry>),
  /// Between the TTLs: serve, and refresh in the background.
  Stale(Arc<CacheEntry>),
  /// Older than the long TTL: must be refetched before serving.
  Expired,
  Empty,
}

#[derive(Debug, Default)]
pub struct CacheStats {
  pub hits:   AtomicU64,
  pub stale:  AtomicU64,
  pub misses: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatsSnapshot {
  pub hits:   u64,
  pub stale:  u64,
  pub misses: u64,
}

impl CacheStats {
  pub fn snapshot(&self) -> CacheStatsSnapshot {
    CacheStatsSnapshot {
      hits:   self.hits.load(Ordering::Relaxed),
      stale:  self.stale.load(Ordering::Relaxed),
      misses: self.misses.load(Ordering::Relaxed),
    }
  }
}

/// Feed results keyed by [`shelf_core::filter::Filter::cache_key`].
///
/// Entries are never evicted; the key space is the handful of distinct feed
/// queries a process issues.
#[derive(Debug)]
pub struct FeedCache {
  entries:   RwLock<HashMap<String, Arc<CacheEntry>>>,
  short_ttl: Duration,
  long_ttl:  Duration,
  stats:     CacheStats,
}

impl FeedCache {
  pub fn new(short_ttl: Duration, long_ttl: Duration) -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
      short_ttl,
      long_ttl,
      stats: CacheStats::default(),
    }
  }

  pub fn lookup(&self, key: &str) -> Lookup {
    let entry = self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned();

    let lookup = match entry {
      None => Lookup::Empty,
      Some(entry) => {
        let age = entry.age();
        if age < self.short_ttl {
          Lookup::Fresh(entry)
        } else if age < self.long_ttl {
          Lookup::Stale(entry)
        } else {
          Lookup::Expired
        }
      }
    };

    let counter = match lookup {
      Lookup::Fresh(_) => &self.stats.hits,
      Lookup::Stale(_) => &self.stats.stale,
      Lookup::Expired | Lookup::Empty => &self.stats.misses,
    };
    counter.fetch_add(1, Ordering::Relaxed);
    lookup
  }

  /// Replace the entry for `key` with `events`, captured now.
  pub fn store(&self, key: String, events: Vec<Event>) -> Arc<CacheEntry> {
    let entry = Arc::new(CacheEntry {
      events,
      captured_at: Instant::now(),
    });
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key, Arc::clone(&entry));
    entry
  }

  pub fn len(&self) -> usize {
    self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
  }

  pub fn is_empty(&self) -> bool { self.len() == 0 }

  pub fn stats(&self) -> CacheStatsSnapshot { self.stats.snapshot() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn cache() -> FeedCache {
    FeedCache::new(Duration::from_secs(60), Duration::from_secs(300))
  }

  #[tokio::test(start_paused = true)]
  async fn entry_ages_through_tiers() {
    let c = cache();
    assert!(matches!(c.lookup("k"), Lookup::Empty));

    c.store("k".into(), vec![]);
    assert!(matches!(c.lookup("k"), Lookup::Fresh(_)));

    tokio::time::advance(Duration::from_secs(59)).await;
    assert!(matches!(c.lookup("k"), Lookup::Fresh(_)));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(matches!(c.lookup("k"), Lookup::Stale(_)));

    tokio::time::advance(Duration::from_secs(239)).await;
    assert!(matches!(c.lookup("k"), Lookup::Stale(_)));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(matches!(c.lookup("k"), Lookup::Expired));

    assert_eq!(
      c.stats(),
      CacheStatsSnapshot {
        hits:   2,
        stale:  2,
        misses: 2,
      }
    );
  }

  #[tokio::test(start_paused = true)]
  async fn store_replaces_whole_entry() {
    let c = cache();
    let first = c.store("k".into(), vec![]);
    tokio::time::advance(Duration::from_secs(100)).await;
    c.store("k".into(), vec![]);

    let Lookup::Fresh(current) = c.lookup("k") else {
      panic!("expected fresh entry");
    };
    assert!(!Arc::ptr_eq(&first, &current));
    assert_eq!(first.age(), Duration::from_secs(100));
    assert_eq!(c.len(), 1);
  }
}
