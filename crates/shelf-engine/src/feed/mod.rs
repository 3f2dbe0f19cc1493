//! The social feed: a cached, time-bounded query over the relays.
//!
//! ```text
//! read ─┬─ paginated ───────────────────────────────► fetch (no cache)
//!       └─ lookup ─┬─ Fresh ────────────────────────► cached batch
//!                  ├─ Stale ──► spawn refresh ──────► cached batch
//!                  └─ Expired / Empty ─► fetch, store ► fresh batch
//! ```

mod cache;
mod fetcher;

use std::sync::Arc;

pub use cache::{CacheEntry, CacheStatsSnapshot, FeedCache, Lookup};
pub use fetcher::{FetchError, fetch_fresh, fetch_or_empty};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shelf_core::{event::Event, filter::Filter, kind::FEED_KINDS, transport::Transport};
use tokio::task::JoinHandle;

use crate::{SyncContext, follows::fetch_follows};

/// Where a [`FeedPage`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
  /// A cache entry younger than the short TTL.
  Fresh,
  /// A cache entry between the TTLs; a refresh was scheduled.
  Stale,
  /// Fetched from the relays and stored in the cache.
  Fetched,
  /// A paginated read: fetched from the relays, cache untouched.
  Paginated,
  /// Nothing to query, e.g. a following feed for a user who follows no one.
  Skipped,
}

#[derive(Debug)]
pub struct FeedPage {
  pub events:  Vec<Event>,
  pub source:  FeedSource,
  /// The background refresh scheduled by a stale read. Dropping the handle
  /// does not cancel the refresh.
  pub refresh: Option<JoinHandle<()>>,
}

/// Cached feed reads for one [`SyncContext`].
pub struct Feed<T> {
  ctx:   SyncContext<T>,
  cache: Arc<FeedCache>,
}

impl<T> Clone for Feed<T> {
  fn clone(&self) -> Self {
    Self {
      ctx:   self.ctx.clone(),
      cache: Arc::clone(&self.cache),
    }
  }
}

impl<T: Transport + 'static> Feed<T> {
  pub fn new(ctx: SyncContext<T>) -> Self {
    let cache = FeedCache::new(ctx.config().short_ttl(), ctx.config().long_ttl());
    Self::with_cache(ctx, Arc::new(cache))
  }

  /// A feed sharing an existing cache store.
  pub fn with_cache(ctx: SyncContext<T>, cache: Arc<FeedCache>) -> Self { Self { ctx, cache } }

  pub fn cache(&self) -> &FeedCache { &self.cache }

  /// The global feed query: every app event kind carrying the topic tag.
  /// Asks for `limit * feed_overfetch` events, since callers drop entries
  /// they cannot render.
  pub fn global_filter(&self, limit: usize, until: Option<DateTime<Utc>>) -> Filter {
    let config = self.ctx.config();
    Filter::new()
      .kinds(FEED_KINDS)
      .tag('t', config.feed_topic.clone())
      .limit(limit.saturating_mul(config.feed_overfetch.max(1)))
      .until(until)
  }

  pub async fn global(&self, limit: usize, until: Option<DateTime<Utc>>) -> FeedPage {
    self.query(self.global_filter(limit, until)).await
  }

  /// The global query restricted to events by `authors`.
  pub fn following_filter<I, S>(
    &self,
    authors: I,
    limit: usize,
    until: Option<DateTime<Utc>>,
  ) -> Filter
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.global_filter(limit, until).authors(authors)
  }

  /// Feed events by the users the current user follows. Without a follow
  /// list there is nothing to ask the relays for.
  pub async fn following(&self, limit: usize, until: Option<DateTime<Utc>>) -> FeedPage {
    let authors = fetch_follows(&self.ctx, self.ctx.user()).await;
    if authors.is_empty() {
      tracing::debug!("no follows; following feed is empty");
      return FeedPage {
        events:  Vec::new(),
        source:  FeedSource::Skipped,
        refresh: None,
      };
    }
    self.query(self.following_filter(authors, limit, until)).await
  }

  /// Read `filter` through the cache. Never fails: fetch failures yield an
  /// empty batch.
  pub async fn query(&self, filter: Filter) -> FeedPage {
    if filter.is_paginated() {
      return FeedPage {
        events:  fetch_or_empty(&self.ctx, &filter).await,
        source:  FeedSource::Paginated,
        refresh: None,
      };
    }

    let key = filter.cache_key();
    match self.cache.lookup(&key) {
      Lookup::Fresh(entry) => {
        tracing::debug!(count = entry.events.len(), "serving fresh cached feed");
        FeedPage {
          events:  entry.events.clone(),
          source:  FeedSource::Fresh,
          refresh: None,
        }
      }
      Lookup::Stale(entry) => {
        tracing::debug!(age = ?entry.age(), "serving stale cached feed; refreshing");
        FeedPage {
          events:  entry.events.clone(),
          source:  FeedSource::Stale,
          refresh: Some(self.spawn_refresh(key, filter)),
        }
      }
      Lookup::Expired | Lookup::Empty => {
        let events = fetch_or_empty(&self.ctx, &filter).await;
        self.cache.store(key, events.clone());
        FeedPage {
          events,
          source: FeedSource::Fetched,
          refresh: None,
        }
      }
    }
  }

  /// Refetch `filter` in the background. Success replaces the entry; a
  /// failure leaves the stale entry in place.
  fn spawn_refresh(&self, key: String, filter: Filter) -> JoinHandle<()> {
    let ctx = self.ctx.clone();
    let cache = Arc::clone(&self.cache);
    tokio::spawn(async move {
      match fetch_fresh(&ctx, &filter).await {
        Ok(events) => {
          tracing::debug!(count = events.len(), "background feed refresh stored");
          cache.store(key, events);
        }
        Err(e) => {
          tracing::warn!(error = %e, "background feed refresh failed; keeping stale entry");
        }
      }
    })
  }
}
