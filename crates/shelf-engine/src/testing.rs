//! In-memory fake transport for engine tests.

use std::sync::{
  Arc, Mutex, PoisonError,
  atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
};

use chrono::{DateTime, Utc};
use shelf_core::{
  event::{Event, NewEvent},
  filter::Filter,
  transport::Transport,
};
use thiserror::Error;

use crate::{EngineConfig, SyncContext};

pub const USER: &str = "alice";

#[derive(Debug, Error)]
#[error("memory transport: {0}")]
pub struct MemoryError(&'static str);

#[derive(Default)]
struct Shared {
  events:       Mutex<Vec<Event>>,
  filters:      Mutex<Vec<Filter>>,
  queries:      AtomicUsize,
  publishes:    AtomicUsize,
  fail_query:   AtomicBool,
  hang_query:   AtomicBool,
  fail_publish: AtomicBool,
  hang_publish: AtomicBool,
  /// Fail only publishes of this kind, when non-zero.
  fail_kind:    AtomicUsize,
  clock:        AtomicI64,
}

/// A relay held in a `Vec`. Clones share state, so a test keeps one clone
/// to inspect and steer while the engine owns another.
#[derive(Clone, Default)]
pub struct MemoryTransport {
  shared: Arc<Shared>,
}

impl MemoryTransport {
  pub fn new() -> Self {
    let t = Self::default();
    t.shared.clock.store(1_700_000_000, Ordering::SeqCst);
    t
  }

  pub fn context(&self) -> SyncContext<Self> { self.context_with(EngineConfig::default()) }

  pub fn context_with(&self, config: EngineConfig) -> SyncContext<Self> {
    SyncContext::new(self.clone(), vec!["wss://relay.test".into()], USER, config)
  }

  fn tick(&self) -> DateTime<Utc> {
    let secs = self.shared.clock.fetch_add(1, Ordering::SeqCst);
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
  }

  /// Store an event as if `pubkey` had published it.
  pub fn seed(&self, pubkey: &str, draft: NewEvent) -> Event {
    let n = self.events().len();
    let event = Event {
      id:         format!("{n:064x}"),
      pubkey:     pubkey.to_string(),
      kind:       draft.kind,
      tags:       draft.tags,
      content:    draft.content,
      created_at: self.tick(),
    };
    self.lock().push(event.clone());
    event
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
    self.shared.events.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn events(&self) -> Vec<Event> { self.lock().clone() }

  pub fn events_of_kind(&self, kind: u16) -> Vec<Event> {
    self.events().into_iter().filter(|e| e.kind == kind).collect()
  }

  /// The filter of the most recent query.
  pub fn last_filter(&self) -> Option<Filter> {
    let filters = self.shared.filters.lock().unwrap_or_else(PoisonError::into_inner);
    filters.last().cloned()
  }

  pub fn queries(&self) -> usize { self.shared.queries.load(Ordering::SeqCst) }

  pub fn publishes(&self) -> usize { self.shared.publishes.load(Ordering::SeqCst) }

  pub fn fail_queries(&self, on: bool) { self.shared.fail_query.store(on, Ordering::SeqCst); }

  /// Queries never resolve.
  pub fn hang_queries(&self, on: bool) { self.shared.hang_query.store(on, Ordering::SeqCst); }

  pub fn fail_publishes(&self, on: bool) {
    self.shared.fail_publish.store(on, Ordering::SeqCst);
  }

  /// Publishes never resolve.
  pub fn hang_publishes(&self, on: bool) {
    self.shared.hang_publish.store(on, Ordering::SeqCst);
  }

  pub fn fail_publishes_of_kind(&self, kind: u16) {
    self.shared.fail_kind.store(usize::from(kind), Ordering::SeqCst);
  }
}

impl Transport for MemoryTransport {
  type Error = MemoryError;

  async fn query(&self, _relays: &[String], filter: &Filter) -> Result<Vec<Event>, MemoryError> {
    self.shared.queries.fetch_add(1, Ordering::SeqCst);
    self
      .shared
      .filters
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(filter.clone());
    if self.shared.hang_query.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    if self.shared.fail_query.load(Ordering::SeqCst) {
      return Err(MemoryError("query refused"));
    }
    let mut found: Vec<Event> =
      self.lock().iter().filter(|e| filter.matches(e)).cloned().collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    if let Some(limit) = filter.limit {
      found.truncate(limit);
    }
    Ok(found)
  }

  async fn publish(&self, _relays: &[String], event: NewEvent) -> Result<Event, MemoryError> {
    self.shared.publishes.fetch_add(1, Ordering::SeqCst);
    if self.shared.hang_publish.load(Ordering::SeqCst) {
      std::future::pending::<()>().await;
    }
    let fail_kind = self.shared.fail_kind.load(Ordering::SeqCst);
    if self.shared.fail_publish.load(Ordering::SeqCst) || fail_kind == usize::from(event.kind) {
      return Err(MemoryError("publish refused"));
    }
    Ok(self.seed(USER, event))
  }
}
