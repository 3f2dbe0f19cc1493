//! The time-bounded feed query.

use std::{collections::HashSet, time::Duration};

use shelf_core::{event::Event, filter::Filter, transport::Transport};
use thiserror::Error;

use crate::{SyncContext, error::BoxError};

#[derive(Debug, Error)]
pub enum FetchError {
  #[error("feed query timed out after {0:?}")]
  Timeout(Duration),

  #[error("feed query failed: {0}")]
  Transport(#[source] BoxError),
}

/// Query the relays for `filter`, giving up after the configured timeout.
///
/// When the timeout fires the query future is dropped; anything it would
/// have returned is lost. The result is deduplicated by id, stripped of
/// events the filter does not match, sorted newest first and cut to the
/// filter's limit.
pub async fn fetch_fresh<T: Transport>(
  ctx: &SyncContext<T>,
  filter: &Filter,
) -> Result<Vec<Event>, FetchError> {
  let timeout = ctx.config().fetch_timeout();
  let events = tokio::time::timeout(timeout, ctx.transport().query(ctx.relays(), filter))
    .await
    .map_err(|_| FetchError::Timeout(timeout))?
    .map_err(|e| FetchError::Transport(Box::new(e)))?;
  Ok(normalise(events, filter))
}

/// [`fetch_fresh`], degrading any failure to an empty result.
pub async fn fetch_or_empty<T: Transport>(ctx: &SyncContext<T>, filter: &Filter) -> Vec<Event> {
  match fetch_fresh(ctx, filter).await {
    Ok(events) => {
      tracing::debug!(count = events.len(), "fetched feed events");
      events
    }
    Err(e @ FetchError::Timeout(_)) => {
      tracing::warn!(error = %e, "feed query timed out; returning nothing");
      Vec::new()
    }
    Err(e @ FetchError::Transport(_)) => {
      tracing::warn!(error = %e, "feed query failed; returning nothing");
      Vec::new()
    }
  }
}

fn normalise(events: Vec<Event>, filter: &Filter) -> Vec<Event> {
  let mut seen = HashSet::new();
  let mut events: Vec<Event> = events
    .into_iter()
    .filter(|e| filter.matches(e))
    .filter(|e| seen.insert(e.id.clone()))
    .collect();
  events.sort_by(|a, b| {
    b.created_at
      .cmp(&a.created_at)
      .then_with(|| a.id.cmp(&b.id))
  });
  if let Some(limit) = filter.limit {
    events.truncate(limit);
  }
  events
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};
  use shelf_core::kind::TEXT_NOTE;

  use super::*;

  fn event(id: &str, secs: i64) -> Event {
    Event {
      id:         id.into(),
      pubkey:     "alice".into(),
      kind:       TEXT_NOTE,
      tags:       vec![],
      content:    String::new(),
      created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn normalise_dedupes_sorts_and_limits() {
    let events = vec![
      event("b", 10),
      event("a", 30),
      event("b", 10),
      event("c", 20),
      event("d", 5),
    ];
    let filter = Filter::new().kind(TEXT_NOTE).limit(3);
    let ids: Vec<_> = normalise(events, &filter).into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
  }

  #[test]
  fn normalise_drops_unmatched_events() {
    let filter = Filter::new().kind(shelf_core::kind::REACTION);
    assert!(normalise(vec![event("a", 1)], &filter).is_empty());
  }
}
