//! Finding the authoritative replaceable event for a user.

use shelf_core::{
  event::{Event, latest},
  filter::Filter,
  kind::ListKind,
  transport::Transport,
};

use crate::SyncContext;

/// The newest event of `list` authored by `user`, if any.
pub async fn fetch_latest<T: Transport>(
  ctx: &SyncContext<T>,
  user: &str,
  list: ListKind,
) -> Option<Event> {
  fetch_latest_kind(ctx, user, list.event_kind()).await
}

/// The newest event of `kind` authored by `user`, if any.
///
/// The query is bounded by `existing_state_limit` so a relay holding a long
/// history cannot return all of it. A transport failure is logged and
/// treated as "nothing published yet".
pub async fn fetch_latest_kind<T: Transport>(
  ctx: &SyncContext<T>,
  user: &str,
  kind: u16,
) -> Option<Event> {
  let filter = Filter::new()
    .kind(kind)
    .author(user)
    .limit(ctx.config().existing_state_limit);

  let events = ctx.query_or_empty(&filter).await;
  let found = latest(events.iter().filter(|e| filter.matches(e))).cloned();
  tracing::debug!(
    kind,
    candidates = events.len(),
    found = found.is_some(),
    "fetched existing replaceable state"
  );
  found
}
