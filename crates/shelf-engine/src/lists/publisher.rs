//! The parametric list upsert and its create fallback.

use shelf_core::{
  book::Isbn,
  event::{Event, NewEvent},
  kind::ListKind,
  merge::{MergeOutcome, Merged},
  tag::{Tag, encode_membership},
  transport::Transport,
};

use super::state::fetch_latest;
use crate::{Result, SyncContext};

/// Result of [`upsert`].
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
  /// The transformed tags were republished as `event`.
  Updated { event: Event, outcome: MergeOutcome },
  /// The transform was a no-op; nothing was published. Carries the current
  /// event.
  Unchanged(Event),
  /// There is no list event to update. The caller decides whether to
  /// create one.
  Missing,
}

impl Upsert {
  pub fn updated(&self) -> bool { matches!(self, Self::Updated { .. }) }
}

/// Apply `transform` to the tags of the current user's newest `list` event
/// and republish the result as a replacement.
///
/// The replacement keeps the prior event's content. Opaque tags survive as
/// long as `transform` keeps them, which [`shelf_core::merge::merge`] does.
pub async fn upsert<T, F>(ctx: &SyncContext<T>, list: ListKind, transform: F) -> Result<Upsert>
where
  T: Transport,
  F: FnOnce(&[Tag]) -> Merged,
{
  let Some(prior) = fetch_latest(ctx, ctx.user(), list).await else {
    return Ok(Upsert::Missing);
  };

  let merged = transform(&prior.typed_tags());
  if merged.is_noop() {
    tracing::debug!(%list, "list unchanged; not republishing");
    return Ok(Upsert::Unchanged(prior));
  }

  let draft = NewEvent::list(list, &merged.tags).with_content(prior.content.clone());
  let event = ctx.publish(draft).await?;
  tracing::info!(%list, id = %event.id, outcome = ?merged.outcome, "republished list");
  Ok(Upsert::Updated {
    event,
    outcome: merged.outcome,
  })
}

/// Publish the first event of `list`, holding exactly `isbn`.
pub async fn create<T: Transport>(
  ctx: &SyncContext<T>,
  list: ListKind,
  isbn: &Isbn,
) -> Result<Event> {
  let tags = [ctx.topic_tag(), encode_membership(isbn), Tag::Marker];
  let event = ctx.publish(NewEvent::list(list, &tags)).await?;
  tracing::info!(%list, %isbn, id = %event.id, "created list");
  Ok(event)
}
