//! [`Follows`]: the current user's contacts list and reads of anyone's.

use serde::Serialize;
use shelf_core::{
  contacts::{follows, with_follow},
  event::{Event, NewEvent},
  kind::CONTACTS,
  transport::Transport,
};

use crate::{Error, Result, SyncContext, lists::fetch_latest_kind};

/// Result of [`Follows::follow`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "event", rename_all = "snake_case")]
pub enum FollowOutcome {
  /// A new contacts event was published.
  Followed(Event),
  /// The pubkey was already on the list; nothing was published.
  AlreadyFollowing,
}

/// Pubkeys `pubkey` follows, from their newest contacts event.
pub async fn fetch_follows<T: Transport>(ctx: &SyncContext<T>, pubkey: &str) -> Vec<String> {
  fetch_latest_kind(ctx, pubkey, CONTACTS)
    .await
    .map(|event| follows(&event.tags))
    .unwrap_or_default()
}

pub struct Follows<T> {
  ctx: SyncContext<T>,
}

impl<T: Transport> Follows<T> {
  pub fn new(ctx: SyncContext<T>) -> Self { Self { ctx } }

  pub async fn of(&self, pubkey: &str) -> Vec<String> { fetch_follows(&self.ctx, pubkey).await }

  /// Add `pubkey` to the current user's contacts list.
  ///
  /// The newest contacts event is republished with one more `p` tag; its
  /// other tags and its content are kept.
  pub async fn follow(&self, pubkey: &str) -> Result<FollowOutcome> {
    let pubkey = pubkey.trim();
    if pubkey.is_empty() {
      return Err(Error::InvalidArgument("pubkey to follow is empty".into()));
    }

    let current = fetch_latest_kind(&self.ctx, self.ctx.user(), CONTACTS).await;
    let (tags, content) = match &current {
      Some(event) => (event.tags.as_slice(), event.content.clone()),
      None => (&[][..], String::new()),
    };
    let Some(tags) = with_follow(tags, pubkey) else {
      tracing::debug!(pubkey, "already following");
      return Ok(FollowOutcome::AlreadyFollowing);
    };

    let count = tags.len();
    let event = self.ctx.publish(NewEvent::new(CONTACTS, tags, content)).await?;
    tracing::info!(pubkey, tags = count, "follow published");
    Ok(FollowOutcome::Followed(event))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{MemoryTransport, USER};

  fn contacts(follows: &[&str]) -> NewEvent {
    let tags = follows.iter().map(|p| vec!["p".to_string(), p.to_string()]).collect();
    NewEvent::new(CONTACTS, tags, "{\"wss://relay.test\":{}}")
  }

  #[tokio::test]
  async fn first_follow_creates_the_list() {
    let t = MemoryTransport::new();
    let follows = Follows::new(t.context());

    let outcome = follows.follow(" bob ").await.unwrap();
    let FollowOutcome::Followed(event) = outcome else {
      panic!("expected a publish, got {outcome:?}");
    };
    assert_eq!(event.kind, CONTACTS);
    assert_eq!(event.tags, vec![vec!["p".to_string(), "bob".to_string()]]);
    assert_eq!(follows.of(USER).await, vec!["bob"]);
  }

  #[tokio::test]
  async fn follow_extends_newest_list_and_keeps_content() {
    let t = MemoryTransport::new();
    t.seed(USER, contacts(&["dave"]));
    t.seed(USER, contacts(&["bob"]));
    let follows = Follows::new(t.context());

    follows.follow("carol").await.unwrap();
    assert_eq!(follows.of(USER).await, vec!["bob", "carol"]);
    let newest = t.events_of_kind(CONTACTS).pop().unwrap();
    assert_eq!(newest.content, "{\"wss://relay.test\":{}}");
  }

  #[tokio::test]
  async fn repeat_follow_publishes_nothing() {
    let t = MemoryTransport::new();
    t.seed(USER, contacts(&["bob"]));
    let follows = Follows::new(t.context());

    assert_eq!(follows.follow("bob").await.unwrap(), FollowOutcome::AlreadyFollowing);
    assert_eq!(t.publishes(), 0);
  }

  #[tokio::test]
  async fn empty_pubkey_is_rejected_before_any_call() {
    let t = MemoryTransport::new();
    let err = Follows::new(t.context()).follow("   ").await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(t.queries(), 0);
  }

  #[tokio::test]
  async fn publish_failure_is_returned() {
    let t = MemoryTransport::new();
    t.fail_publishes(true);
    let err = Follows::new(t.context()).follow("bob").await.unwrap_err();
    assert!(matches!(err, Error::Publish(_)));
  }

  #[tokio::test]
  async fn other_users_lists_are_readable() {
    let t = MemoryTransport::new();
    t.seed("bob", contacts(&["alice", "erin"]));
    assert_eq!(fetch_follows(&t.context(), "bob").await, vec!["alice", "erin"]);
    assert!(fetch_follows(&t.context(), "nobody").await.is_empty());
  }
}
