//! [`SyncContext`]: the explicitly passed handle on everything the engine
//! shares across operations.

use std::sync::Arc;

use shelf_core::{
  event::{Event, NewEvent},
  filter::Filter,
  tag::Tag,
  transport::Transport,
};

use crate::{EngineConfig, Error, Result};

/// Transport, relay set, current user and configuration.
///
/// Cloning shares the transport; every component of the engine holds its
/// own clone and tests substitute a fake transport here.
pub struct SyncContext<T> {
  transport: Arc<T>,
  relays:    Arc<[String]>,
  user:      Arc<str>,
  config:    Arc<EngineConfig>,
}

// Manual impl: `T` itself need not be `Clone`.
impl<T> Clone for SyncContext<T> {
  fn clone(&self) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      relays:    Arc::clone(&self.relays),
      user:      Arc::clone(&self.user),
      config:    Arc::clone(&self.config),
    }
  }
}

impl<T: Transport> SyncContext<T> {
  pub fn new(
    transport: T,
    relays: Vec<String>,
    user: impl Into<String>,
    config: EngineConfig,
  ) -> Self {
    let user: String = user.into();
    Self {
      transport: Arc::new(transport),
      relays:    relays.into(),
      user:      Arc::from(user),
      config:    Arc::new(config),
    }
  }

  pub fn transport(&self) -> &T { &self.transport }

  pub fn relays(&self) -> &[String] { &self.relays }

  /// Public key of the user this engine mutates lists for.
  pub fn user(&self) -> &str { &self.user }

  pub fn config(&self) -> &EngineConfig { &self.config }

  /// The `t` tag carried by every event the feed should show.
  pub fn topic_tag(&self) -> Tag { Tag::opaque(["t", self.config.feed_topic.as_str()]) }

  /// Query the relays, treating a transport failure as "nothing found".
  pub async fn query_or_empty(&self, filter: &Filter) -> Vec<Event> {
    match self.transport.query(&self.relays, filter).await {
      Ok(events) => events,
      Err(e) => {
        tracing::warn!(kinds = ?filter.kinds, error = %e, "relay query failed; treating as empty");
        Vec::new()
      }
    }
  }

  /// Publish `event`; failures are write failures and are returned.
  pub async fn publish(&self, event: NewEvent) -> Result<Event> {
    let kind = event.kind;
    self
      .transport
      .publish(&self.relays, event)
      .await
      .map_err(|e| {
        tracing::warn!(kind, error = %e, "publish failed");
        Error::publish(e)
      })
  }
}
