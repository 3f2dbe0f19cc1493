//! The `Transport` trait: the boundary to the relay network.
//!
//! Implemented by relay clients and local stores (e.g. `shelf-store-sqlite`).
//! Higher layers (`shelf-engine`, `shelf-api`) depend on this abstraction.
//! Connection pooling, socket retries and signing live behind it.

use std::future::Future;

use crate::{
  event::{Event, NewEvent},
  filter::Filter,
};

/// Abstraction over a pub/sub relay client.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes and from spawned tasks.
pub trait Transport: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Query `relays` for events matching `filter`. Results may contain
  /// duplicates when several relays hold the same event.
  fn query<'a>(
    &'a self,
    relays: &'a [String],
    filter: &'a Filter,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + 'a;

  /// Sign `event` as the current user and publish it to `relays`. Returns
  /// the signed event as accepted.
  fn publish<'a>(
    &'a self,
    relays: &'a [String],
    event: NewEvent,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + 'a;
}
