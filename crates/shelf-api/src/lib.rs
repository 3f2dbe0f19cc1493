//! JSON REST API for Shelf.
//!
//! Exposes an axum [`Router`] over one [`Shelf`], i.e. one user's view of
//! the relays. Auth, TLS and relay selection are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", shelf_api::api_router(shelf.clone()))
//! ```

pub mod error;
pub mod feed;
pub mod follows;
pub mod library;
pub mod lists;
pub mod reviews;

use std::{str::FromStr, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use shelf_core::{book::Isbn, kind::ListKind, metadata::MetadataSource, transport::Transport};
use shelf_engine::Shelf;

pub use error::ApiError;

/// Build the API router for `shelf`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<T, M>(shelf: Arc<Shelf<T, M>>) -> Router<()>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Router::new()
    // Feed
    .route("/feed", get(feed::list::<T, M>))
    .route("/feed/following", get(feed::following::<T, M>))
    .route("/reactions/{event_id}", post(feed::toggle_reaction::<T, M>))
    // Lists
    .route("/lists/{list}/books", post(lists::move_book::<T, M>))
    .route(
      "/lists/{list}/books/{isbn}",
      axum::routing::delete(lists::remove_book::<T, M>),
    )
    .route("/library/{pubkey}", get(library::get_one::<T, M>))
    // Follows
    .route("/follows", post(follows::follow::<T, M>))
    .route("/follows/{pubkey}", get(follows::list::<T, M>))
    // Reviews
    .route(
      "/books/{isbn}/reviews",
      get(reviews::list_reviews::<T, M>).post(reviews::create_review::<T, M>),
    )
    .route(
      "/books/{isbn}/ratings",
      get(reviews::list_ratings::<T, M>).post(reviews::create_rating::<T, M>),
    )
    .route(
      "/reviews/{event_id}/replies",
      get(reviews::list_replies::<T, M>).post(reviews::create_reply::<T, M>),
    )
    .with_state(shelf)
}

pub(crate) fn parse_list(raw: &str) -> Result<ListKind, ApiError> {
  ListKind::from_str(raw).map_err(|_| {
    ApiError::BadRequest(format!(
      "unknown list {raw:?}; expected tbr, reading or finished"
    ))
  })
}

pub(crate) fn parse_isbn(raw: &str) -> Result<Isbn, ApiError> { Ok(Isbn::new(raw)?) }
