//! Shelf server: wires the SQLite relay, the OpenLibrary metadata client and
//! the sync engine behind the JSON API.

pub mod config;
pub mod openlibrary;

use std::sync::Arc;

use axum::Router;
use shelf_core::{metadata::MetadataSource, transport::Transport};
use shelf_engine::Shelf;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use openlibrary::OpenLibrary;

/// The full application: the API under `/api`, with request tracing.
pub fn app<T, M>(shelf: Arc<Shelf<T, M>>) -> Router
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Router::new()
    .nest("/api", shelf_api::api_router(shelf))
    .layer(TraceLayer::new_for_http())
}
