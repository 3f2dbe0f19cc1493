//! `GET /library/{pubkey}`: a user's books, enriched.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use shelf_core::{book::Book, metadata::MetadataSource, transport::Transport};
use shelf_engine::Shelf;

pub async fn get_one<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(pubkey): Path<String>,
) -> Json<Vec<Book>>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Json(shelf.library().load(&pubkey).await)
}
