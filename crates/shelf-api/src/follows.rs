//! Handlers for the contacts list.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/follows` | Body: [`FollowBody`]; returns the [`FollowOutcome`] |
//! | `GET`  | `/follows/{pubkey}` | Pubkeys that user follows |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use shelf_core::{metadata::MetadataSource, transport::Transport};
use shelf_engine::{Shelf, follows::FollowOutcome};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct FollowBody {
  pub pubkey: String,
}

/// `POST /follows`
pub async fn follow<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Json(body): Json<FollowBody>,
) -> Result<Json<FollowOutcome>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Ok(Json(shelf.follow(&body.pubkey).await?))
}

/// `GET /follows/{pubkey}`
pub async fn list<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(pubkey): Path<String>,
) -> Json<Vec<String>>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Json(shelf.follows().of(&pubkey).await)
}
