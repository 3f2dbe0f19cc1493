//! Handlers for the feed and reactions.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/feed` | `?limit` (default 20), `?until` (unix seconds) pages backwards |
//! | `GET`  | `/feed/following` | Same parameters; only users the current user follows |
//! | `POST` | `/reactions/{event_id}` | Toggles the user's like |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use shelf_core::{metadata::MetadataSource, transport::Transport};
use shelf_engine::{FeedItems, Shelf, reactions::ToggleOutcome};

use crate::error::ApiError;

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct FeedParams {
  pub limit: Option<usize>,
  /// Only events at or before this unix time.
  pub until: Option<i64>,
}

impl FeedParams {
  fn bounds(&self) -> Result<(usize, Option<DateTime<Utc>>), ApiError> {
    let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let until = self
      .until
      .map(|secs| {
        DateTime::from_timestamp(secs, 0)
          .ok_or_else(|| ApiError::BadRequest(format!("until out of range: {secs}")))
      })
      .transpose()?;
    Ok((limit, until))
  }
}

/// `GET /feed[?limit=..][&until=..]`
pub async fn list<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Query(params): Query<FeedParams>,
) -> Result<Json<FeedItems>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let (limit, until) = params.bounds()?;
  Ok(Json(shelf.feed_items(limit, until).await))
}

/// `GET /feed/following[?limit=..][&until=..]`
pub async fn following<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Query(params): Query<FeedParams>,
) -> Result<Json<FeedItems>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let (limit, until) = params.bounds()?;
  Ok(Json(shelf.following_items(limit, until).await))
}

/// `POST /reactions/{event_id}`
///
/// 200 when the reaction was published, 409 while another toggle of the same
/// entry is in flight, 502 when publishing failed. The body is always the
/// [`ToggleOutcome`].
pub async fn toggle_reaction<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(event_id): Path<String>,
) -> (StatusCode, Json<ToggleOutcome>)
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let outcome = shelf.reactions().toggle(&event_id).await;
  let status = match outcome {
    ToggleOutcome::Confirmed(_) => StatusCode::OK,
    ToggleOutcome::InFlight(_) => StatusCode::CONFLICT,
    ToggleOutcome::RolledBack(_) => StatusCode::BAD_GATEWAY,
  };
  (status, Json(outcome))
}
