//! Handlers for ratings, reviews and replies.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/books/{isbn}/reviews` | Newest first |
//! | `POST` | `/books/{isbn}/reviews` | Body: [`ReviewBody`]; returns 201 + event |
//! | `GET`  | `/books/{isbn}/ratings` | Latest rating per author |
//! | `POST` | `/books/{isbn}/ratings` | Body: [`RatingBody`]; returns 201 + event |
//! | `GET`  | `/reviews/{event_id}/replies` | Oldest first |
//! | `POST` | `/reviews/{event_id}/replies` | Body: [`ReplyBody`]; returns 201 + event |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use shelf_core::{
  book::Book,
  event::Event,
  metadata::MetadataSource,
  review::BookReview,
  transport::Transport,
};
use shelf_engine::Shelf;

use crate::{error::ApiError, parse_isbn};

type Created = (StatusCode, Json<Event>);

// ─── Reviews ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
  pub text:   String,
  /// Optional 1–5 star rating.
  pub rating: Option<u8>,
}

/// `GET /books/{isbn}/reviews`
pub async fn list_reviews<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(isbn): Path<String>,
) -> Result<Json<Vec<BookReview>>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let isbn = parse_isbn(&isbn)?;
  Ok(Json(shelf.reviews().fetch_reviews(&isbn).await))
}

/// `POST /books/{isbn}/reviews`
pub async fn create_review<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(isbn): Path<String>,
  Json(body): Json<ReviewBody>,
) -> Result<Created, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let book = Book::from_isbn(parse_isbn(&isbn)?);
  let event = shelf.reviews().review(&book, &body.text, body.rating).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Ratings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RatingBody {
  pub rating: u8,
}

/// `GET /books/{isbn}/ratings`
pub async fn list_ratings<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(isbn): Path<String>,
) -> Result<Json<Vec<BookReview>>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let isbn = parse_isbn(&isbn)?;
  Ok(Json(shelf.reviews().fetch_ratings(&isbn).await))
}

/// `POST /books/{isbn}/ratings`
pub async fn create_rating<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(isbn): Path<String>,
  Json(body): Json<RatingBody>,
) -> Result<Created, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let book = Book::from_isbn(parse_isbn(&isbn)?);
  let event = shelf.reviews().rate(&book, body.rating).await?;
  Ok((StatusCode::CREATED, Json(event)))
}

// ─── Replies ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ReplyBody {
  /// Author of the event being replied to.
  pub pubkey: String,
  pub text:   String,
}

/// `GET /reviews/{event_id}/replies`
pub async fn list_replies<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(event_id): Path<String>,
) -> Json<Vec<BookReview>>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  Json(shelf.reviews().fetch_replies(&event_id).await)
}

/// `POST /reviews/{event_id}/replies`
pub async fn create_reply<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(event_id): Path<String>,
  Json(body): Json<ReplyBody>,
) -> Result<Created, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let event = shelf
    .reviews()
    .reply(&event_id, &body.pubkey, &body.text)
    .await?;
  Ok((StatusCode::CREATED, Json(event)))
}
