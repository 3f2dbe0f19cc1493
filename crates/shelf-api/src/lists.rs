//! Handlers for `/lists` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST`   | `/lists/{list}/books` | Body: [`MoveBody`]; moves the book onto `list` |
//! | `DELETE` | `/lists/{list}/books/{isbn}` | Removes the book from `list` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use shelf_core::{
  book::{Book, Isbn},
  kind::ListKind,
  metadata::MetadataSource,
  transport::Transport,
};
use shelf_engine::{
  Shelf,
  lists::{MoveOutcome, RemoveOutcome},
};

use crate::{error::ApiError, parse_isbn, parse_list};

/// JSON body accepted by `POST /lists/{list}/books`.
#[derive(Debug, Deserialize)]
pub struct MoveBody {
  pub isbn:    Isbn,
  /// The list the client currently shows the book on, if any.
  pub current: Option<ListKind>,
}

/// `POST /lists/{list}/books`
pub async fn move_book<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path(list): Path<String>,
  Json(body): Json<MoveBody>,
) -> Result<Json<MoveOutcome>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let target = parse_list(&list)?;
  let outcome = shelf.move_book(body.isbn, target, body.current).await?;
  Ok(Json(outcome))
}

/// `DELETE /lists/{list}/books/{isbn}`
pub async fn remove_book<T, M>(
  State(shelf): State<Arc<Shelf<T, M>>>,
  Path((list, isbn)): Path<(String, String)>,
) -> Result<Json<RemoveOutcome>, ApiError>
where
  T: Transport + 'static,
  M: MetadataSource + 'static,
{
  let list = parse_list(&list)?;
  let book = Book::from_isbn(parse_isbn(&isbn)?);
  let outcome = shelf.lists().remove(&book, list).await?;
  Ok(Json(outcome))
}
