//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Engine(#[from] shelf_engine::Error),
}

impl From<shelf_core::Error> for ApiError {
  fn from(e: shelf_core::Error) -> Self { Self::BadRequest(e.to_string()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Engine(e) if e.is_validation() => StatusCode::BAD_REQUEST,
      // The relays refused the write.
      ApiError::Engine(e) => {
        tracing::warn!(error = %e, "upstream write failed");
        StatusCode::BAD_GATEWAY
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
