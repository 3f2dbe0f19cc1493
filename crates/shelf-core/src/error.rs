//! Error types for `shelf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid isbn: {0:?}")]
  InvalidIsbn(String),

  #[error("rating must be between 1 and 5, got {0}")]
  InvalidRating(u8),

  #[error("rating fraction must be within (0, 1], got {0}")]
  InvalidRatingFraction(f64),

  #[error("{0} must not be empty")]
  EmptyContent(&'static str),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
