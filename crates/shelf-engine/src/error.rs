//! Error type for `shelf-engine`.
//!
//! Only validation and write failures are represented here. Read failures
//! are absorbed into empty results where they happen and logged.

use shelf_core::book::{Book, Isbn};
use thiserror::Error;

/// A boxed transport error, so [`Error`] need not be generic over the
/// transport in use.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  /// Rejected before any network call.
  #[error("invalid argument: {0}")]
  InvalidArgument(String),

  #[error("core error: {0}")]
  Core(#[from] shelf_core::Error),

  /// The transport refused or failed to publish an event. The mutation must
  /// be assumed not to have happened.
  #[error("publish failed: {0}")]
  Publish(#[source] BoxError),
}

impl Error {
  pub fn publish(source: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Publish(Box::new(source))
  }

  /// Whether the caller supplied bad input, as opposed to the network
  /// failing.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::InvalidArgument(_) | Self::Core(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The book's ISBN; list and review mutations are rejected without one.
pub(crate) fn require_isbn(book: &Book) -> Result<&Isbn> {
  book
    .require_isbn()
    .map_err(|_| Error::InvalidArgument(format!("book {} has no isbn", book.id)))
}
