//! The `MetadataSource` trait: bibliographic lookups by ISBN.

use std::{convert::Infallible, future::Future};

use crate::book::{BookMetadata, Isbn};

pub trait MetadataSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up one ISBN. `Ok(None)` means the source has no record of it.
  fn lookup<'a>(
    &'a self,
    isbn: &'a Isbn,
  ) -> impl Future<Output = Result<Option<BookMetadata>, Self::Error>> + Send + 'a;
}

/// A source that knows nothing; books stay unenriched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataSource for NoMetadata {
  type Error = Infallible;

  async fn lookup(&self, _isbn: &Isbn) -> Result<Option<BookMetadata>, Infallible> {
    Ok(None)
  }
}
