//! SQLite-backed local relay for Shelf.
//!
//! [`SqliteRelay`] implements [`shelf_core::transport::Transport`] over a
//! single SQLite file, standing in for a relay network on one machine. It
//! wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteRelay;

#[cfg(test)]
mod tests;
