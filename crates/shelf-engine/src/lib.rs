//! The Shelf sync engine.
//!
//! Everything here talks to the network through a [`SyncContext`], which
//! wraps a [`shelf_core::transport::Transport`] together with the relay set,
//! the current user and an [`EngineConfig`]. The pieces:
//!
//! - [`lists`]: reading-list mutations with cross-list exclusivity
//! - [`feed`]: the cached global and following feeds
//! - [`reactions`]: optimistic like toggles
//! - [`library`]: a user's lists expanded into enriched books
//! - [`reviews`]: ratings, reviews and replies
//! - [`follows`]: the user's contacts list, which drives the following feed
//!
//! [`Shelf`] bundles them for one user.

pub mod config;
pub mod context;
pub mod error;
pub mod feed;
pub mod follows;
pub mod library;
pub mod lists;
pub mod reactions;
pub mod reviews;
pub mod shelf;

#[cfg(test)]
mod testing;

pub use config::EngineConfig;
pub use context::SyncContext;
pub use error::{Error, Result};
pub use shelf::{FeedItems, Shelf};
