//! Core types and pure algorithms for the Shelf reading tracker.
//!
//! Reading lists, ratings, reviews and the social feed all live as events on
//! a relay network. This crate holds the domain model for those events, the
//! tag codec and list merger that operate on them, and the traits through
//! which higher layers reach the network (`Transport`) and book metadata
//! (`MetadataSource`). It performs no I/O and depends on no async runtime.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod book;
pub mod contacts;
pub mod error;
pub mod event;
pub mod filter;
pub mod kind;
pub mod merge;
pub mod metadata;
pub mod reaction;
pub mod review;
pub mod tag;
pub mod transport;

pub use error::{Error, Result};
