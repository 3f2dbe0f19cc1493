//! Ratings, reviews and review threads.

use std::collections::HashMap;

use shelf_core::{
  book::{Book, Isbn, Rating},
  event::Event,
  filter::Filter,
  kind::{BOOK_RATING, BOOK_REVIEW},
  review::{BookReview, rating_event, reply_event, review_event},
  tag::membership_value,
  transport::Transport,
};

use crate::{Error, Result, SyncContext, error::require_isbn};

pub struct Reviews<T> {
  ctx: SyncContext<T>,
}

impl<T: Transport> Reviews<T> {
  pub fn new(ctx: SyncContext<T>) -> Self { Self { ctx } }

  // ─── Writes ────────────────────────────────────────────────────────────────

  /// Rate `book` 1–5 stars.
  pub async fn rate(&self, book: &Book, stars: u8) -> Result<Event> {
    let isbn = require_isbn(book)?;
    let rating = Rating::from_stars(stars)?;
    let event = self
      .ctx
      .publish(rating_event(isbn, rating, self.ctx.topic_tag()))
      .await?;
    tracing::info!(%isbn, stars, id = %event.id, "published rating");
    Ok(event)
  }

  /// Review `book`, optionally with a star rating.
  pub async fn review(&self, book: &Book, text: &str, stars: Option<u8>) -> Result<Event> {
    let isbn = require_isbn(book)?;
    let rating = stars.map(Rating::from_stars).transpose()?;
    let draft = review_event(isbn, text, rating, self.ctx.topic_tag())?;
    let event = self.ctx.publish(draft).await?;
    tracing::info!(%isbn, id = %event.id, "published review");
    Ok(event)
  }

  /// Reply to the review (or reply) `event_id` written by `pubkey`.
  pub async fn reply(&self, event_id: &str, pubkey: &str, text: &str) -> Result<Event> {
    if event_id.trim().is_empty() {
      return Err(Error::InvalidArgument("reply target is empty".into()));
    }
    let draft = reply_event(event_id, pubkey, text)?;
    let event = self.ctx.publish(draft).await?;
    tracing::info!(parent = event_id, id = %event.id, "published reply");
    Ok(event)
  }

  // ─── Reads ─────────────────────────────────────────────────────────────────

  /// Reviews of `isbn`, newest first.
  pub async fn fetch_reviews(&self, isbn: &Isbn) -> Vec<BookReview> {
    let filter = Filter::new().kind(BOOK_REVIEW).tag('i', membership_value(isbn));
    let mut reviews = self.read(&filter).await;
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reviews
  }

  /// Ratings of `isbn`, one per author (their latest), newest first.
  pub async fn fetch_ratings(&self, isbn: &Isbn) -> Vec<BookReview> {
    let filter = Filter::new().kind(BOOK_RATING).tag('i', membership_value(isbn));
    let mut newest: HashMap<String, BookReview> = HashMap::new();
    for rating in self.read(&filter).await {
      let newer = newest.get(&rating.pubkey).is_none_or(|prev| {
        rating
          .created_at
          .cmp(&prev.created_at)
          .then_with(|| prev.id.cmp(&rating.id))
          .is_gt()
      });
      if newer {
        newest.insert(rating.pubkey.clone(), rating);
      }
    }
    let mut ratings: Vec<BookReview> = newest.into_values().collect();
    ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    ratings
  }

  /// Replies to `event_id`, oldest first.
  pub async fn fetch_replies(&self, event_id: &str) -> Vec<BookReview> {
    let filter = Filter::new().kind(BOOK_REVIEW).tag('e', event_id);
    let mut replies = self.read(&filter).await;
    replies.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    replies
  }

  async fn read(&self, filter: &Filter) -> Vec<BookReview> {
    self
      .ctx
      .query_or_empty(filter)
      .await
      .iter()
      .filter(|e| filter.matches(e))
      .filter_map(BookReview::from_event)
      .collect()
  }
}
