//! Ratings, reviews and replies: building the events and reading them back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  book::{Isbn, Rating},
  event::{Event, NewEvent},
  kind::{BOOK_RATING, BOOK_REVIEW},
  tag::{Tag, encode_membership, encode_tags, first_value, membership_from_wire},
};

/// A rating, review or reply read from the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookReview {
  pub id:         String,
  pub pubkey:     String,
  pub isbn:       Option<Isbn>,
  pub content:    String,
  pub rating:     Option<Rating>,
  /// For replies: the event being replied to.
  pub reply_to:   Option<String>,
  pub created_at: DateTime<Utc>,
}

impl BookReview {
  /// Read a rating or review event. Returns `None` for any other kind.
  pub fn from_event(event: &Event) -> Option<Self> {
    if event.kind != BOOK_RATING && event.kind != BOOK_REVIEW {
      return None;
    }
    Some(Self {
      id:         event.id.clone(),
      pubkey:     event.pubkey.clone(),
      isbn:       membership_from_wire(&event.tags).into_iter().next(),
      content:    event.content.clone(),
      rating:     first_value(&event.tags, "rating").and_then(Rating::from_tag_value),
      reply_to:   first_value(&event.tags, "e").map(str::to_string),
      created_at: event.created_at,
    })
  }
}

fn rating_tag(rating: Rating) -> Tag {
  Tag::opaque(["rating".to_string(), rating.stars().to_string()])
}

/// A standalone rating of one book. `topic` is the `t` tag that puts the
/// rating in the feed.
pub fn rating_event(isbn: &Isbn, rating: Rating, topic: Tag) -> NewEvent {
  let tags = [encode_membership(isbn), rating_tag(rating), Tag::Marker, topic];
  NewEvent::new(BOOK_RATING, encode_tags(&tags), "")
}

/// A review of one book, optionally carrying a rating.
pub fn review_event(
  isbn: &Isbn,
  text: &str,
  rating: Option<Rating>,
  topic: Tag,
) -> Result<NewEvent> {
  let text = text.trim();
  if text.is_empty() {
    return Err(Error::EmptyContent("review text"));
  }
  let mut tags = vec![encode_membership(isbn), Tag::Marker, topic];
  tags.extend(rating.map(rating_tag));
  Ok(NewEvent::new(BOOK_REVIEW, encode_tags(&tags), text))
}

/// A reply in a review thread.
pub fn reply_event(event_id: &str, pubkey: &str, text: &str) -> Result<NewEvent> {
  let text = text.trim();
  if text.is_empty() {
    return Err(Error::EmptyContent("reply text"));
  }
  let tags = vec![
    vec![
      "e".to_string(),
      event_id.to_string(),
      String::new(),
      "reply".to_string(),
    ],
    vec!["p".to_string(), pubkey.to_string()],
  ];
  Ok(NewEvent::new(BOOK_REVIEW, tags, text))
}
