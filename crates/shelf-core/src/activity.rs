//! Feed entries: a raw event classified into a social activity, with its
//! reaction overlay attached.

use serde::{Deserialize, Serialize};

use crate::{
  book::{Isbn, Rating},
  event::Event,
  kind::{BOOK_RATING, BOOK_REVIEW, ListKind, TEXT_NOTE},
  reaction::ReactionOverlay,
  tag::{first_value, membership_from_wire},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "list", rename_all = "snake_case")]
pub enum ActivityKind {
  /// A list event: the author put books on one of their lists.
  List(ListKind),
  Rating,
  Review,
  Post,
}

impl ActivityKind {
  pub fn of(event: &Event) -> Option<Self> {
    if let Some(list) = ListKind::from_event_kind(event.kind) {
      return Some(Self::List(list));
    }
    match event.kind {
      BOOK_RATING => Some(Self::Rating),
      BOOK_REVIEW => Some(Self::Review),
      TEXT_NOTE => Some(Self::Post),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
  pub activity:  ActivityKind,
  pub isbns:     Vec<Isbn>,
  pub rating:    Option<Rating>,
  pub reactions: ReactionOverlay,
  pub event:     Event,
}

impl FeedItem {
  /// Classify `event`; events of kinds the feed does not render yield
  /// `None`.
  pub fn from_event(event: Event, reactions: ReactionOverlay) -> Option<Self> {
    let activity = ActivityKind::of(&event)?;
    Some(Self {
      activity,
      isbns: membership_from_wire(&event.tags).into_iter().collect(),
      rating: first_value(&event.tags, "rating").and_then(Rating::from_tag_value),
      reactions,
      event,
    })
  }

  pub fn id(&self) -> &str { &self.event.id }
}
