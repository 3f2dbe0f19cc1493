//! Protocol event kinds and the three reading lists.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

// ─── Event kinds ─────────────────────────────────────────────────────────────

/// Replaceable list: books the user wants to read.
pub const BOOK_TBR: u16 = 10073;
/// Replaceable list: books the user is currently reading.
pub const BOOK_READING: u16 = 10074;
/// Replaceable list: books the user has finished.
pub const BOOK_FINISHED: u16 = 10075;
/// A standalone 1–5 star rating of one book.
pub const BOOK_RATING: u16 = 31985;
/// A free-text review (and replies to reviews).
pub const BOOK_REVIEW: u16 = 31986;
/// A generic short text note.
pub const TEXT_NOTE: u16 = 1;
/// Replaceable follow list: one `p` tag per followed user.
pub const CONTACTS: u16 = 3;
/// A like/unlike reaction to another event.
pub const REACTION: u16 = 7;

/// Topic tag value attached to everything this application publishes.
pub const TOPIC: &str = "bookstr";

/// Every kind that can appear in the social feed.
pub const FEED_KINDS: [u16; 6] = [
  BOOK_TBR,
  BOOK_READING,
  BOOK_FINISHED,
  BOOK_RATING,
  BOOK_REVIEW,
  TEXT_NOTE,
];

// ─── ListKind ────────────────────────────────────────────────────────────────

/// One of the three mutually exclusive reading lists.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListKind {
  Tbr,
  Reading,
  Finished,
}

impl ListKind {
  /// The replaceable event kind that stores this list.
  pub fn event_kind(self) -> u16 {
    match self {
      Self::Tbr => BOOK_TBR,
      Self::Reading => BOOK_READING,
      Self::Finished => BOOK_FINISHED,
    }
  }

  pub fn from_event_kind(kind: u16) -> Option<Self> {
    match kind {
      BOOK_TBR => Some(Self::Tbr),
      BOOK_READING => Some(Self::Reading),
      BOOK_FINISHED => Some(Self::Finished),
      _ => None,
    }
  }

  /// The two lists a book must leave when it moves onto `self`.
  pub fn others(self) -> impl Iterator<Item = ListKind> {
    Self::iter().filter(move |k| *k != self)
  }
}
