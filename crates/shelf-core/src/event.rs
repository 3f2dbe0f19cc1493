//! Signed events as returned by relays, and unsigned drafts handed to the
//! transport for signing and publishing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  kind::ListKind,
  tag::{Tag, WireTag, decode_tags, encode_tags},
};

// ─── Event ───────────────────────────────────────────────────────────────────

/// A signed event. Events are immutable; a replaceable event is "updated"
/// by publishing a newer one of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
  pub id:         String,
  /// Hex public key of the author.
  pub pubkey:     String,
  pub kind:       u16,
  pub tags:       Vec<WireTag>,
  pub content:    String,
  #[serde(with = "chrono::serde::ts_seconds")]
  pub created_at: DateTime<Utc>,
}

impl Event {
  /// Tags decoded into their typed form.
  pub fn typed_tags(&self) -> Vec<Tag> { decode_tags(&self.tags) }

  /// Whether this event is newer than `other` under replaceable-event rules:
  /// greatest `created_at` wins, ties go to the lexically lowest id.
  pub fn supersedes(&self, other: &Event) -> bool {
    self
      .created_at
      .cmp(&other.created_at)
      .then_with(|| other.id.cmp(&self.id))
      .is_gt()
  }
}

/// The most recent event of `events` under replaceable-event rules.
pub fn latest<'a, I>(events: I) -> Option<&'a Event>
where
  I: IntoIterator<Item = &'a Event>,
{
  events.into_iter().fold(None, |best, e| match best {
    Some(b) if !e.supersedes(b) => Some(b),
    _ => Some(e),
  })
}

// ─── NewEvent ────────────────────────────────────────────────────────────────

/// An unsigned event. The transport assigns `id`, `pubkey` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
  pub kind:    u16,
  pub tags:    Vec<WireTag>,
  pub content: String,
}

impl NewEvent {
  pub fn new(kind: u16, tags: Vec<WireTag>, content: impl Into<String>) -> Self {
    Self {
      kind,
      tags,
      content: content.into(),
    }
  }

  /// A replacement for the list event of `list` carrying exactly `tags`.
  pub fn list(list: ListKind, tags: &[Tag]) -> Self {
    Self::new(list.event_kind(), encode_tags(tags), "")
  }

  pub fn with_content(mut self, content: impl Into<String>) -> Self {
    self.content = content.into();
    self
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn event(id: &str, secs: i64) -> Event {
    Event {
      id:         id.into(),
      pubkey:     "alice".into(),
      kind:       crate::kind::BOOK_TBR,
      tags:       vec![],
      content:    String::new(),
      created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn latest_picks_greatest_created_at() {
    let events = vec![event("b", 10), event("a", 30), event("c", 20)];
    assert_eq!(latest(&events).map(|e| e.id.as_str()), Some("a"));
  }

  #[test]
  fn latest_breaks_ties_by_lowest_id() {
    let events = vec![event("bb", 10), event("aa", 10), event("cc", 10)];
    assert_eq!(latest(&events).map(|e| e.id.as_str()), Some("aa"));
  }

  #[test]
  fn latest_of_nothing_is_none() {
    assert!(latest(&Vec::<Event>::new()).is_none());
  }

  #[test]
  fn created_at_serialises_as_unix_seconds() {
    let json = serde_json::to_value(event("a", 1_700_000_000)).unwrap();
    assert_eq!(json["created_at"], 1_700_000_000);
  }
}
