//! Encoding and decoding helpers between Shelf events and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as unix seconds. Tags are stored as compact JSON.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use shelf_core::{event::Event, tag::WireTag};

use crate::{Error, Result};

// ─── Timestamps ──────────────────────────────────────────────────────────────

pub fn encode_ts(dt: DateTime<Utc>) -> i64 { dt.timestamp() }

pub fn decode_ts(secs: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp(secs, 0).ok_or(Error::Timestamp(secs))
}

// ─── Tags ────────────────────────────────────────────────────────────────────

pub fn encode_tags(tags: &[WireTag]) -> Result<String> {
  Ok(serde_json::to_string(tags)?)
}

pub fn decode_tags(s: &str) -> Result<Vec<WireTag>> {
  Ok(serde_json::from_str(s)?)
}

/// The `(name, value)` pairs written to `event_tags`: single-letter tags
/// with at least one value.
pub fn indexable_tags(tags: &[WireTag]) -> Vec<(String, String)> {
  tags
    .iter()
    .filter_map(|t| match t.as_slice() {
      [name, value, ..] if name.chars().count() == 1 => {
        Some((name.clone(), value.clone()))
      }
      _ => None,
    })
    .collect()
}

// ─── Event id ────────────────────────────────────────────────────────────────

/// SHA-256 hex digest of the canonical serialisation
/// `[0, pubkey, created_at, kind, tags, content]`.
pub fn event_id(
  pubkey: &str,
  created_at: i64,
  kind: u16,
  tags: &[WireTag],
  content: &str,
) -> Result<String> {
  let canonical =
    serde_json::to_string(&serde_json::json!([0, pubkey, created_at, kind, tags, content]))?;
  Ok(hex::encode(Sha256::digest(canonical.as_bytes())))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from an `events` row.
pub struct RawEvent {
  pub id:         String,
  pub pubkey:     String,
  pub kind:       i64,
  pub created_at: i64,
  pub content:    String,
  pub tags:       String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      kind:       u16::try_from(self.kind).map_err(|_| Error::Kind(self.kind))?,
      created_at: decode_ts(self.created_at)?,
      tags:       decode_tags(&self.tags)?,
      id:         self.id,
      pubkey:     self.pubkey,
      content:    self.content,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(kind: i64, created_at: i64, tags: &str) -> RawEvent {
    RawEvent {
      id: "id".into(),
      pubkey: "alice".into(),
      kind,
      created_at,
      content: String::new(),
      tags: tags.into(),
    }
  }

  #[test]
  fn corrupt_rows_name_the_bad_column() {
    assert!(matches!(raw(70_000, 0, "[]").into_event(), Err(Error::Kind(70_000))));
    assert!(matches!(
      raw(1, i64::MAX, "[]").into_event(),
      Err(Error::Timestamp(i64::MAX))
    ));
    assert!(matches!(raw(1, 0, "not json").into_event(), Err(Error::Json(_))));
    assert_eq!(raw(3, 0, "[[\"p\",\"bob\"]]").into_event().unwrap().kind, 3);
  }
}
