//! Relay query filters and their canonical cache keys.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use crate::event::Event;

/// A relay query. Empty `kinds`/`authors` match everything; each entry of
/// `tags` requires the event to carry a tag of that name whose first value
/// is one of the listed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
  pub kinds:   Vec<u16>,
  pub authors: Vec<String>,
  pub tags:    BTreeMap<char, Vec<String>>,
  pub limit:   Option<usize>,
  /// Upper bound (inclusive) on `created_at`; set for pagination.
  pub until:   Option<DateTime<Utc>>,
}

impl Filter {
  pub fn new() -> Self { Self::default() }

  pub fn kind(mut self, kind: u16) -> Self {
    self.kinds.push(kind);
    self
  }

  pub fn kinds(mut self, kinds: impl IntoIterator<Item = u16>) -> Self {
    self.kinds.extend(kinds);
    self
  }

  pub fn author(mut self, author: impl Into<String>) -> Self {
    self.authors.push(author.into());
    self
  }

  pub fn authors<I, S>(mut self, authors: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.authors.extend(authors.into_iter().map(Into::into));
    self
  }

  pub fn tag(mut self, name: char, value: impl Into<String>) -> Self {
    self.tags.entry(name).or_default().push(value.into());
    self
  }

  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  pub fn until(mut self, until: Option<DateTime<Utc>>) -> Self {
    self.until = until;
    self
  }

  pub fn is_paginated(&self) -> bool { self.until.is_some() }

  /// Whether `event` satisfies every constraint except `limit`.
  pub fn matches(&self, event: &Event) -> bool {
    if !self.kinds.is_empty() && !self.kinds.contains(&event.kind) {
      return false;
    }
    if !self.authors.is_empty() && !self.authors.contains(&event.pubkey) {
      return false;
    }
    if self.until.is_some_and(|until| event.created_at > until) {
      return false;
    }
    self.tags.iter().all(|(name, values)| {
      event.tags.iter().any(|tag| match tag.as_slice() {
        [n, v, ..] => {
          n.chars().eq(std::iter::once(*name)) && values.contains(v)
        }
        _ => false,
      })
    })
  }

  /// A stable key for caching the result of this query.
  ///
  /// Kinds, authors and tag values are sorted and deduplicated before
  /// hashing, so logically equal filters hash identically regardless of the
  /// order they were built in. `until` is excluded: paginated queries never
  /// touch the cache.
  pub fn cache_key(&self) -> String {
    let kinds: BTreeSet<u16> = self.kinds.iter().copied().collect();
    let authors: BTreeSet<&str> =
      self.authors.iter().map(String::as_str).collect();

    let mut hasher = Sha256::new();
    hasher.update(b"kinds");
    for kind in kinds {
      hasher.update(kind.to_le_bytes());
    }
    hasher.update(b"\0authors");
    for author in authors {
      hasher.update(author.as_bytes());
      hasher.update([0u8]);
    }
    for (name, values) in &self.tags {
      let values: BTreeSet<&str> = values.iter().map(String::as_str).collect();
      if values.is_empty() {
        continue;
      }
      hasher.update(b"\0#");
      hasher.update(name.to_string().as_bytes());
      for value in values {
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
      }
    }
    hasher.update(b"\0limit");
    if let Some(limit) = self.limit {
      hasher.update((limit as u64).to_le_bytes());
    }
    hex::encode(hasher.finalize())
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;
  use crate::kind::{BOOK_READING, BOOK_REVIEW, BOOK_TBR};

  fn event(kind: u16, tags: &[&[&str]], secs: i64) -> Event {
    Event {
      id: "id".into(),
      pubkey: "alice".into(),
      kind,
      tags: tags
        .iter()
        .map(|t| t.iter().map(|s| s.to_string()).collect())
        .collect(),
      content: String::new(),
      created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn cache_key_ignores_insertion_order() {
    let a = Filter::new()
      .kinds([BOOK_TBR, BOOK_READING])
      .tag('t', "bookstr")
      .tag('t', "books")
      .limit(20);
    let b = Filter::new()
      .limit(20)
      .tag('t', "books")
      .kinds([BOOK_READING, BOOK_TBR, BOOK_TBR])
      .tag('t', "bookstr");
    assert_eq!(a.cache_key(), b.cache_key());
  }

  #[test]
  fn cache_key_distinguishes_semantic_fields() {
    let base = Filter::new().kind(BOOK_TBR).tag('t', "bookstr").limit(20);
    assert_ne!(base.cache_key(), base.clone().limit(40).cache_key());
    assert_ne!(base.cache_key(), base.clone().kind(BOOK_REVIEW).cache_key());
    assert_ne!(base.cache_key(), base.clone().tag('t', "other").cache_key());
    assert_ne!(base.cache_key(), base.clone().author("bob").cache_key());
  }

  #[test]
  fn cache_key_ignores_until() {
    let base = Filter::new().kind(BOOK_TBR).limit(20);
    let paged = base.clone().until(Some(Utc.timestamp_opt(5, 0).unwrap()));
    assert_eq!(base.cache_key(), paged.cache_key());
  }

  #[test]
  fn matches_applies_every_constraint() {
    let filter = Filter::new()
      .kind(BOOK_REVIEW)
      .author("alice")
      .tag('i', "isbn:1")
      .until(Some(Utc.timestamp_opt(100, 0).unwrap()));

    assert!(filter.matches(&event(BOOK_REVIEW, &[&["i", "isbn:1"]], 50)));
    assert!(!filter.matches(&event(BOOK_TBR, &[&["i", "isbn:1"]], 50)));
    assert!(!filter.matches(&event(BOOK_REVIEW, &[&["i", "isbn:2"]], 50)));
    assert!(!filter.matches(&event(BOOK_REVIEW, &[&["i", "isbn:1"]], 150)));
    assert!(!filter.matches(&event(BOOK_REVIEW, &[&["i"]], 50)));
  }
}
