//! List merger: computes the complete tag set of a list event after adding
//! or removing one ISBN.
//!
//! The output layout is always `opaque tags ++ membership tags ++ [marker]`:
//! opaque tags keep their relative order, memberships are deduplicated in
//! first-seen order, and the marker is present iff at least one membership
//! remains.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
  book::Isbn,
  tag::{Tag, encode_membership},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutation {
  Add,
  Remove,
}

/// What a merge did to the membership set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
  Added,
  /// The ISBN was already a member; membership is unchanged.
  AlreadyPresent,
  Removed,
  /// The ISBN was never a member; the input tags are returned untouched and
  /// nothing should be published.
  NotPresent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merged {
  pub tags:    Vec<Tag>,
  pub outcome: MergeOutcome,
}

impl Merged {
  pub fn is_noop(&self) -> bool { self.outcome == MergeOutcome::NotPresent }
}

pub fn merge(existing: &[Tag], isbn: &Isbn, mutation: Mutation) -> Merged {
  let present = existing.iter().any(|t| t.is_membership_of(isbn));

  match mutation {
    Mutation::Add => {
      let mut tags = normalise(existing, None);
      let outcome = if present {
        MergeOutcome::AlreadyPresent
      } else {
        insert_membership(&mut tags, isbn);
        MergeOutcome::Added
      };
      Merged { tags, outcome }
    }
    Mutation::Remove if !present => Merged {
      tags:    existing.to_vec(),
      outcome: MergeOutcome::NotPresent,
    },
    Mutation::Remove => Merged {
      tags:    normalise(existing, Some(isbn)),
      outcome: MergeOutcome::Removed,
    },
  }
}

/// Rebuild `tags` in canonical layout, dropping memberships of `exclude`.
fn normalise(tags: &[Tag], exclude: Option<&Isbn>) -> Vec<Tag> {
  let mut seen: HashSet<&Isbn> = HashSet::new();
  let mut opaque = Vec::new();
  let mut members = Vec::new();

  for tag in tags {
    match tag {
      Tag::Membership(isbn) => {
        if Some(isbn) != exclude && seen.insert(isbn) {
          members.push(tag.clone());
        }
      }
      Tag::Marker => {}
      Tag::Opaque(_) => opaque.push(tag.clone()),
    }
  }

  let has_members = !members.is_empty();
  opaque.extend(members);
  if has_members {
    opaque.push(Tag::Marker);
  }
  opaque
}

/// Insert a membership for `isbn` just before the trailing marker.
fn insert_membership(tags: &mut Vec<Tag>, isbn: &Isbn) {
  if tags.last() == Some(&Tag::Marker) {
    let at = tags.len() - 1;
    tags.insert(at, encode_membership(isbn));
  } else {
    tags.push(encode_membership(isbn));
    tags.push(Tag::Marker);
  }
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use super::*;
  use crate::tag::{decode_membership, decode_tags};

  fn isbn(s: &str) -> Isbn { Isbn::new(s).unwrap() }

  fn tags(raw: &[&[&str]]) -> Vec<Tag> {
    let wire: Vec<Vec<String>> = raw
      .iter()
      .map(|t| t.iter().map(|s| s.to_string()).collect())
      .collect();
    decode_tags(&wire)
  }

  fn members(tags: &[Tag]) -> BTreeSet<Isbn> { decode_membership(tags) }

  fn marker_count(tags: &[Tag]) -> usize {
    tags.iter().filter(|t| **t == Tag::Marker).count()
  }

  #[test]
  fn add_to_empty_creates_membership_and_marker() {
    let merged = merge(&[], &isbn("A"), Mutation::Add);
    assert_eq!(merged.outcome, MergeOutcome::Added);
    assert_eq!(merged.tags, vec![Tag::Membership(isbn("A")), Tag::Marker]);
  }

  #[test]
  fn add_is_idempotent() {
    let start = tags(&[&["i", "isbn:A"], &["k", "isbn"]]);
    let once = merge(&start, &isbn("B"), Mutation::Add);
    let twice = merge(&once.tags, &isbn("B"), Mutation::Add);

    assert_eq!(twice.outcome, MergeOutcome::AlreadyPresent);
    assert_eq!(members(&once.tags), members(&twice.tags));
    assert_eq!(once.tags, twice.tags);
  }

  #[test]
  fn duplicate_add_never_duplicates_tags() {
    let start = tags(&[&["i", "isbn:A"], &["i", "isbn:B"], &["k", "isbn"]]);
    let merged = merge(&start, &isbn("A"), Mutation::Add);

    assert_eq!(merged.outcome, MergeOutcome::AlreadyPresent);
    assert_eq!(members(&merged.tags), BTreeSet::from([isbn("A"), isbn("B")]));
    let count = merged
      .tags
      .iter()
      .filter(|t| t.is_membership_of(&isbn("A")))
      .count();
    assert_eq!(count, 1);
  }

  #[test]
  fn add_collapses_duplicates_already_on_the_wire() {
    let start = tags(&[
      &["i", "isbn:A"],
      &["k", "isbn"],
      &["i", "isbn:A"],
      &["k", "isbn"],
    ]);
    let merged = merge(&start, &isbn("C"), Mutation::Add);
    assert_eq!(merged.tags.len(), 3);
    assert_eq!(marker_count(&merged.tags), 1);
  }

  #[test]
  fn add_appends_missing_marker() {
    let start = tags(&[&["i", "isbn:A"]]);
    let merged = merge(&start, &isbn("B"), Mutation::Add);
    assert_eq!(marker_count(&merged.tags), 1);
    assert_eq!(merged.tags.last(), Some(&Tag::Marker));
  }

  #[test]
  fn opaque_tags_pass_through_in_order() {
    let start = tags(&[
      &["t", "bookstr"],
      &["i", "isbn:A"],
      &["d", "list"],
      &["i", "broken"],
    ]);
    let merged = merge(&start, &isbn("B"), Mutation::Add);
    let opaque: Vec<_> = merged
      .tags
      .iter()
      .filter(|t| matches!(t, Tag::Opaque(_)))
      .cloned()
      .collect();
    assert_eq!(opaque, tags(&[&["t", "bookstr"], &["d", "list"], &["i", "broken"]]));
  }

  #[test]
  fn remove_absent_is_noop_and_returns_input() {
    let start = tags(&[&["i", "isbn:A"], &["t", "bookstr"]]);
    let merged = merge(&start, &isbn("Z"), Mutation::Remove);
    assert!(merged.is_noop());
    assert_eq!(merged.tags, start);
  }

  #[test]
  fn remove_last_member_drops_marker() {
    let start = tags(&[&["t", "bookstr"], &["i", "isbn:C"], &["k", "isbn"]]);
    let merged = merge(&start, &isbn("C"), Mutation::Remove);

    assert_eq!(merged.outcome, MergeOutcome::Removed);
    assert!(members(&merged.tags).is_empty());
    assert_eq!(marker_count(&merged.tags), 0);
    assert_eq!(merged.tags, tags(&[&["t", "bookstr"]]));
  }

  #[test]
  fn remove_keeps_marker_while_members_remain() {
    let start = tags(&[&["i", "isbn:A"], &["i", "isbn:C"], &["k", "isbn"]]);
    let merged = merge(&start, &isbn("C"), Mutation::Remove);
    assert_eq!(members(&merged.tags), BTreeSet::from([isbn("A")]));
    assert_eq!(marker_count(&merged.tags), 1);
  }

  #[test]
  fn marker_present_iff_members_after_any_merge() {
    let start = tags(&[&["i", "isbn:A"], &["t", "bookstr"]]);
    for (i, m) in [
      (isbn("A"), Mutation::Remove),
      (isbn("B"), Mutation::Add),
      (isbn("A"), Mutation::Add),
    ] {
      let merged = merge(&start, &i, m);
      assert_eq!(
        marker_count(&merged.tags) == 1,
        !members(&merged.tags).is_empty(),
        "{m:?} {i}"
      );
    }
  }
}
