//! Follow lists: the `p` tags of a user's contacts event.
//!
//! Only `["p", <pubkey>, ...]` tags are interpreted. Every other tag, and
//! any relay hint or petname after the pubkey, is kept as published.

use crate::tag::WireTag;

const FOLLOW: &str = "p";

/// Pubkeys followed by a contacts event, in tag order, without duplicates.
pub fn follows(tags: &[WireTag]) -> Vec<String> {
  let mut found: Vec<String> = Vec::new();
  for tag in tags {
    let [name, pubkey, ..] = tag.as_slice() else {
      continue;
    };
    if name == FOLLOW && !pubkey.is_empty() && !found.contains(pubkey) {
      found.push(pubkey.clone());
    }
  }
  found
}

/// `tags` with `pubkey` appended as a follow, or `None` if it is already
/// followed.
pub fn with_follow(tags: &[WireTag], pubkey: &str) -> Option<Vec<WireTag>> {
  if follows(tags).iter().any(|p| p == pubkey) {
    return None;
  }
  let mut out = tags.to_vec();
  out.push(vec![FOLLOW.to_string(), pubkey.to_string()]);
  Some(out)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tags(raw: &[&[&str]]) -> Vec<WireTag> {
    raw
      .iter()
      .map(|t| t.iter().map(|s| s.to_string()).collect())
      .collect()
  }

  #[test]
  fn follows_reads_p_tags_once() {
    let raw = tags(&[
      &["p", "bob", "wss://relay", "bobby"],
      &["t", "bookstr"],
      &["p", "carol"],
      &["p", "bob"],
      &["p", ""],
      &["p"],
    ]);
    assert_eq!(follows(&raw), vec!["bob", "carol"]);
  }

  #[test]
  fn with_follow_appends_and_keeps_other_tags() {
    let raw = tags(&[&["p", "bob", "wss://relay"], &["t", "bookstr"]]);
    let out = with_follow(&raw, "carol").unwrap();
    assert_eq!(&out[..2], &raw[..]);
    assert_eq!(out[2], vec!["p", "carol"]);
    assert!(with_follow(&out, "bob").is_none());
  }
}
