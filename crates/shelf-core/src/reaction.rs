//! Reaction overlay: the locally held like count and flag for a feed entry,
//! and the two-phase toggle that updates it.
//!
//! A toggle is begun with the settled overlay, carries a tentative overlay
//! while the reaction is being published, and is then either confirmed
//! (tentative becomes settled) or rolled back (prior stays settled).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
  event::{Event, NewEvent},
  kind::REACTION,
};

// ─── Overlay ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionOverlay {
  pub count:        u32,
  pub user_reacted: bool,
}

impl ReactionOverlay {
  pub fn new(count: u32, user_reacted: bool) -> Self {
    Self {
      count,
      user_reacted,
    }
  }

  /// The overlay after the user's reaction flips.
  pub fn toggled(self) -> Self {
    if self.user_reacted {
      Self::new(self.count.saturating_sub(1), false)
    } else {
      Self::new(self.count.saturating_add(1), true)
    }
  }

  /// What publishing a toggle from this overlay means.
  pub fn intent(self) -> ReactionIntent {
    if self.user_reacted {
      ReactionIntent::Unlike
    } else {
      ReactionIntent::Like
    }
  }
}

/// Tally reaction events per target event id.
///
/// `+` (or empty) content counts as a like. Each author's newest reaction to
/// a target decides whether that author currently likes it, so a later `-`
/// cancels an earlier `+`. `user` marks the overlay's `user_reacted` flag.
pub fn tally(reactions: &[Event], user: &str) -> HashMap<String, ReactionOverlay> {
  let mut newest: HashMap<(&str, &str), &Event> = HashMap::new();
  for event in reactions.iter().filter(|e| e.kind == REACTION) {
    let Some(target) = reaction_target(event) else {
      continue;
    };
    let key = (target, event.pubkey.as_str());
    if newest.get(&key).is_none_or(|prev| event.supersedes(prev)) {
      newest.insert(key, event);
    }
  }

  let mut overlays: HashMap<String, ReactionOverlay> = HashMap::new();
  for ((target, author), event) in newest {
    if !is_like(&event.content) {
      continue;
    }
    let overlay = overlays.entry(target.to_string()).or_default();
    overlay.count += 1;
    if author == user {
      overlay.user_reacted = true;
    }
  }
  overlays
}

fn is_like(content: &str) -> bool {
  matches!(content.trim(), "" | "+")
}

/// The id of the event a reaction refers to: the last `e` tag.
fn reaction_target(event: &Event) -> Option<&str> {
  event
    .tags
    .iter()
    .rev()
    .find(|t| t.first().is_some_and(|n| n == "e"))
    .and_then(|t| t.get(1))
    .map(String::as_str)
}

// ─── Intent ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionIntent {
  Like,
  Unlike,
}

impl ReactionIntent {
  pub fn content(self) -> &'static str {
    match self {
      Self::Like => "+",
      Self::Unlike => "-",
    }
  }

  /// The single reaction event expressing this intent towards `event_id`.
  pub fn to_event(self, event_id: &str) -> NewEvent {
    NewEvent::new(
      REACTION,
      vec![vec!["e".to_string(), event_id.to_string()]],
      self.content(),
    )
  }
}

// ─── Two-phase toggle ────────────────────────────────────────────────────────

/// A toggle whose reaction is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingToggle {
  activity_id: String,
  prior:       ReactionOverlay,
  tentative:   ReactionOverlay,
}

impl PendingToggle {
  pub fn begin(activity_id: impl Into<String>, prior: ReactionOverlay) -> Self {
    Self {
      activity_id: activity_id.into(),
      prior,
      tentative: prior.toggled(),
    }
  }

  pub fn activity_id(&self) -> &str { &self.activity_id }

  pub fn intent(&self) -> ReactionIntent { self.prior.intent() }

  /// What the UI may show while the reaction is in flight.
  pub fn tentative(&self) -> ReactionOverlay { self.tentative }

  /// The publish succeeded: the tentative overlay becomes settled.
  pub fn confirm(self) -> ReactionOverlay { self.tentative }

  /// The publish failed: the prior overlay stays settled.
  pub fn rollback(self) -> ReactionOverlay { self.prior }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  fn reaction(id: &str, author: &str, target: &str, content: &str, secs: i64) -> Event {
    Event {
      id:         id.into(),
      pubkey:     author.into(),
      kind:       REACTION,
      tags:       vec![vec!["e".into(), target.into()]],
      content:    content.into(),
      created_at: Utc.timestamp_opt(secs, 0).unwrap(),
    }
  }

  #[test]
  fn toggle_flips_flag_and_count() {
    let start = ReactionOverlay::new(3, false);
    assert_eq!(start.toggled(), ReactionOverlay::new(4, true));
    assert_eq!(start.toggled().toggled(), start);
    assert_eq!(ReactionOverlay::new(0, true).toggled(), ReactionOverlay::new(0, false));
  }

  #[test]
  fn pending_toggle_confirms_or_rolls_back() {
    let prior = ReactionOverlay::new(3, false);

    let pending = PendingToggle::begin("ev", prior);
    assert_eq!(pending.intent(), ReactionIntent::Like);
    assert_eq!(pending.tentative(), ReactionOverlay::new(4, true));
    assert_eq!(pending.confirm(), ReactionOverlay::new(4, true));

    let pending = PendingToggle::begin("ev", prior);
    assert_eq!(pending.rollback(), prior);
  }

  #[test]
  fn unlike_publishes_minus() {
    let event = ReactionIntent::Unlike.to_event("abc");
    assert_eq!(event.kind, REACTION);
    assert_eq!(event.content, "-");
    assert_eq!(event.tags, vec![vec!["e".to_string(), "abc".to_string()]]);
  }

  #[test]
  fn tally_counts_latest_reaction_per_author() {
    let reactions = vec![
      reaction("1", "alice", "post", "+", 10),
      reaction("2", "bob", "post", "+", 10),
      reaction("3", "bob", "post", "-", 20),
      reaction("4", "carol", "post", "+", 10),
      reaction("5", "carol", "other", "", 10),
    ];
    let overlays = tally(&reactions, "alice");

    assert_eq!(overlays["post"], ReactionOverlay::new(2, true));
    assert_eq!(overlays["other"], ReactionOverlay::new(1, false));
  }
}
