//! [`ReactionAggregator`]: the like overlay for feed entries and the single
//! dispatch point for reaction events.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use serde::Serialize;
use shelf_core::{
  activity::FeedItem,
  event::Event,
  filter::Filter,
  kind::REACTION,
  reaction::{PendingToggle, ReactionOverlay, tally},
  transport::Transport,
};

use crate::SyncContext;

#[derive(Debug, Clone)]
enum Slot {
  Settled(ReactionOverlay),
  Pending(PendingToggle),
}

/// Result of [`ReactionAggregator::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "overlay", rename_all = "snake_case")]
pub enum ToggleOutcome {
  /// The reaction was published; the overlay flipped.
  Confirmed(ReactionOverlay),
  /// Publishing failed; the overlay is unchanged.
  RolledBack(ReactionOverlay),
  /// Another toggle of the same entry is in flight; nothing was published.
  /// Carries that toggle's tentative overlay.
  InFlight(ReactionOverlay),
}

impl ToggleOutcome {
  pub fn succeeded(self) -> bool { matches!(self, Self::Confirmed(_)) }

  pub fn overlay(self) -> ReactionOverlay {
    match self {
      Self::Confirmed(o) | Self::RolledBack(o) | Self::InFlight(o) => o,
    }
  }
}

/// Per-entry like overlays for the current user.
///
/// The overlay is seeded from reaction events seen on the network and from
/// then on moves only by local toggles; it is never reconciled against the
/// network's aggregate count.
pub struct ReactionAggregator<T> {
  ctx:      SyncContext<T>,
  overlays: Mutex<HashMap<String, Slot>>,
}

impl<T: Transport> ReactionAggregator<T> {
  pub fn new(ctx: SyncContext<T>) -> Self {
    Self {
      ctx,
      overlays: Mutex::new(HashMap::new()),
    }
  }

  fn slots(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
    self.overlays.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// The overlay to display for `activity_id`. While a toggle is in flight
  /// this is its tentative overlay.
  pub fn overlay(&self, activity_id: &str) -> ReactionOverlay {
    match self.slots().get(activity_id) {
      Some(Slot::Settled(overlay)) => *overlay,
      Some(Slot::Pending(pending)) => pending.tentative(),
      None => ReactionOverlay::default(),
    }
  }

  /// Use tallies of `reactions` as the baseline for entries not yet
  /// tracked. Entries already tracked keep their local state.
  pub fn seed_from_events(&self, reactions: &[Event]) {
    let tallies = tally(reactions, self.ctx.user());
    let mut slots = self.slots();
    for (id, overlay) in tallies {
      slots.entry(id).or_insert(Slot::Settled(overlay));
    }
  }

  /// Fetch reactions to `event_ids` and seed from them. A failed query
  /// seeds nothing.
  pub async fn load(&self, event_ids: &[String]) {
    if event_ids.is_empty() {
      return;
    }
    let filter = event_ids
      .iter()
      .fold(Filter::new().kind(REACTION), |f, id| f.tag('e', id.clone()));
    let reactions = self.ctx.query_or_empty(&filter).await;
    tracing::debug!(count = reactions.len(), "loaded reactions");
    self.seed_from_events(&reactions);
  }

  /// Classify `events` into feed items carrying their current overlays.
  pub fn apply(&self, events: Vec<Event>) -> Vec<FeedItem> {
    events
      .into_iter()
      .filter_map(|event| {
        let overlay = self.overlay(&event.id);
        FeedItem::from_event(event, overlay)
      })
      .collect()
  }

  /// Flip the user's like on `activity_id`.
  ///
  /// Publishes exactly one reaction (`+` to like, `-` to unlike). The
  /// overlay shows the tentative state while the publish is in flight, then
  /// settles on the flipped overlay if it succeeded or the prior one if it
  /// failed. If the returned future is dropped mid-publish the prior overlay
  /// is restored.
  pub async fn toggle(&self, activity_id: &str) -> ToggleOutcome {
    let pending = {
      let mut slots = self.slots();
      let prior = match slots.get(activity_id) {
        Some(Slot::Pending(pending)) => {
          tracing::debug!(activity_id, "reaction toggle already in flight");
          return ToggleOutcome::InFlight(pending.tentative());
        }
        Some(Slot::Settled(overlay)) => *overlay,
        None => ReactionOverlay::default(),
      };
      let pending = PendingToggle::begin(activity_id, prior);
      slots.insert(activity_id.to_string(), Slot::Pending(pending.clone()));
      pending
    };

    let mut guard = PendingGuard {
      aggregator: self,
      pending:    Some(pending.clone()),
    };
    let intent = pending.intent();
    let result = self.ctx.publish(intent.to_event(activity_id)).await;
    guard.pending = None;

    match result {
      Ok(event) => {
        let overlay = pending.confirm();
        self.settle(activity_id, overlay);
        tracing::info!(activity_id, ?intent, id = %event.id, "published reaction");
        ToggleOutcome::Confirmed(overlay)
      }
      Err(e) => {
        let overlay = pending.rollback();
        self.settle(activity_id, overlay);
        tracing::warn!(activity_id, ?intent, error = %e, "reaction publish failed; rolled back");
        ToggleOutcome::RolledBack(overlay)
      }
    }
  }

  fn settle(&self, activity_id: &str, overlay: ReactionOverlay) {
    self
      .slots()
      .insert(activity_id.to_string(), Slot::Settled(overlay));
  }
}

/// Rolls a pending toggle back if the toggle future is dropped before the
/// publish resolves.
struct PendingGuard<'a, T: Transport> {
  aggregator: &'a ReactionAggregator<T>,
  pending:    Option<PendingToggle>,
}

impl<T: Transport> Drop for PendingGuard<'_, T> {
  fn drop(&mut self) {
    if let Some(pending) = self.pending.take() {
      let id = pending.activity_id().to_string();
      self.aggregator.settle(&id, pending.rollback());
    }
  }
}
