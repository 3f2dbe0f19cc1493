//! Engine tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shelf_core::kind::TOPIC;

/// Tunables for the sync engine and feed cache. Every field has a default,
/// so a partial (or empty) configuration section is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Age below which a cached feed is served without touching the network.
  pub short_ttl_secs:       u64,
  /// Age below which a cached feed is still served, with a background
  /// refresh.
  pub long_ttl_secs:        u64,
  /// Wall-clock bound on one feed query.
  pub fetch_timeout_secs:   u64,
  /// How many events to ask for when looking up the current list event.
  pub existing_state_limit: usize,
  /// How many list events to ask for when loading a library.
  pub library_limit:        usize,
  /// Value of the `t` tag that marks an event as belonging to the app.
  pub feed_topic:           String,
  /// The feed asks relays for `limit * feed_overfetch` events.
  pub feed_overfetch:       usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      short_ttl_secs:       60,
      long_ttl_secs:        300,
      fetch_timeout_secs:   15,
      existing_state_limit: 10,
      library_limit:        1000,
      feed_topic:           TOPIC.to_string(),
      feed_overfetch:       2,
    }
  }
}

impl EngineConfig {
  pub fn short_ttl(&self) -> Duration { Duration::from_secs(self.short_ttl_secs) }

  pub fn long_ttl(&self) -> Duration { Duration::from_secs(self.long_ttl_secs) }

  pub fn fetch_timeout(&self) -> Duration {
    Duration::from_secs(self.fetch_timeout_secs)
  }
}
