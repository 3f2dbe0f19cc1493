//! Server configuration, read from TOML and `SHELF_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use shelf_engine::EngineConfig;

use crate::openlibrary::DEFAULT_BASE_URL;

/// Top-level configuration for the server binary.
///
/// ```toml
/// host        = "127.0.0.1"
/// port        = 8080
/// store_path  = "~/.local/share/shelf/relay.db"
/// user_pubkey = "npub..."
/// relays      = ["wss://relay.damus.io"]
///
/// [engine]
/// short_ttl_secs = 30
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:            String,
  pub port:            u16,
  /// SQLite file backing the local relay.
  pub store_path:      PathBuf,
  /// Relay URLs handed to the transport with every request.
  pub relays:          Vec<String>,
  /// Hex public key the server acts as.
  pub user_pubkey:     String,
  pub openlibrary_url: String,
  pub engine:          EngineConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:            "127.0.0.1".to_string(),
      port:            8080,
      store_path:      PathBuf::from("shelf.db"),
      relays:          Vec::new(),
      user_pubkey:     String::new(),
      openlibrary_url: DEFAULT_BASE_URL.to_string(),
      engine:          EngineConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under `SHELF_*` environment
  /// variables. Nested keys use `__`, e.g. `SHELF_ENGINE__SHORT_TTL_SECS`;
  /// `SHELF_RELAYS` is a comma-separated list.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("SHELF")
          .prefix_separator("_")
          .separator("__")
          .list_separator(",")
          .with_list_parse_key("relays")
          .try_parsing(true),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(toml: &str) -> ServerConfig {
    config::Config::builder()
      .add_source(config::File::from_str(toml, config::FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn empty_file_is_all_defaults() {
    let cfg = parse("");
    assert_eq!(cfg.address(), "127.0.0.1:8080");
    assert_eq!(cfg.openlibrary_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.engine, EngineConfig::default());
  }

  #[test]
  fn nested_engine_section_overrides_selectively() {
    let cfg = parse(
      r#"
        port        = 9000
        user_pubkey = "abc"
        relays      = ["wss://a", "wss://b"]

        [engine]
        short_ttl_secs = 5
      "#,
    );
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.user_pubkey, "abc");
    assert_eq!(cfg.relays, vec!["wss://a", "wss://b"]);
    assert_eq!(cfg.engine.short_ttl_secs, 5);
    assert_eq!(cfg.engine.long_ttl_secs, 300);
  }

  #[test]
  fn missing_file_is_not_an_error() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/shelf.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
  }
}
