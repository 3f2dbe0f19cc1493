//! Shelf server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered under
//! `SHELF_*` environment variables, opens the SQLite relay, and serves the
//! JSON API over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use shelf_engine::{Shelf, SyncContext};
use shelf_server::{OpenLibrary, ServerConfig};
use shelf_store_sqlite::SqliteRelay;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Shelf reading-list server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  if cfg.user_pubkey.is_empty() {
    anyhow::bail!("user_pubkey is not configured (set it in the config file or SHELF_USER_PUBKEY)");
  }

  let store_path = expand_tilde(&cfg.store_path);
  let relay = SqliteRelay::open(&store_path, cfg.user_pubkey.clone())
    .await
    .with_context(|| format!("failed to open relay store at {store_path:?}"))?;

  let metadata =
    OpenLibrary::new(cfg.openlibrary_url.clone()).context("failed to build metadata client")?;

  let ctx = SyncContext::new(
    relay,
    cfg.relays.clone(),
    cfg.user_pubkey.clone(),
    cfg.engine.clone(),
  );
  let shelf = Arc::new(Shelf::new(ctx, metadata));

  let app = shelf_server::app(shelf);
  let address = cfg.address();

  tracing::info!(user = %cfg.user_pubkey, relays = cfg.relays.len(), "Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
