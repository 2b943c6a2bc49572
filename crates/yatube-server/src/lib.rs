//! Yatube feed server.
//!
//! Wires configuration, the SQLite store and the JSON API into one axum
//! application.

use std::{num::NonZeroUsize, path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use yatube_api::{AppState, api_router};
use yatube_core::{
  cache::DEFAULT_TTL,
  pagination::DEFAULT_PAGE_SIZE,
  store::FeedStore,
};

/// Prefix of environment variables that override the config file,
/// e.g. `YATUBE_PORT=9000`.
pub const ENV_PREFIX: &str = "YATUBE";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and the
/// environment. Every field has a default.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:           String,
  pub port:           u16,
  pub store_path:     PathBuf,
  /// Posts per feed page.
  pub page_size:      NonZeroUsize,
  /// Lifetime of cached global feed pages; `0` disables the cache.
  pub cache_ttl_secs: u64,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           "127.0.0.1".to_string(),
      port:           8000,
      store_path:     PathBuf::from("yatube.db"),
      page_size:      DEFAULT_PAGE_SIZE,
      cache_ttl_secs: DEFAULT_TTL.as_secs(),
    }
  }
}

impl ServerConfig {
  /// Layer `YATUBE_*` environment variables over an optional TOML file.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path.into()).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn cache_ttl(&self) -> Duration { Duration::from_secs(self.cache_ttl_secs) }
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Build the full application router over `store`.
pub fn app<S>(store: Arc<S>, config: &ServerConfig) -> Router
where
  S: FeedStore + 'static,
{
  let state = AppState::new(store, config.page_size, config.cache_ttl());
  api_router(state).layer(TraceLayer::new_for_http())
}
