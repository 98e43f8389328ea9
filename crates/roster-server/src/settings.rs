//! Server configuration: defaults, then an optional TOML file, then
//! `ROSTER_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use axum::http::{HeaderValue, Method, header};
use serde::Deserialize;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Runtime server configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub storage_timeout_ms: u64,
  /// Origins allowed to call the API from a browser. Empty allows any.
  #[serde(default)]
  pub cors_origins:       Vec<String>,
  /// SQL fixtures that replace the store contents at startup.
  #[serde(default)]
  pub seed_path:          Option<PathBuf>,
}

impl ServerConfig {
  /// Load from `path` (missing file is fine) and the environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8000_i64)?
      .set_default("store_path", "roster.db")?
      .set_default("storage_timeout_ms", 5000_i64)?
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("ROSTER")
          .try_parsing(true)
          .list_separator(",")
          .with_list_parse_key("cors_origins"),
      )
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn storage_timeout(&self) -> Duration { Duration::from_millis(self.storage_timeout_ms) }

  /// CORS for the browser frontend. Permissive when no origins are listed.
  pub fn cors_layer(&self) -> anyhow::Result<CorsLayer> {
    if self.cors_origins.is_empty() {
      return Ok(CorsLayer::permissive());
    }
    let origins = self
      .cors_origins
      .iter()
      .map(|o| {
        HeaderValue::from_str(o).with_context(|| format!("invalid CORS origin {o:?}"))
      })
      .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(
      CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]),
    )
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
