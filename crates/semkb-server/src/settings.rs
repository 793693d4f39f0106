//! Runtime configuration for the `semkb` binary.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use semkb_core::config::RetrievalConfig;
use serde::Deserialize;

/// Runtime server configuration, deserialised from `config.toml` and
/// `SEMKB_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub retrieval:  RetrievalConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       7341,
      store_path: PathBuf::from("semkb.sqlite3"),
      retrieval:  RetrievalConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Layer `SEMKB_*` variables (nested keys split on `__`, e.g.
  /// `SEMKB_RETRIEVAL__ERROR_TOLERANCE`) over the optional file at `path`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(
        config::Environment::with_prefix("SEMKB")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      )
      .build()
      .context("failed to read config file")?;

    let mut cfg: ServerConfig = settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_file_yields_defaults() {
    let cfg = ServerConfig::load(Path::new("/nonexistent/semkb.toml")).unwrap();
    assert_eq!(cfg.port, 7341);
    assert_eq!(cfg.retrieval, RetrievalConfig::default());
  }

  #[test]
  fn partial_retrieval_table_keeps_other_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .add_source(config::File::from_str(
        "port = 9000\n[retrieval]\nerror_tolerance = 3\n",
        config::FileFormat::Toml,
      ))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.retrieval.error_tolerance, 3);
    assert_eq!(cfg.retrieval.max_entity_length, 50);
    assert_eq!(cfg.host, "127.0.0.1");
  }

  #[test]
  fn tilde_is_expanded() {
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/kb.sqlite3")), PathBuf::from(home).join("kb.sqlite3"));
    }
    assert_eq!(expand_tilde(Path::new("/abs/kb")), PathBuf::from("/abs/kb"));
  }
}
