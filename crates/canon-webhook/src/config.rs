//! Server configuration, loaded once at startup and passed into the router
//! state.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable prefix, e.g. `CANON_STORE_PATH`.
pub const ENV_PREFIX: &str = "CANON";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BODY_LIMIT: usize = 8 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
  /// A source could not be read, or a required key is absent.
  #[error("failed to load configuration: {0}")]
  Load(#[from] config::ConfigError),

  #[error("invalid configuration value for `{field}`: {reason}")]
  Invalid {
    field:  &'static str,
    reason: &'static str,
  },
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `CANON_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file. Required; a leading `~/` is expanded.
  pub store_path: PathBuf,
  /// Maximum accepted webhook body, in bytes.
  pub body_limit: usize,
}

impl ServerConfig {
  /// Layer the optional TOML file at `path` under the environment, apply
  /// defaults, and validate. Fails on the first absent or invalid value.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let settings = config::Config::builder()
      .set_default("host", DEFAULT_HOST)?
      .set_default("port", i64::from(DEFAULT_PORT))?
      .set_default("body_limit", DEFAULT_BODY_LIMIT as i64)?
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix(ENV_PREFIX))
      .build()?;

    let mut cfg: Self = settings.try_deserialize()?;
    cfg.store_path = expand_tilde(&cfg.store_path);
    cfg.validate()?;
    Ok(cfg)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.host.trim().is_empty() {
      return Err(ConfigError::Invalid { field: "host", reason: "must not be empty" });
    }
    if self.port == 0 {
      return Err(ConfigError::Invalid { field: "port", reason: "must be non-zero" });
    }
    if self.store_path.as_os_str().is_empty() {
      return Err(ConfigError::Invalid { field: "store_path", reason: "must not be empty" });
    }
    if self.body_limit == 0 {
      return Err(ConfigError::Invalid { field: "body_limit", reason: "must be non-zero" });
    }
    Ok(())
  }

  /// `host:port`, ready for binding.
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
