//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Root directory for attachment storage.
    pub media_root: PathBuf,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `HELPLINE_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:helpline.db?mode=rwc` |
    /// | `MEDIA_ROOT` | Attachment storage directory | `media` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("HELPLINE_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:helpline.db?mode=rwc".to_string());

        let media_root = env::var("MEDIA_ROOT")
            .unwrap_or_else(|_| "media".to_string())
            .into();

        Ok(Self {
            addr,
            database_url,
            media_root,
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid HELPLINE_ADDR format")]
    InvalidAddr,
}
