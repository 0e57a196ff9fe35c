//! Configuration management for quicknotes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "quicknotes";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "notes.db";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "QUICKNOTES_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `QUICKNOTES_`, sections split on `__`)
/// 2. TOML config file at `~/.config/quicknotes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
    /// Directory holding the static frontend, served under `/notes`.
    /// The frontend is not served when unset.
    pub frontend_dir: Option<PathBuf>,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/quicknotes/notes.db`
    pub database_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            allowed_origins: vec!["https://megadev.se".to_string()],
            frontend_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A missing config file is not an error; defaults and environment
    /// variables still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing, or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        self.bind_address()?;

        for origin in &self.server.allowed_origins {
            validate_origin(origin)?;
        }

        if let Some(dir) = &self.server.frontend_dir {
            if dir.as_os_str().is_empty() {
                return Err(Error::config_validation("frontend_dir must not be empty"));
            }
        }

        Ok(())
    }

    /// Resolve `host:port` into a socket address.
    ///
    /// # Errors
    ///
    /// Returns an error if the host does not resolve.
    pub fn bind_address(&self) -> Result<SocketAddr> {
        let ServerConfig { host, port, .. } = &self.server;
        (host.as_str(), *port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or_else(|| Error::config_validation(format!("cannot bind to {host}:{port}")))
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }
}

/// An origin is `scheme://host[:port]` with nothing after it.
fn validate_origin(origin: &str) -> Result<()> {
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::config_validation(format!(
                "allowed origin must start with http:// or https://: {origin}"
            ))
        })?;

    if rest.is_empty() || rest.contains('/') || rest.contains('*') {
        return Err(Error::config_validation(format!(
            "allowed origin must be a bare scheme://host[:port]: {origin}"
        )));
    }

    HeaderValue::from_str(origin).map_err(|_| {
        Error::config_validation(format!("allowed origin is not a valid header value: {origin}"))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.allowed_origins, vec!["https://megadev.se"]);
        assert!(config.server.frontend_dir.is_none());
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unresolvable_host() {
        let mut config = Config::default();
        config.server.host = "not a host name".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("cannot bind"));
    }

    #[test]
    fn test_validate_rejects_bad_origins() {
        for origin in [
            "megadev.se",
            "ftp://megadev.se",
            "https://",
            "https://megadev.se/",
            "https://*.megadev.se",
        ] {
            let mut config = Config::default();
            config.server.allowed_origins = vec![origin.to_string()];
            assert!(config.validate().is_err(), "accepted {origin}");
        }
    }

    #[test]
    fn test_validate_accepts_origin_with_port() {
        let mut config = Config::default();
        config.server.allowed_origins = vec!["http://localhost:5173".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_allows_no_origins() {
        let mut config = Config::default();
        config.server.allowed_origins.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bind_address() {
        let mut config = Config::default();
        config.server.port = 9000;

        let addr = config.bind_address().unwrap();
        assert_eq!(addr.port(), 9000);
        assert!(addr.ip().is_loopback());
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("quicknotes"));
        assert!(path.to_string_lossy().ends_with("notes.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/srv/notes/notes.db"));

        assert_eq!(config.database_path(), PathBuf::from("/srv/notes/notes.db"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("quicknotes"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9123
allowed_origins = ["http://localhost:3000", "https://notes.example.com"]
frontend_dir = "frontend/notes"

[storage]
database_path = "/tmp/quicknotes-test.db"
"#
        )
        .unwrap();

        let config = Config::load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 9123);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.allowed_origins.len(), 2);
        assert_eq!(
            config.server.frontend_dir,
            Some(PathBuf::from("frontend/notes"))
        );
        assert_eq!(
            config.database_path(),
            PathBuf::from("/tmp/quicknotes-test.db")
        );
    }

    #[test]
    fn test_load_rejects_invalid_file_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nallowed_origins = [\"*\"]").unwrap();

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = \"eighty\"").unwrap();

        let err = Config::load_from(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("allowed_origins"));
        assert!(json.contains("database_path"));
    }

    #[test]
    fn test_server_config_deserialize_partial() {
        let json = r#"{"port": 3000}"#;
        let server: ServerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(server.port, 3000);
        assert_eq!(server.host, "127.0.0.1");
    }
}
