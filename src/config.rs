//! Configuration management for ttl-session.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::net::IpAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::ServerConfig;
use crate::cli::Args;
use crate::error::SessionError;
use crate::session::StoreConfig;
use crate::transport::{BearerTransport, CookieTransport, TokenTransport, DEFAULT_COOKIE_NAME};

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Session store configuration.
    pub session: SessionSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable graceful shutdown.
    pub graceful_shutdown: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            graceful_shutdown: true,
        }
    }
}

/// How clients present their session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Cookie,
    Bearer,
}

/// Session store configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Idle lifetime in seconds.
    pub ttl_secs: u64,
    /// Seconds between sweeps; the TTL when absent.
    pub sweep_interval_secs: Option<u64>,
    /// Token transport.
    pub transport: TransportKind,
    /// Cookie name (cookie transport only).
    pub cookie_name: String,
    /// Cookie path (cookie transport only).
    pub cookie_path: String,
    /// Mark the cookie `Secure`.
    pub cookie_secure: bool,
    /// Send `Max-Age` equal to the TTL instead of a browser-session cookie.
    pub persistent_cookie: bool,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            ttl_secs: 1800,
            sweep_interval_secs: None,
            transport: TransportKind::Cookie,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            cookie_secure: false,
            persistent_cookie: true,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level (error, warn, info, debug, trace).
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// Unparseable values are ignored.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("TTL_SESSION_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("TTL_SESSION_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(ttl) = lookup("TTL_SESSION_TTL").and_then(|t| t.parse().ok()) {
            self.session.ttl_secs = ttl;
        }

        if let Some(secs) = lookup("TTL_SESSION_SWEEP_INTERVAL").and_then(|s| s.parse().ok()) {
            self.session.sweep_interval_secs = Some(secs);
        }

        if let Some(name) = lookup("TTL_SESSION_COOKIE_NAME").filter(|n| !n.is_empty()) {
            self.session.cookie_name = name;
        }

        match lookup("TTL_SESSION_TRANSPORT").as_deref() {
            Some("cookie") => self.session.transport = TransportKind::Cookie,
            Some("bearer") => self.session.transport = TransportKind::Bearer,
            _ => {}
        }

        if let Some(level) = lookup("TTL_SESSION_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(host) = args.host {
            self.server.host = host.to_string();
        }

        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(ttl) = args.ttl {
            self.session.ttl_secs = ttl;
        }

        if let Some(secs) = args.sweep_interval {
            self.session.sweep_interval_secs = Some(secs);
        }

        if let Some(ref name) = args.cookie_name {
            self.session.cookie_name = name.clone();
        }

        if args.bearer {
            self.session.transport = TransportKind::Bearer;
        }

        if let Some(ref level) = args.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Load configuration with full priority chain.
    ///
    /// Priority: CLI args > env vars > config file > defaults
    pub fn load(args: &Args) -> Result<Self, ConfigError> {
        let mut config = match args.config {
            Some(ref path) => Config::from_file(path)?,
            None => Config::default(),
        };

        config.apply_env();
        config.apply_args(args);

        Ok(config)
    }

    /// Convert to ServerConfig for the API server.
    pub fn to_server_config(&self) -> Result<ServerConfig, ConfigError> {
        let host: IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::InvalidHost(self.server.host.clone()))?;

        let mut server_config = ServerConfig::new(host.to_string(), self.server.port);
        if !self.server.graceful_shutdown {
            server_config = server_config.without_graceful_shutdown();
        }

        Ok(server_config)
    }

    /// Convert to the store's settings, rejecting zero durations.
    pub fn store_config(&self) -> Result<StoreConfig, ConfigError> {
        if self.session.ttl_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "session.ttl_secs",
                "must be greater than zero".into(),
            ));
        }

        let mut store_config = StoreConfig::from_secs(self.session.ttl_secs);
        match self.session.sweep_interval_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue(
                    "session.sweep_interval_secs",
                    "must be greater than zero".into(),
                ))
            }
            Some(secs) => {
                store_config = store_config.with_sweep_interval(Duration::from_secs(secs));
            }
            None => {}
        }

        Ok(store_config)
    }

    /// Build the configured token transport.
    pub fn transport(&self) -> Result<Arc<dyn TokenTransport>, ConfigError> {
        match self.session.transport {
            TransportKind::Bearer => Ok(Arc::new(BearerTransport::default())),
            TransportKind::Cookie => {
                let invalid = |e: SessionError| ConfigError::InvalidValue("session", e.to_string());

                let mut cookie = CookieTransport::new(self.session.cookie_name.clone())
                    .map_err(invalid)?
                    .with_path(self.session.cookie_path.clone())
                    .map_err(invalid)?
                    .secure(self.session.cookie_secure);

                if self.session.persistent_cookie {
                    cookie = cookie.with_max_age(Duration::from_secs(self.session.ttl_secs));
                }

                Ok(Arc::new(cookie))
            }
        }
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file.
    Io(std::io::Error),
    /// JSON parsing error.
    Json(serde_json::Error),
    /// Invalid host address.
    InvalidHost(String),
    /// A setting that parsed but cannot be used.
    InvalidValue(&'static str, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "failed to read config file: {}", e),
            Self::Json(e) => write!(f, "failed to parse config file: {}", e),
            Self::InvalidHost(host) => write!(f, "invalid host address: {}", host),
            Self::InvalidValue(field, reason) => write!(f, "invalid {}: {}", field, reason),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.ttl_secs, 1800);
        assert_eq!(config.session.transport, TransportKind::Cookie);
        assert_eq!(config.session.cookie_name, "session_id");
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "server": {
                "host": "0.0.0.0",
                "port": 8080
            },
            "session": {
                "ttl_secs": 60,
                "sweep_interval_secs": 5,
                "transport": "bearer"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.session.ttl_secs, 60);
        assert_eq!(config.session.sweep_interval_secs, Some(5));
        assert_eq!(config.session.transport, TransportKind::Bearer);
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{
            "session": {
                "cookie_name": "sid"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.server.port, 3000); // Default
        assert_eq!(config.session.ttl_secs, 1800); // Default
        assert_eq!(config.session.cookie_name, "sid");
    }

    #[test]
    fn test_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = Config::from_file(file.path());
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_apply_env() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("TTL_SESSION_PORT", "4000"),
            ("TTL_SESSION_TTL", "120"),
            ("TTL_SESSION_SWEEP_INTERVAL", "10"),
            ("TTL_SESSION_TRANSPORT", "bearer"),
            ("RUST_LOG", "debug"),
        ]));

        assert_eq!(config.server.port, 4000);
        assert_eq!(config.session.ttl_secs, 120);
        assert_eq!(config.session.sweep_interval_secs, Some(10));
        assert_eq!(config.session.transport, TransportKind::Bearer);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_apply_env_ignores_garbage() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("TTL_SESSION_PORT", "lots"),
            ("TTL_SESSION_TTL", "-1"),
            ("TTL_SESSION_TRANSPORT", "carrier-pigeon"),
        ]));

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.session.ttl_secs, 1800);
        assert_eq!(config.session.transport, TransportKind::Cookie);
    }

    #[test]
    fn test_log_level_env_priority() {
        let mut config = Config::default();
        config.apply_env_from(env(&[("TTL_SESSION_LOG_LEVEL", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.log_filter(), "warn");
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            host: Some("192.168.1.1".parse().unwrap()),
            port: Some(5000),
            ttl: Some(90),
            cookie_name: Some("sid".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.session.ttl_secs, 90);
        assert_eq!(config.session.cookie_name, "sid");
    }

    #[test]
    fn test_unset_args_keep_file_values() {
        let mut config = Config::default();
        config.server.port = 7000;
        config.apply_args(&Args::default());
        assert_eq!(config.server.port, 7000);
    }

    #[test]
    fn test_to_server_config() {
        let config = Config::default();
        let server_config = config.to_server_config().unwrap();

        assert_eq!(server_config.host, "127.0.0.1");
        assert_eq!(server_config.port, 3000);
        assert!(server_config.graceful_shutdown);
    }

    #[test]
    fn test_invalid_host() {
        let mut config = Config::default();
        config.server.host = "not-an-ip".to_string();

        let result = config.to_server_config();
        assert!(result.is_err());
    }

    #[test]
    fn test_store_config() {
        let mut config = Config::default();
        config.session.ttl_secs = 300;
        let store = config.store_config().unwrap();
        assert_eq!(store.ttl, Duration::from_secs(300));
        assert_eq!(store.effective_sweep_interval(), Duration::from_secs(300));

        config.session.sweep_interval_secs = Some(30);
        let store = config.store_config().unwrap();
        assert_eq!(store.effective_sweep_interval(), Duration::from_secs(30));
    }

    #[test]
    fn test_store_config_rejects_zero() {
        let mut config = Config::default();
        config.session.ttl_secs = 0;
        assert!(config.store_config().is_err());

        let mut config = Config::default();
        config.session.sweep_interval_secs = Some(0);
        assert!(config.store_config().is_err());
    }

    #[test]
    fn test_transport_cookie_max_age() {
        let mut config = Config::default();
        config.session.ttl_secs = 600;
        let transport = config.transport().unwrap();

        let id = crate::session::SessionId::generate(&crate::session::OsEntropy).unwrap();
        let header = transport.attach(&id).unwrap();
        assert!(header.to_str().unwrap().contains("Max-Age=600"));
    }

    #[test]
    fn test_transport_invalid_cookie_name() {
        let mut config = Config::default();
        config.session.cookie_name = "bad name".to_string();
        assert!(config.transport().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"ttl_secs\""));
        assert!(json.contains("\"transport\": \"cookie\""));
    }
}
