//! Configuration management for campus-bot.
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file (JSON)
//! 4. Default values

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Args;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bot platform connection.
    pub bot: BotSection,
    /// HTTP listener (webhook + notify endpoints).
    pub http: HttpSection,
    /// Logging configuration.
    pub logging: LoggingSection,
}

/// Bot platform connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSection {
    /// Bot API token.
    pub token: String,
    /// Bot API base URL.
    pub api_base: String,
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: "https://botapi.max.ru".to_string(),
        }
    }
}

/// HTTP listener section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Bearer token guarding the notify endpoints. Empty disables the
    /// guard; the webhook and health endpoints are always open.
    pub auth_token: String,
}

impl Default for HttpSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            auth_token: String::new(),
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
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(ConfigError::Json)
    }

    /// Apply environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var("CAMPUS_BOT_TOKEN") {
            if !token.is_empty() {
                self.bot.token = token;
            }
        }

        if let Ok(base) = std::env::var("CAMPUS_BOT_API_BASE") {
            if !base.is_empty() {
                self.bot.api_base = base;
            }
        }

        if let Ok(host) = std::env::var("CAMPUS_BOT_HOST") {
            self.http.host = host;
        }

        if let Ok(port) = std::env::var("CAMPUS_BOT_PORT") {
            if let Ok(port) = port.parse() {
                self.http.port = port;
            }
        }

        if let Ok(token) = std::env::var("CAMPUS_BOT_AUTH_TOKEN") {
            self.http.auth_token = token;
        }

        if let Ok(level) = std::env::var("CAMPUS_BOT_LOG_LEVEL") {
            self.logging.level = level;
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            self.logging.level = level;
        }
    }

    /// Apply CLI argument overrides.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(ref token) = args.token {
            self.bot.token = token.clone();
        }
        if let Some(ref base) = args.api_base {
            self.bot.api_base = base.clone();
        }
        if let Some(ref host) = args.host {
            self.http.host = host.clone();
        }
        if let Some(port) = args.port {
            self.http.port = port;
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

    /// Check that everything needed to talk to the platform is present.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.token.is_empty() {
            return Err(ConfigError::Missing("bot.token"));
        }
        if self.bot.api_base.is_empty() {
            return Err(ConfigError::Missing("bot.api_base"));
        }
        Ok(())
    }

    /// Get the log level filter string.
    pub fn log_filter(&self) -> &str {
        &self.logging.level
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Json(serde_json::Error),

    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 8080);
        assert!(config.bot.token.is_empty());
        assert!(!config.bot.api_base.is_empty());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"{
            "bot": {
                "token": "secret",
                "api_base": "https://api.example"
            },
            "http": {
                "host": "0.0.0.0",
                "port": 9090,
                "auth_token": "guard"
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.bot.token, "secret");
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.http.auth_token, "guard");
    }

    #[test]
    fn test_config_partial_json() {
        let json = r#"{
            "http": {
                "port": 9000
            }
        }"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.http.host, "127.0.0.1"); // Default
        assert_eq!(config.http.port, 9000);
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        let args = Args {
            token: Some("cli-token".to_string()),
            port: Some(5000),
            log_level: Some("debug".to_string()),
            ..Args::default()
        };

        config.apply_args(&args);

        assert_eq!(config.bot.token, "cli-token");
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_requires_token() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("bot.token"))
        ));

        let mut config = Config::default();
        config.bot.token = "t".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(json.contains("\"token\""));
        assert!(json.contains("\"port\""));
    }
}
