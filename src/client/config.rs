//! Client Configuration
//!
//! Server URL and bearer token, persisted as TOML in the platform
//! config directory so a restarted client stays signed in.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default server URL
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the messaging server
    pub server_url: String,
    /// Bearer token minted by the identity provider
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let server_url =
            std::env::var("CLIENT_API_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
        Self {
            server_url,
            token: None,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for an explicit server URL
    pub fn with_server_url(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: None,
        }
    }

    /// Set the bearer token
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Get the bearer token
    pub fn get_token(&self) -> Option<&String> {
        self.token.as_ref()
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), path)
    }

    /// Platform-specific config file path
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
        path.push("gamefolio");
        path.push("client.toml");
        path
    }

    /// Load persisted configuration, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        match std::fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("[Client] Malformed config at {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist configuration to disk
    pub fn save(&self) -> std::io::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        std::fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_joins_cleanly() {
        let config = Config::with_server_url("http://localhost:3000/");
        assert_eq!(
            config.api_url("/api/chat/conversations"),
            "http://localhost:3000/api/chat/conversations"
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::with_server_url("https://chat.gamefolio.gg");
        config.set_token(Some("token-123".to_string()));

        let serialized = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(back.server_url, config.server_url);
        assert_eq!(back.token, config.token);
    }
}
