//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.calpal/config.json`) and environment.
//! Covers the backend base URL and the loopback address the OAuth redirect lands on.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend REST settings.
    #[serde(default)]
    pub backend: BackendConfig,

    /// OAuth callback listener settings.
    #[serde(default)]
    pub callback: CallbackConfig,
}

/// Backend REST surface location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL of the calPal backend (default "http://localhost:8000").
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
}

/// Loopback address the backend redirects the browser to after Google OAuth.
/// Must match the frontend URL the backend is configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackConfig {
    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_callback_bind")]
    pub bind: String,

    /// Port the redirect URL points at (default 5173).
    #[serde(default = "default_callback_port")]
    pub port: u16,
}

fn default_backend_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_callback_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_callback_port() -> u16 {
    5173
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
        }
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self {
            bind: default_callback_bind(),
            port: default_callback_port(),
        }
    }
}

/// Resolve the backend base URL: env CALPAL_BACKEND_URL overrides config.
pub fn resolve_backend_url(config: &Config) -> String {
    std::env::var("CALPAL_BACKEND_URL")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| config.backend.base_url.trim().to_string())
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CALPAL_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".calpal").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the default path (or CALPAL_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_and_callback() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.callback.bind, "127.0.0.1");
        assert_eq!(config.callback.port, 5173);
    }

    #[test]
    fn empty_json_gives_defaults() {
        let config: Config = serde_json::from_str("{}").expect("parse");
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.callback.port, 5173);
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"backend":{"baseUrl":"http://10.0.0.2:9000"}}"#)
                .expect("parse");
        assert_eq!(config.backend.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.callback.bind, "127.0.0.1");
    }
}
