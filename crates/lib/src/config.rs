//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.nexachat/config.json`) and environment.
//! Kept minimal: gateway bind/port, provider credentials, and session storage settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Upstream provider settings (API key, model).
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Session storage and pacing settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Gateway bind and port settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the HTTP relay (default 5000).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Upstream text-generation provider settings. The key is server-held and
/// never travels past the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Gemini API key. Overridden by GEMINI_API_KEY env when set.
    pub api_key: Option<String>,

    /// Model id passed to generateContent (default "gemini-2.0-flash-001").
    pub model: Option<String>,

    /// Override the provider base URL (tests point this at a stub server).
    pub base_url: Option<String>,
}

/// Session storage and reply pacing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Directory for persisted session state (default ~/.nexachat/state).
    pub state_dir: Option<PathBuf>,

    /// Milliseconds to hold a reply back after the gateway resolves (default 1500).
    pub reply_delay_ms: Option<u64>,
}

const DEFAULT_MODEL: &str = "gemini-2.0-flash-001";
const DEFAULT_REPLY_DELAY_MS: u64 = 1500;

/// Resolve the provider API key: env GEMINI_API_KEY overrides config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    std::env::var("GEMINI_API_KEY")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .provider
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve the model id from config, falling back to the default.
pub fn resolve_model(config: &Config) -> String {
    config
        .provider
        .model
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Resolve the reveal delay applied after the gateway call resolves.
pub fn resolve_reply_delay(config: &Config) -> Duration {
    Duration::from_millis(
        config
            .session
            .reply_delay_ms
            .unwrap_or(DEFAULT_REPLY_DELAY_MS),
    )
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("NEXACHAT_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".nexachat").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Resolve the directory for persisted session state.
pub fn resolve_state_dir(config: &Config) -> PathBuf {
    config.session.state_dir.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".nexachat").join("state"))
            .unwrap_or_else(|| PathBuf::from("state"))
    })
}

/// Load config from the default path (or NEXACHAT_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used (for resolving the config directory).
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
