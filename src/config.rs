//! Configuration for the proxy server and the wizard's AI gateway.
//!
//! The proxy is configured from environment variables only, so the provider
//! key never has to be written to disk. The gateway reads an optional JSON
//! file from the user's config directory, then applies environment overrides.
//!
//! Environment variables:
//! - `CWIZ_PROVIDER_API_KEY` (falls back to `ANTHROPIC_API_KEY`) - provider key held by the proxy
//! - `CWIZ_PROVIDER_URL` - provider base URL
//! - `CWIZ_MODEL` - provider model name
//! - `CWIZ_MAX_TOKENS` - reply token limit
//! - `CWIZ_RATE_LIMIT` - proxy requests per minute per client IP
//! - `CWIZ_PROXY_URL` - gateway: URL of the completion proxy
//! - `CWIZ_API_KEY` - gateway: user-supplied key, selects direct-provider mode
//!
//! The gateway also reads the provider key variables. That key is only used
//! when the proxy is missing or known to be unavailable on the configured host.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gateway::prompts::ResponseFormat;
use crate::provider::{ProviderConfig, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PROVIDER_URL};

const APP_NAME: &str = "curriculum-wizard";
const CONFIG_FILE: &str = "config.json";

/// Default gateway endpoint when the proxy runs locally.
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:8787/api/ai";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid proxy URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("the proxy is not available on host {host:?} and no API key was provided")]
    ProxyUnavailable { host: String },

    #[error("no proxy URL or API key configured")]
    NoTransport,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Provider key from the environment, as held by the proxy.
fn env_provider_key() -> Option<String> {
    env_string("CWIZ_PROVIDER_API_KEY").or_else(|| env_string("ANTHROPIC_API_KEY"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|v| v.trim().parse().ok())
}

/// Server-side proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub provider: ProviderConfig,
    /// Requests per minute per client IP. `None` disables rate limiting.
    pub rate_limit: Option<u32>,
}

impl ProxyConfig {
    /// Load proxy configuration from environment variables.
    pub fn from_env() -> Self {
        let provider = ProviderConfig {
            base_url: env_string("CWIZ_PROVIDER_URL")
                .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string()),
            api_key: env_provider_key(),
            model: env_string("CWIZ_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: env_parse("CWIZ_MAX_TOKENS").unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: env_parse("CWIZ_PROVIDER_TIMEOUT_SECS"),
        };

        Self {
            provider,
            rate_limit: env_parse("CWIZ_RATE_LIMIT"),
        }
    }
}

/// Client-side gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Same-origin completion proxy. `None` means no proxy is deployed.
    pub proxy_url: Option<String>,
    /// User-supplied provider key. When set, the provider is called directly.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Provider key found in the environment. Only used when no proxy can be.
    #[serde(skip)]
    pub provider_key: Option<String>,
    /// Hosts on which the proxy is known not to be deployed.
    pub direct_hosts: Vec<String>,
    /// Provider settings used in direct mode.
    pub provider_url: String,
    pub model: String,
    pub max_tokens: u32,
    /// Additional attempts after the first for retryable failures.
    pub max_retries: u32,
    /// Retry delay is `attempt * retry_base_delay_ms`.
    pub retry_base_delay_ms: u64,
    pub request_timeout_secs: Option<u64>,
    /// Reply shape requested for assessment generation.
    pub assessment_format: ResponseFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            api_key: None,
            provider_key: None,
            direct_hosts: Vec::new(),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_retries: 2,
            retry_base_delay_ms: 1000,
            request_timeout_secs: None,
            assessment_format: ResponseFormat::Json,
        }
    }
}

impl GatewayConfig {
    /// Load from the user's config directory, then apply environment overrides.
    /// Falls back to defaults if the file is missing or fails to parse.
    pub fn load() -> Self {
        let config = match config_path().and_then(|p| Self::load_from(&p)) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to load gateway config, using defaults: {:#}", e);
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    /// Load from an explicit path. A missing file yields defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_string("CWIZ_PROXY_URL") {
            self.proxy_url = Some(url);
        }
        if let Some(key) = env_string("CWIZ_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(key) = env_provider_key() {
            self.provider_key = Some(key);
        }
        self
    }

    /// The user-supplied key, if one was given explicitly.
    pub fn explicit_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Any key that lets the gateway call the provider itself.
    pub fn available_key(&self) -> Option<&str> {
        self.explicit_key().or_else(|| {
            self.provider_key
                .as_deref()
                .filter(|k| !k.trim().is_empty())
        })
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.provider_url.clone(),
            api_key: self.available_key().map(str::to_string),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            timeout_secs: self.request_timeout_secs,
        }
    }
}

fn config_path() -> anyhow::Result<PathBuf> {
    let mut path =
        dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
    path.push(APP_NAME);
    path.push(CONFIG_FILE);
    Ok(path)
}
