//! HTTP client for the upstream text-completion provider.
//!
//! Used by the proxy server (which holds the API key) and by the gateway's
//! direct-provider mode. Speaks the messages API: one user message in, the
//! concatenated text blocks of the reply out.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{AppError, ErrorCategory, ErrorSeverity};

pub const DEFAULT_PROVIDER_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_MAX_TOKENS: u32 = 2000;
const API_VERSION: &str = "2023-06-01";

/// Upstream provider errors, one variant per status the proxy reports.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider API key is not configured")]
    MissingApiKey,

    #[error("provider rejected the API key: {0}")]
    Unauthorized(String),

    #[error("provider refused the request: {0}")]
    Forbidden(String),

    #[error("provider rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("request to provider timed out: {0}")]
    Timeout(String),

    #[error("could not reach provider: {0}")]
    Network(String),

    #[error("provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("provider reply was malformed: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// HTTP status the proxy answers with for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::MissingApiKey | Self::Upstream { .. } | Self::Malformed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short label used as the `error` field of the proxy's failure body.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::MissingApiKey => "AI service is not configured",
            Self::Unauthorized(_) => "Authentication with AI service failed",
            Self::Forbidden(_) => "Access to AI service denied",
            Self::RateLimited(_) => "AI service rate limit exceeded",
            Self::Timeout(_) => "AI service timed out",
            Self::Network(_) => "Could not reach AI service",
            Self::Upstream { .. } => "AI service error",
            Self::Malformed(_) => "AI service returned an unreadable reply",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited(_) | Self::Timeout(_) | Self::Network(_) => true,
            Self::Upstream { status, .. } => *status >= 500,
            Self::MissingApiKey | Self::Unauthorized(_) | Self::Forbidden(_) | Self::Malformed(_) => {
                false
            }
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::Malformed(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        let message = e.to_string();
        match e {
            ProviderError::MissingApiKey => AppError::new(
                ErrorCategory::Permission,
                ErrorSeverity::High,
                message,
                false,
            ),
            ProviderError::Unauthorized(_) => AppError::from_status(401, message),
            ProviderError::Forbidden(_) => AppError::from_status(403, message),
            ProviderError::RateLimited(_) => AppError::from_status(429, message),
            ProviderError::Timeout(_) => AppError::timeout(message),
            ProviderError::Network(_) => AppError::network(message),
            ProviderError::Upstream { status, .. } => AppError::from_status(status, message),
            ProviderError::Malformed(_) => AppError::data(message),
        }
    }
}

/// Connection settings for the upstream provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL without the `/v1/messages` suffix.
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    /// Whole-request timeout. `None` leaves the transport unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: None,
        }
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Client for the provider's messages endpoint.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    config: ProviderConfig,
    client: Client,
}

impl ProviderClient {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Ok(Self { config, client })
    }

    pub fn has_api_key(&self) -> bool {
        self.config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty())
    }

    /// Send one prompt and return the reply text.
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;

        let url = format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'));
        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        tracing::debug!(model = %self.config.model, prompt_chars = prompt.len(), "calling provider");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => ProviderError::Unauthorized(body),
                StatusCode::FORBIDDEN => ProviderError::Forbidden(body),
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(body),
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    ProviderError::Timeout(body)
                }
                _ => ProviderError::Upstream {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let reply: MessagesResponse = response.json().await?;
        let text: String = reply
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");

        if text.trim().is_empty() {
            return Err(ProviderError::Malformed(
                "reply contained no text content".to_string(),
            ));
        }
        Ok(text)
    }
}
