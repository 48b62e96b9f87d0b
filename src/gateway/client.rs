use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use super::{with_retry, CompletionBackend, CompletionRequest, RetryPolicy};
use crate::api::{CompletionPayload, ProxyErrorBody};
use crate::config::{ConfigError, GatewayConfig};
use crate::error::AppError;
use crate::provider::ProviderClient;

/// How the gateway reaches the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayMode {
    /// Through the same-origin proxy, which holds the API key.
    Proxy { url: String },
    /// Straight to the provider with a user-supplied key.
    Direct,
}

/// Pick the transport for a configuration.
///
/// An explicitly provided key always selects direct mode. Otherwise the proxy
/// is used, unless there is none or its host is one where the proxy is known
/// to be missing. Those cases go direct when any provider key is available.
pub fn select_mode(config: &GatewayConfig) -> Result<GatewayMode, ConfigError> {
    if config.explicit_key().is_some() {
        return Ok(GatewayMode::Direct);
    }
    let has_key = config.available_key().is_some();

    let Some(url) = config.proxy_url.as_deref() else {
        return if has_key {
            Ok(GatewayMode::Direct)
        } else {
            Err(ConfigError::NoTransport)
        };
    };
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let host = parsed.host_str().unwrap_or_default().to_lowercase();

    if config
        .direct_hosts
        .iter()
        .any(|h| h.eq_ignore_ascii_case(&host))
    {
        if has_key {
            tracing::debug!(%host, "proxy unavailable on host, calling the provider directly");
            return Ok(GatewayMode::Direct);
        }
        return Err(ConfigError::ProxyUnavailable { host });
    }

    Ok(GatewayMode::Proxy {
        url: url.to_string(),
    })
}

#[derive(Debug, Clone)]
enum Transport {
    Proxy { url: String, http: Client },
    Direct(ProviderClient),
}

#[derive(Deserialize)]
struct ProxyReply {
    #[serde(default)]
    response: Option<String>,
}

/// Production [`CompletionBackend`]: one transport plus a retry policy.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    transport: Transport,
    retry: RetryPolicy,
}

impl GatewayClient {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let retry = RetryPolicy::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        );

        match select_mode(config)? {
            GatewayMode::Proxy { url } => Self::proxy(url, config.request_timeout_secs, retry),
            GatewayMode::Direct => {
                let provider = ProviderClient::new(config.provider_config())
                    .map_err(|e| ConfigError::Client(e.to_string()))?;
                Ok(Self::direct(provider, retry))
            }
        }
    }

    pub fn proxy(
        url: impl Into<String>,
        timeout_secs: Option<u64>,
        retry: RetryPolicy,
    ) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            transport: Transport::Proxy {
                url: url.into(),
                http,
            },
            retry,
        })
    }

    pub fn direct(provider: ProviderClient, retry: RetryPolicy) -> Self {
        Self {
            transport: Transport::Direct(provider),
            retry,
        }
    }

    pub fn mode(&self) -> GatewayMode {
        match &self.transport {
            Transport::Proxy { url, .. } => GatewayMode::Proxy { url: url.clone() },
            Transport::Direct(_) => GatewayMode::Direct,
        }
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, AppError> {
        match &self.transport {
            Transport::Direct(provider) => Ok(provider.complete(&request.prompt).await?),
            Transport::Proxy { url, http } => {
                let response = http
                    .post(url)
                    .json(&CompletionPayload {
                        prompt: request.prompt.clone(),
                        kind: request.kind.as_str().to_string(),
                    })
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    let message = match serde_json::from_str::<ProxyErrorBody>(&body) {
                        Ok(ProxyErrorBody {
                            error,
                            details: Some(details),
                            ..
                        }) => format!("{}: {}", error, details),
                        Ok(parsed) => parsed.error,
                        Err(_) if body.trim().is_empty() => format!("proxy returned {}", status),
                        Err(_) => body,
                    };
                    return Err(AppError::from_status(status.as_u16(), message));
                }

                let reply: ProxyReply = response.json().await?;
                reply
                    .response
                    .filter(|text| !text.trim().is_empty())
                    .ok_or_else(|| AppError::data("AI reply contained no response text"))
            }
        }
    }
}

#[async_trait]
impl CompletionBackend for GatewayClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AppError> {
        tracing::info!(kind = request.kind.as_str(), mode = ?self.mode(), "sending AI request");
        with_retry(self.retry, move || self.send_once(request))
            .await
            .map_err(|e| e.with_context("kind", request.kind.as_str()))
    }
}
