use serde::{Deserialize, Serialize};

/// Body of `POST /api/ai`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CompletionPayload {
    #[serde(default)]
    pub prompt: String,
    /// Wizard stage the prompt belongs to, echoed back in the reply.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Successful proxy reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionReply {
    pub response: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Failure body for every non-2xx proxy response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl ProxyErrorBody {
    pub fn new(error: impl Into<String>, details: Option<String>, retryable: bool) -> Self {
        Self {
            error: error.into(),
            details,
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
            retryable: Some(retryable),
        }
    }
}
