use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::types::{CompletionPayload, CompletionReply, ProxyErrorBody};
use crate::provider::ProviderClient;

/// Shared state for the proxy routes.
#[derive(Clone)]
pub struct ProxyState {
    pub provider: ProviderClient,
}

// ============================================================
// Error Handling
// ============================================================

/// Build the structured failure body. The provider key never appears in
/// `details`; upstream bodies are passed through for debugging.
pub(crate) fn error_response(
    status: StatusCode,
    error: &str,
    details: Option<String>,
    retryable: bool,
) -> Response {
    (status, Json(ProxyErrorBody::new(error, details, retryable))).into_response()
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Completion proxy
// ============================================================

/// CORS preflight. Headers are added by the CORS middleware.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn complete(
    State(state): State<ProxyState>,
    payload: Result<Json<CompletionPayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            tracing::warn!("Rejected proxy request body: {}", rejection.body_text());
            return error_response(
                StatusCode::BAD_REQUEST,
                "Invalid request body",
                Some(rejection.body_text()),
                false,
            );
        }
    };

    if payload.prompt.trim().is_empty() {
        tracing::warn!(kind = %payload.kind, "Proxy request without a prompt");
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required", None, false);
    }

    tracing::info!(
        kind = %payload.kind,
        prompt_chars = payload.prompt.len(),
        "Forwarding completion request"
    );

    match state.provider.complete(&payload.prompt).await {
        Ok(response) => Json(CompletionReply {
            response,
            kind: payload.kind,
        })
        .into_response(),
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(kind = %payload.kind, status = status.as_u16(), "Provider call failed: {}", e);
            } else {
                tracing::warn!(kind = %payload.kind, status = status.as_u16(), "Provider call failed: {}", e);
            }
            error_response(status, e.summary(), Some(e.to_string()), e.is_retryable())
        }
    }
}
