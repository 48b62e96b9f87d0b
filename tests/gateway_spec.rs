mod support;

use std::time::Duration;

use axum::{routing::post, Json, Router};
use serde_json::json;

use curriculum_wizard::api::{create_router, ProxyState};
use curriculum_wizard::error::ErrorCategory;
use curriculum_wizard::gateway::{
    CompletionBackend, CompletionRequest, GatewayClient, GatewayMode, RequestKind, RetryPolicy,
};
use support::{closed_url, spawn_router, spawn_upstream, Upstream};

fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(1))
}

fn request(prompt: &str) -> CompletionRequest {
    CompletionRequest {
        kind: RequestKind::GenerateObjectives,
        prompt: prompt.to_string(),
    }
}

/// A real proxy in front of the fake upstream, reached over HTTP.
async fn proxied() -> (Upstream, GatewayClient) {
    let upstream = spawn_upstream().await;
    let app = create_router(
        ProxyState {
            provider: upstream.provider(),
        },
        None,
    );
    let base = spawn_router(app).await;
    let client = GatewayClient::proxy(format!("{}/api/ai", base), None, fast_retry())
        .expect("gateway client builds");
    (upstream, client)
}

mod proxy_mode {
    use super::*;

    #[tokio::test]
    async fn returns_reply_text() {
        let (upstream, client) = proxied().await;

        let text = client.complete(&request("hello")).await.unwrap();

        assert_eq!(text, "echo: hello");
        assert_eq!(upstream.hits(), 1);
        assert!(matches!(client.mode(), GatewayMode::Proxy { .. }));
    }

    #[tokio::test]
    async fn auth_failure_is_not_retried() {
        let (upstream, client) = proxied().await;

        let err = client.complete(&request("trigger 401")).await.unwrap_err();

        assert_eq!(err.category, ErrorCategory::Permission);
        assert!(!err.retryable);
        assert!(err.message.contains("Authentication with AI service failed"));
        assert_eq!(upstream.hits(), 1);
    }

    #[tokio::test]
    async fn server_errors_are_retried_twice() {
        let (upstream, client) = proxied().await;

        let err = client.complete(&request("trigger 529")).await.unwrap_err();

        assert_eq!(err.category, ErrorCategory::Api);
        assert!(err.retryable);
        assert_eq!(upstream.hits(), 3);
        assert_eq!(err.context.get("attempts").map(String::as_str), Some("3"));
        assert_eq!(
            err.context.get("kind").map(String::as_str),
            Some("generate-objectives")
        );
    }

    #[tokio::test]
    async fn missing_response_field_is_a_data_error() {
        let app = Router::new().route(
            "/api/ai",
            post(|| async { Json(json!({ "type": "generate-objectives" })) }),
        );
        let base = spawn_router(app).await;
        let client = GatewayClient::proxy(format!("{}/api/ai", base), None, fast_retry()).unwrap();

        let err = client.complete(&request("hello")).await.unwrap_err();

        assert_eq!(err.category, ErrorCategory::Data);
        assert!(!err.retryable);
    }

    #[tokio::test]
    async fn unreachable_proxy_is_a_network_error_after_retries() {
        let client = GatewayClient::proxy(
            format!("{}/api/ai", closed_url().await),
            None,
            fast_retry(),
        )
        .unwrap();

        let err = client.complete(&request("hello")).await.unwrap_err();

        assert_eq!(err.category, ErrorCategory::Network);
        assert_eq!(err.context.get("attempts").map(String::as_str), Some("3"));
    }
}

mod direct_mode {
    use super::*;

    #[tokio::test]
    async fn calls_the_provider_without_a_proxy() {
        let upstream = spawn_upstream().await;
        let client = GatewayClient::direct(upstream.provider(), fast_retry());

        let text = client.complete(&request("hi")).await.unwrap();

        assert_eq!(text, "echo: hi");
        assert_eq!(client.mode(), GatewayMode::Direct);
    }

    #[tokio::test]
    async fn rate_limits_are_retried() {
        let upstream = spawn_upstream().await;
        let client = GatewayClient::direct(upstream.provider(), fast_retry());

        let err = client.complete(&request("trigger 429")).await.unwrap_err();

        assert!(err.retryable);
        assert_eq!(upstream.hits(), 3);
    }
}
