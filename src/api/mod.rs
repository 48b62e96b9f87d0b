//! The completion proxy: holds the provider key and forwards prompts.

mod handlers;
mod middleware;
mod types;

pub use handlers::ProxyState;
pub use middleware::RateLimiter;
pub use types::*;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the proxy router.
///
/// `POST /api/ai` forwards a prompt, `OPTIONS /api/ai` answers preflight,
/// any other method gets 405. Rate limiting, when enabled, applies to the
/// `POST` route only.
pub fn create_router(state: ProxyState, rate_limiter: Option<RateLimiter>) -> Router {
    let mut complete = post(handlers::complete);
    if let Some(limiter) = rate_limiter {
        complete = complete.route_layer(from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    Router::new()
        .route("/api/ai", complete.options(handlers::preflight))
        .route("/health", get(handlers::health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(middleware::cors_headers)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderClient, ProviderConfig};
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use tower::ServiceExt;

    fn router() -> Router {
        let provider = ProviderClient::new(ProviderConfig::default()).unwrap();
        create_router(ProxyState { provider }, None)
    }

    #[tokio::test]
    async fn unknown_method_is_rejected_with_cors_headers() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/ai")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            response.headers()["access-control-allow-methods"],
            "POST, OPTIONS"
        );
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let request = Request::builder()
            .uri("/api/other")
            .body(Body::empty())
            .unwrap();

        let response = router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
