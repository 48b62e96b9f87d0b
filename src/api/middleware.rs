//! CORS headers and per-IP rate limiting for the proxy.

use axum::{
    body::Body,
    extract::State,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Request, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use std::{
    collections::{HashMap, VecDeque},
    net::{IpAddr, Ipv4Addr},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

use super::handlers::error_response;

/// Add the proxy's CORS headers to every response, errors included.
pub async fn cors_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    response
}

/// Per-client request budget over a sliding window, keyed by IP.
#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    seen: Arc<Mutex<HashMap<IpAddr, VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            seen: Arc::default(),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, VecDeque<Instant>>> {
        // Only timestamps live here, so a poisoned map is still consistent.
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, stamps: &mut VecDeque<Instant>, now: Instant) {
        while stamps
            .front()
            .is_some_and(|&t| now.duration_since(t) >= self.window)
        {
            stamps.pop_front();
        }
    }

    /// Record a request from `client`. False once its budget is spent.
    pub fn check(&self, client: IpAddr) -> bool {
        let now = Instant::now();
        let mut seen = self.lock();
        let stamps = seen.entry(client).or_default();
        self.expire(stamps, now);

        let allowed = stamps.len() < self.limit as usize;
        if allowed {
            stamps.push_back(now);
        }
        allowed
    }

    /// Forget clients with nothing left inside the window.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let mut seen = self.lock();
        seen.retain(|_, stamps| {
            self.expire(stamps, now);
            !stamps.is_empty()
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }
}

/// Reject completion requests from clients over their budget.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let client = client_ip(&request);
    if limiter.check(client) {
        return next.run(request).await;
    }

    tracing::warn!(%client, "completion rate limit exceeded");
    error_response(
        StatusCode::TOO_MANY_REQUESTS,
        "Too many requests",
        Some(format!(
            "limit is {} requests per {} seconds",
            limiter.limit,
            limiter.window.as_secs()
        )),
        true,
    )
}

fn header_ip(request: &Request<Body>, name: &str) -> Option<IpAddr> {
    let value = request.headers().get(name)?.to_str().ok()?;
    value.split(',').next()?.trim().parse().ok()
}

/// The first forwarded address, then `X-Real-IP`, then loopback.
fn client_ip(request: &Request<Body>) -> IpAddr {
    header_ip(request, "x-forwarded-for")
        .or_else(|| header_ip(request, "x-real-ip"))
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
