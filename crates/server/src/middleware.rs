//! Request filtering and per-IP rate limiting.
//!
//! The public surface is small and attracts scanner noise, so paths outside
//! the API are rejected outright before any handler runs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tokio::sync::RwLock;
use tracing::warn;

/// Path fragments that only ever show up in exploit scans.
const BLOCKED_PATTERNS: &[&str] = &[".php", ".aspx", "/wp-", "/admin", "/config", "/log", "/radio"];

/// Everything the service actually serves.
const ALLOWED_PREFIXES: &[&str] = &["/api", "/health"];

/// Sliding-window request counter keyed by client IP.
#[derive(Clone)]
pub struct RateLimiter {
    requests: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    window: Duration,
    limit: u32,
}

impl RateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        Self {
            requests: Arc::new(RwLock::new(HashMap::new())),
            window: Duration::from_secs(60),
            limit,
        }
    }

    /// Drops timestamps outside the window, then admits the request only if
    /// the window still has room.
    pub async fn allow(&self, key: &str) -> bool {
        let mut requests = self.requests.write().await;
        let entry = requests.entry(key.to_string()).or_default();

        let now = Instant::now();
        let window_start = now - self.window;
        entry.retain(|&t| t > window_start);

        if entry.len() >= self.limit as usize {
            return false;
        }
        entry.push(now);
        true
    }
}

pub async fn filter_and_limit(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    for pattern in BLOCKED_PATTERNS {
        if path.contains(pattern) {
            warn!(event_name = "http.path_filter.blocked", path = %path, "suspicious path rejected");
            return (StatusCode::FORBIDDEN, "Forbidden: suspicious path").into_response();
        }
    }
    if !ALLOWED_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return (StatusCode::FORBIDDEN, "Forbidden: path not allowed").into_response();
    }

    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if !limiter.allow(&client_ip).await {
        warn!(event_name = "http.rate_limit.exceeded", client_ip = %client_ip, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests: rate limit exceeded")
            .into_response();
    }

    next.run(request).await
}
