/// Per-client request limiter applied at the edge
use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Idle client entries are dropped once the table grows past this size
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimiter {
    /// `max_requests` per `window_ms`, all of them usable as one burst
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = Duration::from_millis(config.window_ms);
        let period = (window / config.max_requests.get()).max(Duration::from_nanos(1));
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(config.max_requests))
            .allow_burst(config.max_requests);

        Self {
            inner: Arc::new(governor::RateLimiter::keyed(quota)),
        }
    }

    /// Count one request for `client`; `Err` carries the wait until the next one is allowed
    pub fn check(&self, client: IpAddr) -> Result<(), Duration> {
        if self.inner.len() > SWEEP_THRESHOLD {
            self.inner.retain_recent();
        }

        self.inner
            .check_key(&client)
            .map_err(|not_until| not_until.wait_time_from(governor::clock::DefaultClock::default().now()))
    }
}

/// axum middleware keyed by peer address
pub async fn rate_limit(State(limiter): State<RateLimiter>, req: Request, next: Next) -> Response {
    // Requests without connect info share one bucket
    let client = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    match limiter.check(client) {
        Ok(()) => next.run(req).await,
        Err(retry_after) => {
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            warn!(client = %client, retry_after_secs = secs, "rate limit exceeded");

            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "success": false,
                    "error": "Too many requests from this IP, please try again later.",
                    "retryAfter": secs,
                })),
            )
                .into_response();
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
            response
        }
    }
}
