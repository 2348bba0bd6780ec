//! Rate limiting middleware.
//!
//! In-memory, per-client sliding window. Each client key keeps the instants
//! of its recently admitted requests; up to `burst` requests are admitted
//! freely, after which a request is admitted only when the oldest tracked
//! request is at least one `window` old.

use crate::config::RateLimitConfig;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header::RETRY_AFTER, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use parking_lot::Mutex;
use quill_shared::types::ErrorResponse;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// Key used when the peer address is unavailable
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Shared rate limiter; clones share the same client table.
#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    burst: u32,
    clients: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, burst: u32) -> Self {
        Self {
            window,
            burst,
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.window(), config.burst)
    }

    /// Admit or reject a request from `key`, recording it when admitted
    pub fn allow(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()) == RateLimitDecision::Allowed
    }

    /// Same as [`allow`](Self::allow) with an explicit clock reading
    pub fn check_at(&self, key: &str, now: Instant) -> RateLimitDecision {
        let horizon = self.window * self.burst;
        let mut clients = self.clients.lock();
        let requests = clients.entry(key.to_string()).or_default();

        // Stale entries are pruned against window * burst, not window
        requests.retain(|t| now.saturating_duration_since(*t) <= horizon);

        if requests.len() < self.burst as usize {
            requests.push_back(now);
            return RateLimitDecision::Allowed;
        }

        match requests.front().copied() {
            Some(oldest) if now.saturating_duration_since(oldest) >= self.window => {
                requests.pop_front();
                requests.push_back(now);
                RateLimitDecision::Allowed
            }
            Some(oldest) => RateLimitDecision::Limited {
                retry_after: self.window - now.saturating_duration_since(oldest),
            },
            None => RateLimitDecision::Limited {
                retry_after: self.window,
            },
        }
    }

    /// Number of client keys currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }

    /// Drop clients with no request inside the prune horizon.
    pub fn cleanup(&self) {
        let now = Instant::now();
        let horizon = self.window * self.burst;
        self.clients.lock().retain(|_, requests| {
            requests
                .back()
                .is_some_and(|t| now.saturating_duration_since(*t) <= horizon)
        });
    }
}

/// Client key for a request: the peer `ip:port`
pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

/// Rate limiting middleware function.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiter>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match limiter.check_at(&key, Instant::now()) {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { retry_after } => {
            warn!(
                client = %key,
                retry_after_ms = retry_after.as_millis() as u64,
                "Rate limit exceeded"
            );

            let retry_after_secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            (
                StatusCode::TOO_MANY_REQUESTS,
                [(RETRY_AFTER, retry_after_secs.to_string())],
                Json(ErrorResponse {
                    error: "rate limit exceeded".to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_burst_then_reject_then_recover() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 2);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("c", t0), RateLimitDecision::Allowed);
        assert_eq!(limiter.check_at("c", t0 + ms(10)), RateLimitDecision::Allowed);
        assert!(matches!(
            limiter.check_at("c", t0 + ms(20)),
            RateLimitDecision::Limited { .. }
        ));
        assert_eq!(limiter.check_at("c", t0 + ms(1000)), RateLimitDecision::Allowed);
    }

    #[test]
    fn test_rejection_is_not_recorded() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 1);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("c", t0), RateLimitDecision::Allowed);
        for i in 1..10 {
            assert!(matches!(
                limiter.check_at("c", t0 + ms(i * 50)),
                RateLimitDecision::Limited { .. }
            ));
        }
        // Only the first admission counts against the window
        assert_eq!(limiter.check_at("c", t0 + ms(1000)), RateLimitDecision::Allowed);
    }

    #[test]
    fn test_retry_after_counts_down_from_oldest() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 1);
        let t0 = Instant::now();

        limiter.check_at("c", t0);
        assert_eq!(
            limiter.check_at("c", t0 + ms(300)),
            RateLimitDecision::Limited { retry_after: ms(700) }
        );
    }

    #[test]
    fn test_clients_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 1);
        let t0 = Instant::now();

        assert_eq!(limiter.check_at("a", t0), RateLimitDecision::Allowed);
        assert_eq!(limiter.check_at("b", t0), RateLimitDecision::Allowed);
        assert!(matches!(limiter.check_at("a", t0), RateLimitDecision::Limited { .. }));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_entries_pruned_after_horizon() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 2);
        let t0 = Instant::now();

        limiter.check_at("c", t0);
        limiter.check_at("c", t0);
        // Past window * burst both entries are gone, so a full burst is available again
        let later = t0 + ms(2001);
        assert_eq!(limiter.check_at("c", later), RateLimitDecision::Allowed);
        assert_eq!(limiter.check_at("c", later), RateLimitDecision::Allowed);
        assert!(matches!(limiter.check_at("c", later), RateLimitDecision::Limited { .. }));
    }

    #[test]
    fn test_zero_burst_rejects_everything() {
        let limiter = RateLimiter::new(Duration::from_secs(1), 0);
        assert!(!limiter.allow("c"));
    }

    #[test]
    fn test_allow_uses_wall_clock() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        assert!(limiter.allow("c"));
        assert!(limiter.allow("c"));
        assert!(!limiter.allow("c"));
    }

    #[test]
    fn test_cleanup_keeps_recent_clients() {
        let limiter = RateLimiter::new(Duration::from_secs(60), 2);
        limiter.allow("recent");
        limiter.cleanup();
        assert_eq!(limiter.tracked_clients(), 1);
    }
}
