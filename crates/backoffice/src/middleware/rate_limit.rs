//! Fixed-window rate limiting for `/api`.
//!
//! The limiter is an injected component owned by application state, not
//! a process-wide singleton. Counters live per caller key - the
//! authenticated user when a valid token is present, the client IP
//! otherwise - and reset opportunistically when a request arrives after
//! the window has expired. Process-local by design: it resets on restart
//! and is not shared across instances.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::RateLimitConfig;
use crate::error::AppError;
use crate::services::auth::TokenService;
use crate::state::AppState;

/// One caller's window.
struct Window {
    started: Instant,
    count: u32,
}

/// Injected fixed-window request counter.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<String, Window>>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Creates a limiter from configuration.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_secs),
        }
    }

    /// Records a request for `key`.
    ///
    /// # Errors
    ///
    /// Returns the seconds until the caller's window resets when the
    /// budget is exhausted.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<(), u64> {
        let mut windows = self
            .windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let window = windows.entry(key.to_owned()).or_insert(Window {
            started: now,
            count: 0,
        });

        // Opportunistic reset once the window has lapsed.
        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        window.count += 1;
        if window.count > self.max_requests {
            let elapsed = now.duration_since(window.started);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            return Err(retry_after);
        }

        Ok(())
    }
}

/// Axum middleware applying the limiter to every `/api` request.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = caller_key(&request, state.auth().tokens());

    if let Err(retry_after) = state.rate_limiter().check(&key) {
        tracing::warn!(caller = %key, retry_after, "rate limit exceeded");
        return AppError::RateLimited { retry_after }.into_response();
    }

    next.run(request).await
}

/// Caller identity for limiting: user ID from a valid bearer token,
/// otherwise the client IP from proxy headers.
fn caller_key(request: &Request, tokens: &TokenService) -> String {
    if let Some(claims) = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(TokenService::extract_bearer)
        .and_then(|token| tokens.validate(token).ok())
    {
        return format!("user:{}", claims.sub);
    }

    let ip = ["x-forwarded-for", "x-real-ip", "fly-client-ip"]
        .iter()
        .find_map(|header| {
            request
                .headers()
                .get(*header)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(',').next())
                .map(|value| value.trim().to_owned())
        })
        .unwrap_or_else(|| "unknown".to_owned());

    format!("ip:{ip}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, window_secs: u64) -> RateLimiter {
        RateLimiter::new(RateLimitConfig {
            max_requests,
            window_secs,
        })
    }

    #[test]
    fn sixty_first_request_in_the_window_is_rejected() {
        let limiter = limiter(60, 60);
        let now = Instant::now();

        for _ in 0..60 {
            assert!(limiter.check_at("user:agent-1", now).is_ok());
        }

        let retry_after = limiter
            .check_at("user:agent-1", now)
            .expect_err("61st request should be limited");
        assert!(retry_after >= 1);
        assert!(retry_after <= 60);
    }

    #[test]
    fn windows_are_per_caller() {
        let limiter = limiter(2, 60);
        let now = Instant::now();

        assert!(limiter.check_at("user:a", now).is_ok());
        assert!(limiter.check_at("user:a", now).is_ok());
        assert!(limiter.check_at("user:a", now).is_err());

        // A different caller still has a fresh budget.
        assert!(limiter.check_at("user:b", now).is_ok());
    }

    #[test]
    fn window_resets_opportunistically_after_expiry() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert!(limiter.check_at("ip:10.0.0.1", start).is_ok());
        assert!(limiter.check_at("ip:10.0.0.1", start).is_ok());
        assert!(limiter.check_at("ip:10.0.0.1", start).is_err());

        let later = start + Duration::from_secs(61);
        assert!(limiter.check_at("ip:10.0.0.1", later).is_ok());
    }

    #[test]
    fn retry_after_reflects_remaining_window() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(limiter.check_at("user:x", start).is_ok());
        let retry_after = limiter
            .check_at("user:x", start + Duration::from_secs(45))
            .expect_err("over budget");
        assert_eq!(retry_after, 15);
    }
}
