//! Shared outbound HTTP gateway for provider calls.
//!
//! Two concerns live here, both scoped to this injected component rather
//! than process-wide state:
//!
//! - transport retries: network-level failures are retried with
//!   exponential backoff. Provider-level errors (any HTTP response) are
//!   never retried here - business operations get no automatic retry.
//! - failure suppression: when an endpoint has just failed, further
//!   calls to it inside a short window fail fast instead of hammering a
//!   broken dependency. A success clears the record.

use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;

const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE_MS: u64 = 200;
const SUPPRESSION_WINDOW: Duration = Duration::from_secs(30);
const SUPPRESSION_CAPACITY: u64 = 256;

/// Errors surfaced by the gateway itself.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The endpoint recently failed and is inside its suppression window.
    #[error("endpoint '{endpoint}' suspended after a recent failure")]
    Suppressed {
        /// The suppressed endpoint key.
        endpoint: String,
    },

    /// Transport failure after exhausting retries.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Injected outbound HTTP gateway shared by the provider clients.
#[derive(Clone)]
pub struct Gateway {
    client: reqwest::Client,
    recent_failures: Cache<String, ()>,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway {
    /// Creates a gateway with the default suppression window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_suppression_window(SUPPRESSION_WINDOW)
    }

    /// Creates a gateway with a custom suppression window.
    #[must_use]
    pub fn with_suppression_window(window: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            recent_failures: Cache::builder()
                .max_capacity(SUPPRESSION_CAPACITY)
                .time_to_live(window)
                .build(),
        }
    }

    /// Executes a provider request identified by `endpoint` (a stable
    /// `"{provider}:{method} {path}"` style key).
    ///
    /// The request builder closure is invoked once per attempt.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Suppressed` when the endpoint is inside
    /// its failure window, or `GatewayError::Http` after retries are
    /// exhausted. Any HTTP response - including provider error statuses -
    /// is returned to the caller for provider-specific mapping.
    pub async fn execute(
        &self,
        endpoint: &str,
        build: impl Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, GatewayError> {
        if self.recent_failures.get(endpoint).await.is_some() {
            tracing::warn!(endpoint, "suppressing call to recently failed endpoint");
            return Err(GatewayError::Suppressed {
                endpoint: endpoint.to_owned(),
            });
        }

        let mut last_error = None;
        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let backoff = Duration::from_millis(BACKOFF_BASE_MS << (attempt - 1));
                tokio::time::sleep(backoff).await;
            }

            match build(&self.client).send().await {
                Ok(response) => {
                    if response.status().is_server_error()
                        || response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS
                    {
                        self.record_failure(endpoint).await;
                    } else {
                        self.record_success(endpoint).await;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(endpoint, attempt, error = %e, "outbound request failed");
                    last_error = Some(e);
                }
            }
        }

        self.record_failure(endpoint).await;
        // last_error is always set when the loop exhausts its attempts
        Err(last_error.map_or_else(
            || GatewayError::Suppressed {
                endpoint: endpoint.to_owned(),
            },
            GatewayError::Http,
        ))
    }

    /// Records a failure for suppression purposes.
    pub async fn record_failure(&self, endpoint: &str) {
        self.recent_failures.insert(endpoint.to_owned(), ()).await;
    }

    /// Clears the failure record after a success.
    pub async fn record_success(&self, endpoint: &str) {
        self.recent_failures.invalidate(endpoint).await;
    }

    /// Whether the endpoint is currently suppressed.
    pub async fn is_suppressed(&self, endpoint: &str) -> bool {
        self.recent_failures.get(endpoint).await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recent_failure_suppresses_the_endpoint() {
        let gateway = Gateway::new();
        gateway.record_failure("ai:POST /v1/messages").await;

        let result = gateway
            .execute("ai:POST /v1/messages", |client| {
                client.post("http://127.0.0.1:1/unreachable")
            })
            .await;

        assert!(matches!(result, Err(GatewayError::Suppressed { .. })));
    }

    #[tokio::test]
    async fn success_clears_the_failure_record() {
        let gateway = Gateway::new();
        gateway.record_failure("wa:POST /messages").await;
        assert!(gateway.is_suppressed("wa:POST /messages").await);

        gateway.record_success("wa:POST /messages").await;
        assert!(!gateway.is_suppressed("wa:POST /messages").await);
    }

    #[tokio::test]
    async fn suppression_is_per_endpoint() {
        let gateway = Gateway::new();
        gateway.record_failure("ai:POST /v1/messages").await;
        assert!(!gateway.is_suppressed("image:POST /v1/images").await);
    }

    #[tokio::test]
    async fn suppression_expires_with_the_window() {
        let gateway = Gateway::with_suppression_window(Duration::from_millis(20));
        gateway.record_failure("ai:POST /v1/messages").await;
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!gateway.is_suppressed("ai:POST /v1/messages").await);
    }
}
