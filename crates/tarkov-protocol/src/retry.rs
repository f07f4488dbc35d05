//! Retry policy for connection-level transport failures
//!
//! The backend mutates state on most endpoints (trades, purchases, item
//! moves), so only failures where the request provably never left the client
//! are retried. See [`ProtocolError::should_retry`](crate::ProtocolError::should_retry).

use rand::RngExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum retry attempts after the first try (0 disables retries)
    pub max_attempts: u32,

    /// Initial backoff duration
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,

    /// Backoff multiplier
    pub multiplier: f64,

    /// Add up to 30% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 0,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self::default()
    }

    /// Create retry policy from environment variables
    ///
    /// Reads `TARKOV_MAX_RETRIES`, `TARKOV_RETRY_BACKOFF` (milliseconds) and
    /// `TARKOV_MAX_BACKOFF` (seconds). Unparseable values fall back to the
    /// defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: env_parse("TARKOV_MAX_RETRIES").unwrap_or(defaults.max_attempts),
            initial_backoff: env_parse("TARKOV_RETRY_BACKOFF")
                .map_or(defaults.initial_backoff, Duration::from_millis),
            max_backoff: env_parse("TARKOV_MAX_BACKOFF")
                .map_or(defaults.max_backoff, Duration::from_secs),
            ..defaults
        }
    }

    /// Execute a function with retry logic
    pub async fn execute<F, Fut, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        let mut backoff = self.initial_backoff;

        loop {
            match f().await {
                Ok(result) => return Ok(result),
                Err(e) if !e.should_retry() || attempt >= self.max_attempts => {
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    tracing::warn!("Attempt {} failed: {}", attempt, e);

                    let mut delay = backoff;
                    if self.jitter {
                        let jitter = rand::rng().random_range(0.0..0.3);
                        let jitter_ms = (delay.as_millis() as f64 * jitter) as u64;
                        delay += Duration::from_millis(jitter_ms);
                    }

                    tokio::time::sleep(delay).await;

                    backoff = Duration::from_secs_f64(
                        (backoff.as_secs_f64() * self.multiplier)
                            .min(self.max_backoff.as_secs_f64()),
                    );
                }
            }
        }
    }
}

pub(crate) fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.parse().ok())
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::significant_drop_tightening
)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_secs(1),
            multiplier: 2.0,
            jitter: false,
        }
    }

    #[test]
    fn test_default_policy_never_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 0);
        assert_eq!(policy, RetryPolicy::none());
    }

    #[tokio::test]
    async fn test_default_policy_gives_up_immediately() {
        let call_count = Arc::new(Mutex::new(0));
        let call_count_clone = Arc::clone(&call_count);

        let result = RetryPolicy::default()
            .execute(|| async {
                *call_count_clone.lock().expect("Operation should succeed") += 1;
                Err::<(), ProtocolError>(ProtocolError::Connect("refused".into()))
            })
            .await;

        assert!(matches!(result, Err(ProtocolError::Connect(_))));
        assert_eq!(*call_count.lock().expect("Operation should succeed"), 1);
    }

    #[tokio::test]
    async fn test_execute_retry_on_connect_error() {
        let call_count = Arc::new(Mutex::new(0));
        let call_count_clone = Arc::clone(&call_count);

        let start = Instant::now();
        let result = fast_policy(3)
            .execute(|| async {
                let mut count = call_count_clone.lock().expect("Operation should succeed");
                *count += 1;
                if *count < 3 {
                    Err(ProtocolError::Connect("refused".into()))
                } else {
                    Ok::<i32, ProtocolError>(42)
                }
            })
            .await;

        assert_eq!(result.expect("Operation should succeed"), 42);
        assert_eq!(*call_count.lock().expect("Operation should succeed"), 3);
        assert!(start.elapsed() >= Duration::from_millis(2));
    }

    #[tokio::test]
    async fn test_status_errors_are_not_retried() {
        let call_count = Arc::new(Mutex::new(0));
        let call_count_clone = Arc::clone(&call_count);

        let result = fast_policy(3)
            .execute(|| async {
                *call_count_clone.lock().expect("Operation should succeed") += 1;
                Err::<i32, ProtocolError>(ProtocolError::HttpStatus(
                    reqwest::StatusCode::BAD_GATEWAY,
                ))
            })
            .await;

        assert!(matches!(result, Err(ProtocolError::HttpStatus(_))));
        assert_eq!(*call_count.lock().expect("Operation should succeed"), 1);
    }

    #[tokio::test]
    async fn test_execute_exceed_max_attempts() {
        let call_count = Arc::new(Mutex::new(0));
        let call_count_clone = Arc::clone(&call_count);

        let result = fast_policy(2)
            .execute(|| async {
                *call_count_clone.lock().expect("Operation should succeed") += 1;
                Err::<i32, ProtocolError>(ProtocolError::Connect("unreachable".into()))
            })
            .await;

        assert!(result.is_err());
        // Initial try plus two retries
        assert_eq!(*call_count.lock().expect("Operation should succeed"), 3);
    }
}
