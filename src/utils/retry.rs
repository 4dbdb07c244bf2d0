// Retry logic with HTTP Retry-After hint support

use backoff::{backoff::Backoff, ExponentialBackoff};
use std::time::Duration;
use tracing::debug;

/// One failed attempt of a retried operation.
#[derive(Debug)]
pub struct AttemptError {
    /// HTTP status of the failed attempt; transport failures report 500.
    pub status: u16,
    pub message: String,
    /// Delay requested by the upstream via `Retry-After`, if any.
    pub retry_after: Option<Duration>,
}

impl AttemptError {
    pub fn status(status: u16, message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after,
        }
    }

    /// Connection, DNS or timeout failure. Treated as retryable.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: 500,
            message: message.into(),
            retry_after: None,
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.message)
    }
}

/// Parse an HTTP `Retry-After` header value given as delta seconds
/// (e.g., "30", "1.5"). Returns the duration, capped at 60 seconds.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let seconds: f64 = value.trim().parse().ok()?;
    if seconds < 0.0 {
        return None;
    }

    // Cap at 60 seconds
    let capped_seconds = seconds.min(60.0);

    let millis = (capped_seconds * 1000.0) as u64;
    Some(Duration::from_millis(millis))
}

/// Create exponential backoff configuration for retries
pub fn create_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: Duration::from_millis(500),     // Start at 500ms
        initial_interval: Duration::from_millis(500),
        randomization_factor: 0.3,                        // Add jitter
        multiplier: 2.0,                                  // Double each time
        max_interval: Duration::from_secs(30),            // Cap at 30s
        max_elapsed_time: Some(Duration::from_secs(120)), // Give up after 2 minutes
        ..Default::default()
    }
}

/// Determine if an HTTP status code is retryable
pub fn is_retryable(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Execute operation with retry logic
/// - Uses the upstream's `Retry-After` hint if available
/// - Falls back to exponential backoff
/// - Respects max attempts and timeouts
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, AttemptError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, AttemptError>>,
{
    let mut backoff = create_backoff();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(error) => {
                if !is_retryable(error.status) || attempt >= max_attempts {
                    // Non-retryable error or max attempts reached
                    return Err(error);
                }

                // Prefer the upstream's hint over our own schedule
                let delay = if let Some(hint) = error.retry_after {
                    debug!(
                        "{} failed with {} (attempt {}), upstream suggests waiting {}ms",
                        operation_name,
                        error.status,
                        attempt,
                        hint.as_millis()
                    );
                    hint
                } else {
                    let backoff_delay = backoff.next_backoff().unwrap_or(Duration::from_secs(30));
                    debug!(
                        "{} failed with {} (attempt {}), retrying after {}ms",
                        operation_name,
                        error.status,
                        attempt,
                        backoff_delay.as_millis()
                    );
                    backoff_delay
                };

                // Wait before retry
                tokio::time::sleep(delay).await;
            }
        }
    }
}
