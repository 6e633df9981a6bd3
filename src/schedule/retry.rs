use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use crate::sources::RateLimitError;

const MAX_ATTEMPTS: u32 = 5;
const INITIAL_WAIT: Duration = Duration::from_secs(1);
const MAX_WAIT: Duration = Duration::from_secs(60);
const JITTER_SECS: f64 = 5.0;

/// Retry a source call on rate-limit errors only.
///
/// Exponential backoff starting at 1 s, doubling to a 60 s cap, with ±5 s
/// jitter. Any other outcome passes straight through; after
/// `MAX_ATTEMPTS` rate-limited attempts the error propagates to the caller.
pub async fn with_rate_limit_retry<T, F, Fut>(mut call: F) -> Result<T, RateLimitError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RateLimitError>>,
{
    let mut wait = INITIAL_WAIT;
    for attempt in 1..=MAX_ATTEMPTS {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt == MAX_ATTEMPTS => {
                warn!(source = %e.source, attempts = MAX_ATTEMPTS, "rate-limit retries exhausted");
                return Err(e);
            }
            Err(e) => {
                let jitter = rand::thread_rng().gen_range(-JITTER_SECS..=JITTER_SECS);
                let sleep_secs = (wait.as_secs_f64() + jitter).max(0.0);
                warn!(
                    source = %e.source,
                    attempt,
                    sleep_secs,
                    "rate limited, backing off"
                );
                tokio::time::sleep(Duration::from_secs_f64(sleep_secs)).await;
                wait = (wait * 2).min(MAX_WAIT);
            }
        }
    }
    unreachable!("loop returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::model::SourceKind;

    fn rate_limited() -> RateLimitError {
        RateLimitError {
            source: SourceKind::Gnews,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_rate_limit_retry(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<_, RateLimitError>(7u32)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_transient_rate_limit() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result = with_rate_limit_retry(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(rate_limited())
                } else {
                    Ok(42u32)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_after_five_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let result: Result<u32, _> = with_rate_limit_retry(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }
}
