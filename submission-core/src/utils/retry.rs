use std::time::Duration;

use thiserror::Error;

#[derive(Clone)]
pub struct RetryConfig {
    /// Additional tries after the first call; total calls <= max_retries + 1.
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Extra random delay added to each backoff step. The reference behavior
    /// is pure exponential backoff, so this defaults to `None`.
    pub jitter_max: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_delay: Duration::from_secs(30),
            jitter_max: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RetryError<E> {
    /// Every allowed call failed with a transient error.
    #[error("retries exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: usize, last: E },
    /// The error was classified non-transient; no retry was attempted.
    #[error("non-retryable failure: {0}")]
    Permanent(E),
}

/// Runs `f` with exponential backoff, retrying only errors the classifier
/// marks as transient. Each invocation starts its own attempt counter; the
/// cross-call attempt budget is tracked by the coordinator's ledger, not
/// here.
pub async fn retry_async_with_config<F, Fut, T, E, P>(
    config: RetryConfig,
    is_transient: P,
    mut f: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut delay = config.initial_delay;
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) => {
                if !is_transient(&e) {
                    return Err(RetryError::Permanent(e));
                }
                if attempts > config.max_retries {
                    return Err(RetryError::Exhausted { attempts, last: e });
                }

                // apply jitter
                if let Some(jitter_max) = config.jitter_max {
                    let jitter_ms = jitter_max.as_millis() as u64;
                    let extra = if jitter_ms == 0 {
                        0
                    } else {
                        rand::random::<u64>() % (jitter_ms + 1)
                    };
                    tokio::time::sleep(delay + Duration::from_millis(extra)).await;
                } else {
                    tokio::time::sleep(delay).await;
                }

                delay = std::cmp::min(delay * 2, config.max_delay);
            }
        }
    }
}
