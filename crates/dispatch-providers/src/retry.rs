//! Retry with exponential back-off and jitter for upstream HTTP calls.

use std::future::Future;
use std::time::Duration;

use crate::error::ProviderError;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx and 429.
///
/// **Not retriable:** other 4xx, malformed bodies, upstream-reported errors,
/// and configuration problems; retrying won't fix them.
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        ProviderError::UpstreamStatus { .. }
        | ProviderError::Deserialize { .. }
        | ProviderError::Xml(_)
        | ProviderError::MissingApiKey(_)
        | ProviderError::InvalidUrl { .. }
        | ProviderError::NoWeatherStation(_) => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors. The delay doubles per attempt from `backoff_base_ms`, is jittered
/// by ±25 %, and is capped at 60 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    const MAX_DELAY_MS: u64 = 60_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "upstream transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn deserialize_err() -> ProviderError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        ProviderError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn non_transient_errors_are_not_retriable() {
        assert!(!is_retriable(&deserialize_err()));
        assert!(!is_retriable(&ProviderError::MissingApiKey("directions")));
        assert!(!is_retriable(&ProviderError::NoWeatherStation("Atlantis".to_owned())));
        assert!(!is_retriable(&ProviderError::UpstreamStatus {
            service: "directions",
            status: "ZERO_RESULTS".to_owned(),
            message: String::new(),
        }));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ProviderError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn does_not_retry_deserialize_errors() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(deserialize_err())
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ProviderError::Deserialize { .. })));
    }

    #[tokio::test]
    async fn retries_connect_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    let err = reqwest::Client::new()
                        .get("http://0.0.0.0:1")
                        .send()
                        .await
                        .unwrap_err();
                    Err::<u32, _>(ProviderError::Http(err))
                } else {
                    Ok(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
