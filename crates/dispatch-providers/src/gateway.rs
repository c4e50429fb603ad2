//! The fetch-or-absent contract: every provider call goes through [`guard`].

use std::future::Future;
use std::time::Duration;

use dispatch_core::{Domain, ProviderResult};

use crate::error::ProviderError;

/// Await `fetch` for at most `timeout`, folding any error or timeout into
/// [`ProviderResult::Unavailable`]. Never panics and never propagates.
pub async fn guard<T, F>(domain: Domain, timeout: Duration, fetch: F) -> ProviderResult<T>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, fetch).await {
        Ok(Ok(value)) => {
            tracing::debug!(domain = %domain, "provider fetched");
            ProviderResult::Fetched(value)
        }
        Ok(Err(e)) => {
            tracing::warn!(domain = %domain, error = %e, "provider unavailable");
            ProviderResult::unavailable(e.to_string())
        }
        Err(_) => {
            #[allow(clippy::cast_possible_truncation)]
            let timeout_ms = timeout.as_millis() as u64;
            tracing::warn!(domain = %domain, timeout_ms, "provider timed out");
            ProviderResult::unavailable(format!("timed out after {timeout_ms} ms"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn success_is_fetched() {
        let r = guard(Domain::Fires, Duration::from_secs(1), async {
            Ok::<_, ProviderError>(vec![1, 2])
        })
        .await;
        assert_eq!(r.into_value(), Some(vec![1, 2]));
    }

    #[tokio::test]
    async fn error_becomes_unavailable() {
        let r: ProviderResult<u8> = guard(Domain::Weather, Duration::from_secs(1), async {
            Err(ProviderError::NoWeatherStation("Atlantis".to_string()))
        })
        .await;
        assert!(!r.ok());
        assert!(r.failed_reason().unwrap().contains("Atlantis"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out() {
        let r: ProviderResult<u8> = guard(Domain::RoadEvents, Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok(1)
        })
        .await;
        assert_eq!(r.failed_reason(), Some("timed out after 50 ms"));
    }
}
