//! Shared retrying HTTP fetcher used by every provider client.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use dispatch_core::AppConfig;

use crate::error::ProviderError;
use crate::retry::retry_with_backoff;

/// Cheap to clone; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_settings(
            &config.user_agent,
            config.http_timeout_secs,
            config.provider_max_retries,
            config.retry_backoff_base_ms,
        )
    }

    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_settings(
        user_agent: &str,
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms,
        })
    }

    pub(crate) async fn get_text(
        &self,
        url: &Url,
        query: &[(&str, String)],
    ) -> Result<String, ProviderError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || async move {
            let response = self.client.get(url.clone()).query(query).send().await?;
            let response = response.error_for_status()?;
            Ok(response.text().await?)
        })
        .await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        query: &[(&str, String)],
        context: &str,
    ) -> Result<T, ProviderError> {
        let body = self.get_text(url, query).await?;
        serde_json::from_str(&body).map_err(|source| ProviderError::Deserialize {
            context: context.to_string(),
            source,
        })
    }

    pub(crate) async fn post_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        url: &Url,
        headers: &[(&'static str, &str)],
        body: &B,
        context: &str,
    ) -> Result<T, ProviderError> {
        let text = retry_with_backoff(self.max_retries, self.backoff_base_ms, move || async move {
            let mut request = self.client.post(url.clone()).json(body);
            for (name, value) in headers {
                request = request.header(*name, *value);
            }
            let response = request.send().await?.error_for_status()?;
            Ok(response.text().await?)
        })
        .await?;
        serde_json::from_str(&text).map_err(|source| ProviderError::Deserialize {
            context: context.to_string(),
            source,
        })
    }
}

/// Parse a configured endpoint.
///
/// # Errors
///
/// Returns [`ProviderError::InvalidUrl`] when `raw` is not an absolute URL.
pub(crate) fn endpoint(raw: &str) -> Result<Url, ProviderError> {
    Url::parse(raw).map_err(|e| ProviderError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_rejects_relative_urls() {
        assert!(endpoint("https://api.open511.gov.bc.ca/events").is_ok());
        assert!(matches!(
            endpoint("/events"),
            Err(ProviderError::InvalidUrl { .. })
        ));
    }
}
