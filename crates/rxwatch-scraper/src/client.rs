//! HTTP fetch boundary.
//!
//! The only part of the pipeline allowed to fail hard: non-2xx responses and
//! network errors come back as [`ScraperError`], and a failure aborts the
//! affected page or listing, never the whole run (the caller decides).

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;

/// A fetched page: final URL after redirects, status, and raw body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status: u16,
    pub body: String,
}

/// Shared fetch capability injected into every source adapter.
///
/// Applies a request timeout, a stable `User-Agent`, and exponential-backoff
/// retries on transient failures (network errors, 429, 5xx).
pub struct FetchClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl FetchClient {
    /// Builds a client with the given timeout, user agent, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Fetches raw markup (or any text body) from `url`.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::UnexpectedStatus`] — non-2xx response (5xx/429
    ///   retried first, other 4xx immediately).
    /// - [`ScraperError::Http`] — network failure after retries.
    pub async fn fetch_html(&self, url: &str) -> Result<FetchedPage, ScraperError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response = self.client.get(url).send().await?;
            let status = response.status();
            let final_url = response.url().to_string();
            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: final_url,
                });
            }
            let body = response.text().await?;
            Ok(FetchedPage {
                final_url,
                status: status.as_u16(),
                body,
            })
        })
        .await
    }

    /// Fetches and deserializes a JSON endpoint, with optional query pairs.
    ///
    /// # Errors
    ///
    /// Same fetch errors as [`FetchClient::fetch_html`], plus
    /// [`ScraperError::Deserialize`] if the body is not valid JSON for `T`.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ScraperError> {
        let page = retry_with_backoff(self.max_retries, self.backoff_base_secs, || async {
            let response = self.client.get(url).query(query).send().await?;
            let status = response.status();
            let final_url = response.url().to_string();
            if !status.is_success() {
                return Err(ScraperError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: final_url,
                });
            }
            let body = response.text().await?;
            Ok(FetchedPage {
                final_url,
                status: status.as_u16(),
                body,
            })
        })
        .await?;

        serde_json::from_str(&page.body).map_err(|source| ScraperError::Deserialize {
            context: page.final_url,
            source,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
