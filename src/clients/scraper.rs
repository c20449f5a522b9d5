//! Listing-scraper trigger — fire-and-forget notification keyed by MLS id.
//!
//! Failures are logged and never propagate; nothing about step navigation
//! waits on or changes because of this call.

use std::sync::Arc;

use serde_json::json;

/// Client for the listing-scraper endpoint.
pub struct ScraperClient {
    http: reqwest::Client,
    url: String,
}

impl ScraperClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Fire the notification and log the outcome. Infallible by contract.
    pub async fn trigger(&self, mls_id: &str) {
        let result = self
            .http
            .post(&self.url)
            .json(&json!({ "MLS_ID": mls_id }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(mls_id, "Listing scraper triggered");
            }
            Ok(response) => {
                tracing::warn!(
                    mls_id,
                    status = response.status().as_u16(),
                    "Listing scraper returned an error status"
                );
            }
            Err(e) => {
                tracing::warn!(mls_id, error = %e, "Listing scraper request failed");
            }
        }
    }
}

/// Spawn the trigger without awaiting it.
pub fn spawn_trigger(client: Arc<ScraperClient>, mls_id: String) {
    tokio::spawn(async move {
        client.trigger(&mls_id).await;
    });
}
