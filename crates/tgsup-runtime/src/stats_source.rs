//! HTTP statistics source for the server's diagnostic endpoint.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tgsup_core::{StatisticsSourcePort, StatsSourceError};
use tracing::{debug, warn};

/// Default timeout for a single statistics request.
pub const DEFAULT_STATS_TIMEOUT: Duration = Duration::from_secs(5);

/// URL of the statistics endpoint for a server on this host.
pub fn stats_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}/")
}

/// Fetches statistics text with a plain, unauthenticated GET.
#[derive(Debug, Clone)]
pub struct HttpStatisticsSource {
    client: Client,
}

impl HttpStatisticsSource {
    /// Create a source with [`DEFAULT_STATS_TIMEOUT`].
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_STATS_TIMEOUT)
    }

    /// Create a source with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
            Client::new()
        });
        Self { client }
    }
}

impl Default for HttpStatisticsSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatisticsSourcePort for HttpStatisticsSource {
    async fn fetch(&self, port: u16) -> Result<String, StatsSourceError> {
        let url = stats_url(port);
        debug!(%url, "Fetching server statistics");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| StatsSourceError::Request {
                    url: url.clone(),
                    message: e.to_string(),
                })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatsSourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| StatsSourceError::Body {
            url,
            message: e.to_string(),
        })
    }
}
