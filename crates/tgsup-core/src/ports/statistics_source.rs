//! Statistics source port.
//!
//! Abstracts how the raw statistics text is obtained from a running
//! server. The runtime provides an HTTP implementation; tests substitute
//! canned text.

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failures while fetching statistics text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsSourceError {
    /// The request could not be sent or timed out.
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The endpoint answered with a non-success status.
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },

    /// The response body could not be read.
    #[error("Failed to read response from {url}: {message}")]
    Body { url: String, message: String },
}

/// Source of raw statistics text for a server listening on `port`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatisticsSourcePort: Send + Sync {
    /// Fetch the plaintext statistics document.
    async fn fetch(&self, port: u16) -> Result<String, StatsSourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_source_roundtrip() {
        let mut source = MockStatisticsSourcePort::new();
        source
            .expect_fetch()
            .withf(|port| *port == 8082)
            .returning(|_| Ok("uptime\t12.5\n".to_string()));

        let text = source.fetch(8082).await.unwrap();
        assert_eq!(text, "uptime\t12.5\n");
    }

    #[test]
    fn test_error_messages() {
        let err = StatsSourceError::Request {
            url: "http://127.0.0.1:8082/".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Request to http://127.0.0.1:8082/ failed: connection refused"
        );
    }
}
