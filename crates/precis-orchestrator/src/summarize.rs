//! Tool invoker backed by the hosted summarization service.
//!
//! The service takes a single URL and answers with a `{"data": ...}` envelope.
//! A request is attempted exactly once; callers decide what a failure means.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ToolError;

/// Base URL of the hosted summarization service.
pub const DEFAULT_SUMMARIZE_BASE_URL: &str = "https://hermgo-api.vercel.app";

/// Environment variable overriding the summarization service base URL.
pub const ENV_SUMMARIZE_API_BASE_URL: &str = "SUMMARIZE_API_BASE_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Something that can turn a URL into a summary payload.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarizes the page behind `url`.
    ///
    /// # Errors
    /// Returns a `ToolError` if the page could not be summarized.
    async fn summarize(&self, url: &str) -> Result<Value, ToolError>;
}

/// HTTP client for `GET <base>/api/summarize?url=<url>`.
#[derive(Debug, Clone)]
pub struct SummarizeClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SummarizeEnvelope {
    data: Option<Value>,
}

impl Default for SummarizeClient {
    fn default() -> Self {
        Self::new(DEFAULT_SUMMARIZE_BASE_URL)
    }
}

impl SummarizeClient {
    /// Creates a client talking to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { base_url, client }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/api/summarize", self.base_url)
    }
}

#[async_trait]
impl Summarizer for SummarizeClient {
    async fn summarize(&self, url: &str) -> Result<Value, ToolError> {
        debug!(url = %url, endpoint = %self.endpoint(), "Requesting summary");

        let response = self
            .client
            .get(self.endpoint())
            .query(&[("url", url)])
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ToolError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| ToolError::Network(e.to_string()))?;
        let envelope: SummarizeEnvelope = serde_json::from_str(&body)
            .map_err(|e| ToolError::MalformedEnvelope(e.to_string()))?;
        let data = envelope
            .data
            .ok_or_else(|| ToolError::MalformedEnvelope("missing `data` field".to_string()))?;

        info!(url = %url, payload = %data, "Summarize service returned payload");
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_summarize_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/summarize")
            .match_query(Matcher::UrlEncoded("url".into(), "https://example.com".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": "Example summary"}"#)
            .create_async()
            .await;

        let client = SummarizeClient::new(server.url());
        let data = client.summarize("https://example.com").await.unwrap();

        assert_eq!(data, json!("Example summary"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_summarize_http_failure() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/summarize")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = SummarizeClient::new(format!("{}/", server.url()));
        let err = client.summarize("https://bad.example").await.unwrap_err();
        assert_eq!(err, ToolError::HttpStatus(500));
    }

    #[tokio::test]
    async fn test_summarize_malformed_envelope() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/summarize")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"summary": "wrong field"}"#)
            .create_async()
            .await;

        let client = SummarizeClient::new(server.url());
        let err = client.summarize("https://example.com").await.unwrap_err();
        assert!(matches!(err, ToolError::MalformedEnvelope(_)));
    }

    #[test]
    fn test_default_base_url() {
        assert_eq!(SummarizeClient::default().base_url(), "https://hermgo-api.vercel.app");
    }
}
