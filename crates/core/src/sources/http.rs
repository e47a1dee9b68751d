use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::config::SourceConfig;
use crate::errors::SourceError;
use crate::sources::DocumentFetcher;

/// Fetches `{base_url}/{source_id}.yml` over HTTP(S).
#[derive(Clone, Debug)]
pub struct HttpDocumentFetcher {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpDocumentFetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("deadline-bot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| SourceError::Client(error.to_string()))?;

        Ok(Self { client, base_url: base_url.into(), timeout })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn document_url(&self, source_id: &str) -> String {
        format!("{}/{source_id}.yml", self.base_url.trim_end_matches('/'))
    }

    fn transport_error(&self, url: &str, error: reqwest::Error) -> SourceError {
        if error.is_timeout() {
            SourceError::Timeout { url: url.to_owned(), timeout_ms: self.timeout.as_millis() }
        } else {
            SourceError::Transport { url: url.to_owned(), message: error.to_string() }
        }
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch_document(&self, source_id: &str) -> Result<String, SourceError> {
        let url = self.document_url(source_id);
        let started = Instant::now();

        let response =
            self.client.get(&url).send().await.map_err(|error| self.transport_error(&url, error))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Status { url, status: status.as_u16() });
        }

        let body = response.text().await.map_err(|error| self.transport_error(&url, error))?;
        debug!(
            event_name = "source.http.fetched",
            source_id,
            url = %url,
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = body.len(),
            "source document downloaded"
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::prelude::*;

    use super::HttpDocumentFetcher;
    use crate::errors::SourceError;
    use crate::sources::DocumentFetcher;

    #[test]
    fn document_url_ignores_trailing_slash() {
        let fetcher = HttpDocumentFetcher::new("https://example.test/data/", Duration::from_secs(1))
            .expect("client");
        assert_eq!(fetcher.document_url("iclr"), "https://example.test/data/iclr.yml");
    }

    #[tokio::test]
    async fn returns_body_on_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/conferences/iclr.yml");
            then.status(200).body("- title: ICLR\n  year: 2030\n");
        });

        let fetcher =
            HttpDocumentFetcher::new(server.url("/conferences"), Duration::from_secs(5)).expect("client");
        let body = fetcher.fetch_document("iclr").await.expect("document");

        assert!(body.contains("ICLR"));
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn non_ok_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/conferences/kdd.yml");
            then.status(404).body("404: Not Found");
        });

        let fetcher =
            HttpDocumentFetcher::new(server.url("/conferences"), Duration::from_secs(5)).expect("client");
        let error = fetcher.fetch_document("kdd").await.expect_err("missing document");

        assert!(matches!(error, SourceError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/conferences/acl.yml");
            then.status(200).delay(Duration::from_secs(3)).body("- title: ACL\n");
        });

        let fetcher = HttpDocumentFetcher::new(server.url("/conferences"), Duration::from_millis(200))
            .expect("client");
        let error = fetcher.fetch_document("acl").await.expect_err("timeout");

        assert!(matches!(error, SourceError::Timeout { timeout_ms: 200, .. }));
    }
}
