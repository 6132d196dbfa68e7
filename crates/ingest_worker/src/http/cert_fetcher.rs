use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use common::domain::{CertificateFetcher, DomainError, DomainResult};
use std::time::Duration;
use tracing::debug;

/// Plain HTTPS certificate fetcher: a GET with no custom headers or auth.
pub struct HttpCertificateFetcher {
    client: reqwest::Client,
}

impl HttpCertificateFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build certificate fetch client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl CertificateFetcher for HttpCertificateFetcher {
    async fn fetch(&self, url: &str) -> DomainResult<Bytes> {
        debug!(%url, "Fetching signing certificate");

        let fetch_error = |reason: String| DomainError::CertificateFetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?
            .error_for_status()
            .map_err(|e| fetch_error(e.to_string()))?;

        response.bytes().await.map_err(|e| fetch_error(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_certificate_bytes() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cert.pem"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PEM BYTES".to_vec()))
            .mount(&server)
            .await;

        let fetcher = HttpCertificateFetcher::new(Duration::from_secs(5)).unwrap();

        // Act
        let bytes = fetcher.fetch(&format!("{}/cert.pem", server.uri())).await.unwrap();

        // Assert
        assert_eq!(bytes, Bytes::from_static(b"PEM BYTES"));
    }

    #[tokio::test]
    async fn test_error_status_maps_to_certificate_fetch_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpCertificateFetcher::new(Duration::from_secs(5)).unwrap();
        let url = format!("{}/missing.pem", server.uri());

        // Act
        let result = fetcher.fetch(&url).await;

        // Assert
        match result {
            Err(DomainError::CertificateFetch { url: failed_url, .. }) => {
                assert_eq!(failed_url, url)
            }
            other => panic!("expected CertificateFetch, got {other:?}"),
        }
    }
}
