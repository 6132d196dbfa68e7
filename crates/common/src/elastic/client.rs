use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tracing::debug;

/// Thin HTTP client for the index store.
///
/// Documents go in via `PUT /{index}/{type}/{id}`, so resubmitting the same
/// document id overwrites in place instead of duplicating.
#[derive(Clone)]
pub struct ElasticClient {
    client: reqwest::Client,
    base_url: String,
}

impl ElasticClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build index store HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Cheap reachability probe against the cluster root.
    pub async fn ping(&self) -> Result<()> {
        self.client
            .get(&self.base_url)
            .send()
            .await
            .context("Index store is unreachable")?
            .error_for_status()
            .context("Index store returned an error status")?;
        Ok(())
    }

    pub async fn put_document(
        &self,
        index: &str,
        document_type: &str,
        document_id: &str,
        body: &serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}/{index}/{document_type}/{document_id}", self.base_url);
        debug!(%url, "Submitting document");

        let response = self
            .client
            .put(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to submit document to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(anyhow!("Index store rejected document ({status}): {detail}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_put_document_targets_index_type_and_id() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/events-2024.03.01/event/mid-1"))
            .and(body_json(json!({"level": 42})))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri(), Duration::from_secs(5)).unwrap();

        // Act
        let result = client
            .put_document("events-2024.03.01", "event", "mid-1", &json!({"level": 42}))
            .await;

        // Assert
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_put_document_surfaces_error_status() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(500).set_body_string("mapping conflict"))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri(), Duration::from_secs(5)).unwrap();

        // Act
        let result = client
            .put_document("events-2024.03.01", "event", "mid-1", &json!({}))
            .await;

        // Assert
        let error = result.unwrap_err().to_string();
        assert!(error.contains("500"), "unexpected error: {error}");
    }

    #[tokio::test]
    async fn test_ping_ok_and_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ElasticClient::new(&server.uri(), Duration::from_secs(1)).unwrap();
        assert!(client.ping().await.is_ok());

        let dead = ElasticClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        assert!(dead.ping().await.is_err());
    }
}
