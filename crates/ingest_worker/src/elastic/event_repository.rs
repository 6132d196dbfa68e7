use async_trait::async_trait;
use common::domain::{DomainError, DomainResult, EventDocumentRepository, IndexDocumentInput};
use common::elastic::ElasticClient;
use tracing::debug;

/// Elasticsearch implementation of the document repository.
#[derive(Clone)]
pub struct ElasticEventRepository {
    client: ElasticClient,
}

impl ElasticEventRepository {
    pub fn new(client: ElasticClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EventDocumentRepository for ElasticEventRepository {
    async fn index_document(&self, input: IndexDocumentInput) -> DomainResult<()> {
        debug!(
            index = %input.index,
            document_id = %input.document_id,
            "Storing document in Elasticsearch"
        );

        self.client
            .put_document(
                &input.index,
                &input.document_type,
                &input.document_id,
                &serde_json::Value::Object(input.body),
            )
            .await
            .map_err(|e| DomainError::IndexSubmission(e.to_string()))
    }
}
