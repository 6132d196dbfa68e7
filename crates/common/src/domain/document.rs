use crate::domain::result::DomainResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Optional hook applied to a payload immediately before indexing. When no
/// hook is installed the payload passes through unchanged.
pub type PayloadTransform = Arc<dyn Fn(serde_json::Value) -> serde_json::Value + Send + Sync>;

/// A document ready for submission to the index store.
///
/// `document_id` is the envelope's message id, so a redelivered message
/// overwrites its own document instead of duplicating it.
#[derive(Debug, Clone)]
pub struct IndexDocumentInput {
    pub index: String,
    pub document_type: String,
    pub document_id: String,
    pub body: serde_json::Map<String, serde_json::Value>,
}

/// Repository trait for document submission.
/// Infrastructure layer (e.g. the Elasticsearch adapter) implements this.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventDocumentRepository: Send + Sync {
    /// Submit a single document. Submission failures surface to the caller;
    /// no retry happens at this layer.
    async fn index_document(&self, input: IndexDocumentInput) -> DomainResult<()>;
}
