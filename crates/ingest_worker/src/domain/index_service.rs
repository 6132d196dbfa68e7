use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::domain::{
    Clock, DomainResult, EventDocumentRepository, IndexDocumentInput, PayloadTransform,
};
use std::sync::Arc;
use tracing::debug;

/// Date suffix for daily index partitioning, formatted in UTC.
const INDEX_DATE_FORMAT: &str = "%Y.%m.%d";

/// Field stamped onto every document at submission time.
const INGESTED_AT_FIELD: &str = "ingested_at";

/// Trait for persisting verified payloads.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EventIndexer: Send + Sync {
    async fn index(
        &self,
        message_id: &str,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> DomainResult<()>;
}

/// Maps a verified payload to its dated destination index and submits it.
///
/// The document id is the envelope's message id, so redelivery overwrites
/// rather than duplicates. An optional transform hook runs on the payload
/// right before submission. Submission failures surface to the caller;
/// nothing is retried here.
pub struct EventIndexService {
    repository: Arc<dyn EventDocumentRepository>,
    clock: Arc<dyn Clock>,
    index_prefix: String,
    document_type: String,
    transform: Option<PayloadTransform>,
}

impl EventIndexService {
    pub fn new(
        repository: Arc<dyn EventDocumentRepository>,
        clock: Arc<dyn Clock>,
        index_prefix: String,
        document_type: String,
        transform: Option<PayloadTransform>,
    ) -> Self {
        Self {
            repository,
            clock,
            index_prefix,
            document_type,
            transform,
        }
    }

    /// Payloads with timestamps on the same UTC calendar day land in the
    /// same index.
    fn destination_index(&self, timestamp: DateTime<Utc>) -> String {
        format!("{}{}", self.index_prefix, timestamp.format(INDEX_DATE_FORMAT))
    }
}

#[async_trait]
impl EventIndexer for EventIndexService {
    async fn index(
        &self,
        message_id: &str,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> DomainResult<()> {
        let payload = match &self.transform {
            Some(transform) => transform(payload),
            None => payload,
        };

        // The index store takes object documents; any other JSON is wrapped.
        let mut body = match payload {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("payload".to_string(), other);
                map
            }
        };
        body.insert(
            INGESTED_AT_FIELD.to_string(),
            serde_json::Value::String(self.clock.now().to_rfc3339()),
        );

        let input = IndexDocumentInput {
            index: self.destination_index(timestamp),
            document_type: self.document_type.clone(),
            document_id: message_id.to_string(),
            body,
        };

        debug!(
            index = %input.index,
            document_id = %input.document_id,
            "Submitting verified payload"
        );
        self.repository.index_document(input).await
    }
}
