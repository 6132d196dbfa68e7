use crate::domain::{DomainError, DomainResult};
use crate::sqs::{DeleteEntry, DeleteOutcome, FailedDelete, NotificationQueue, QueueMessage};
use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::{DeleteMessageBatchRequestEntry, Message, MessageSystemAttributeName};
use chrono::DateTime;
use tracing::{debug, warn};

/// SQS implementation of the queue collaborator.
#[derive(Clone)]
pub struct SqsClient {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsClient {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Build a client from the ambient AWS environment (region, credentials).
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_sqs::Client::new(&sdk_config), queue_url)
    }
}

#[async_trait]
impl NotificationQueue for SqsClient {
    async fn receive_batch(
        &self,
        max_messages: i32,
        visibility_timeout_secs: i32,
        wait_secs: i32,
    ) -> DomainResult<Vec<QueueMessage>> {
        debug!(
            queue_url = %self.queue_url,
            max_messages,
            wait_secs,
            "Receiving message batch"
        );

        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(max_messages)
            .visibility_timeout(visibility_timeout_secs)
            .wait_time_seconds(wait_secs)
            .message_system_attribute_names(MessageSystemAttributeName::SentTimestamp)
            .send()
            .await
            .map_err(|e| DomainError::QueueReceive(DisplayErrorContext(&e).to_string()))?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(to_queue_message)
            .collect();

        Ok(messages)
    }

    async fn delete_batch(&self, entries: Vec<DeleteEntry>) -> DomainResult<DeleteOutcome> {
        if entries.is_empty() {
            return Ok(DeleteOutcome::default());
        }

        let request_entries = entries
            .into_iter()
            .map(|entry| {
                DeleteMessageBatchRequestEntry::builder()
                    .id(entry.id)
                    .receipt_handle(entry.receipt_handle)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DomainError::QueueDelete(e.to_string()))?;

        let output = self
            .client
            .delete_message_batch()
            .queue_url(&self.queue_url)
            .set_entries(Some(request_entries))
            .send()
            .await
            .map_err(|e| DomainError::QueueDelete(DisplayErrorContext(&e).to_string()))?;

        let deleted = output
            .successful()
            .iter()
            .map(|entry| entry.id().to_string())
            .collect();
        let failed = output
            .failed()
            .iter()
            .map(|entry| FailedDelete {
                id: entry.id().to_string(),
                sender_fault: entry.sender_fault(),
                reason: entry.message().map(str::to_string),
            })
            .collect();

        Ok(DeleteOutcome { deleted, failed })
    }
}

/// Convert an SQS message into the domain shape. Messages missing an id,
/// receipt handle, or body cannot be processed or deleted and are dropped
/// with a warning.
fn to_queue_message(message: Message) -> Option<QueueMessage> {
    let sent_at = message
        .attributes
        .as_ref()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::SentTimestamp))
        .and_then(|millis| millis.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis);

    match (message.message_id, message.receipt_handle, message.body) {
        (Some(id), Some(receipt_handle), Some(body)) => Some(QueueMessage {
            id,
            receipt_handle,
            body,
            sent_at,
        }),
        (id, _, _) => {
            warn!(
                message_id = id.as_deref().unwrap_or("unknown"),
                "Dropping queue message without id, receipt handle, or body"
            );
            None
        }
    }
}
