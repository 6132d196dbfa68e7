use crate::domain::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A message as retrieved from the queue. The receipt handle is opaque and
/// only ever used for deletion, never for content.
#[derive(Debug, Clone, PartialEq)]
pub struct QueueMessage {
    pub id: String,
    pub receipt_handle: String,
    pub body: String,
    /// Queue-side send time, when the transport exposes it.
    pub sent_at: Option<DateTime<Utc>>,
}

/// Deletion request entry for one handled message.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteEntry {
    pub id: String,
    pub receipt_handle: String,
}

/// One failed deletion inside a batch. `sender_fault` marks failures the
/// queue attributes to the caller (stale or already-consumed receipt
/// handles), which indicate a pipeline bug rather than a transport hiccup.
#[derive(Debug, Clone)]
pub struct FailedDelete {
    pub id: String,
    pub sender_fault: bool,
    pub reason: Option<String>,
}

/// Per-entry outcome of a batched deletion request.
#[derive(Debug, Clone, Default)]
pub struct DeleteOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDelete>,
}

/// Trait for the pull-based queue collaborator.
///
/// The core does not manage queue creation, retention, or dead-lettering;
/// redelivery of undeleted messages is the queue's visibility-timeout model.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationQueue: Send + Sync {
    /// Fetch up to `max_messages` messages, hiding them from other consumers
    /// for `visibility_timeout_secs` and long-polling up to `wait_secs`.
    async fn receive_batch(
        &self,
        max_messages: i32,
        visibility_timeout_secs: i32,
        wait_secs: i32,
    ) -> DomainResult<Vec<QueueMessage>>;

    /// Delete a set of handled messages in one batched request.
    async fn delete_batch(&self, entries: Vec<DeleteEntry>) -> DomainResult<DeleteOutcome>;
}
