use crate::sqs::{DeleteEntry, NotificationQueue, QueueMessage};
use anyhow::Result;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of processing a batch of queue messages.
///
/// `delete` holds indices of messages that were fully handled and must be
/// removed from the queue. `leave` holds indices of messages left undeleted
/// so the queue's visibility timeout resurfaces them, with an optional
/// reason for logging.
#[derive(Debug)]
pub struct ProcessingResult {
    pub delete: Vec<usize>,
    pub leave: Vec<(usize, Option<String>)>,
}

impl ProcessingResult {
    /// Every message in the batch was handled.
    pub fn delete_all(count: usize) -> Self {
        Self {
            delete: (0..count).collect(),
            leave: Vec::new(),
        }
    }

    /// Leave the whole batch for redelivery.
    pub fn leave_all(count: usize, reason: Option<String>) -> Self {
        Self {
            delete: Vec::new(),
            leave: (0..count).map(|i| (i, reason.clone())).collect(),
        }
    }

    pub fn new(delete: Vec<usize>, leave: Vec<(usize, Option<String>)>) -> Self {
        Self { delete, leave }
    }
}

/// Type alias for the batch processor function.
/// Takes the retrieved batch and decides, per message, whether it may be
/// deleted. Deserialization and business logic live in the processor.
pub type BatchProcessor =
    Box<dyn Fn(&[QueueMessage]) -> BoxFuture<'static, Result<ProcessingResult>> + Send + Sync>;

/// Scheduling knobs for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub max_messages: i32,
    pub visibility_timeout_secs: i32,
    pub wait_secs: i32,
    /// Delay before the next cycle after a successful one.
    pub poll_interval: Duration,
    /// Delay before the next cycle after a retrieval failure.
    pub cool_off: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_messages: 10,
            visibility_timeout_secs: 10,
            wait_secs: 10,
            poll_interval: Duration::from_millis(10),
            cool_off: Duration::from_secs(10),
        }
    }
}

/// Generic queue poller driving the receive → process → delete cycle.
///
/// A cycle runs to completion once started; cancellation is only observed
/// between cycles. Messages the processor does not mark for deletion are
/// left untouched for the queue to redeliver.
pub struct QueuePoller {
    queue: Arc<dyn NotificationQueue>,
    config: PollerConfig,
    processor: BatchProcessor,
}

impl QueuePoller {
    pub fn new(
        queue: Arc<dyn NotificationQueue>,
        config: PollerConfig,
        processor: BatchProcessor,
    ) -> Self {
        Self {
            queue,
            config,
            processor,
        }
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!(
            max_messages = self.config.max_messages,
            wait_secs = self.config.wait_secs,
            "Starting queue poller"
        );

        loop {
            if ctx.is_cancelled() {
                break;
            }

            let delay = self.poll_cycle().await;

            tokio::select! {
                _ = ctx.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!("Queue poller stopped gracefully");
        Ok(())
    }

    /// One full cycle. Returns the delay before the next cycle: the normal
    /// poll interval, or the cool-off interval when retrieval itself failed.
    async fn poll_cycle(&self) -> Duration {
        let messages = match self
            .queue
            .receive_batch(
                self.config.max_messages,
                self.config.visibility_timeout_secs,
                self.config.wait_secs,
            )
            .await
        {
            Ok(messages) => messages,
            Err(e) => {
                error!(
                    error = %e,
                    cool_off_secs = self.config.cool_off.as_secs(),
                    "Failed to retrieve messages from queue, cooling off"
                );
                return self.config.cool_off;
            }
        };

        if messages.is_empty() {
            debug!("No messages in batch");
            return self.config.poll_interval;
        }

        info!(message_count = messages.len(), "Processing message batch");

        let result = match (self.processor)(&messages).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "Processor returned error, leaving batch for redelivery");
                ProcessingResult::leave_all(messages.len(), Some(e.to_string()))
            }
        };

        for (idx, reason) in &result.leave {
            if let Some(msg) = messages.get(*idx) {
                debug!(
                    message_id = %msg.id,
                    reason = reason.as_deref().unwrap_or("unspecified"),
                    "Leaving message for redelivery"
                );
            }
        }

        if !result.delete.is_empty() {
            self.delete_handled(&messages, &result.delete).await;
        }

        self.config.poll_interval
    }

    /// Delete exactly the handled subset in one batched request. Deletion
    /// failures are reported but never block the next cycle.
    async fn delete_handled(&self, messages: &[QueueMessage], handled: &[usize]) {
        let entries: Vec<DeleteEntry> = handled
            .iter()
            .filter_map(|idx| messages.get(*idx))
            .map(|msg| DeleteEntry {
                id: msg.id.clone(),
                receipt_handle: msg.receipt_handle.clone(),
            })
            .collect();

        debug!(message_count = entries.len(), "Deleting handled messages");

        match self.queue.delete_batch(entries).await {
            Ok(outcome) => {
                for failure in &outcome.failed {
                    if failure.sender_fault {
                        error!(
                            message_id = %failure.id,
                            reason = failure.reason.as_deref().unwrap_or("unspecified"),
                            "Deletion rejected as sender fault"
                        );
                    } else {
                        warn!(
                            message_id = %failure.id,
                            reason = failure.reason.as_deref().unwrap_or("unspecified"),
                            "Failed to delete message"
                        );
                    }
                }
                if !outcome.deleted.is_empty() {
                    debug!(
                        deleted_count = outcome.deleted.len(),
                        "Successfully deleted handled messages"
                    );
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to delete handled messages from queue");
            }
        }
    }
}
