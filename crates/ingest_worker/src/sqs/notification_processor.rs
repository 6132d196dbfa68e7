use crate::domain::NotificationService;
use common::sqs::{BatchProcessor, ProcessingResult, QueueMessage};
use std::sync::Arc;
use tracing::debug;

/// Create a batch processor that drives each queue message through the
/// notification service.
///
/// Messages in a batch are independent, so they are processed concurrently;
/// the delete set is decided only once every outcome is in, which is what
/// the poller's batched deletion depends on.
pub fn create_notification_processor(service: Arc<NotificationService>) -> BatchProcessor {
    Box::new(move |messages: &[QueueMessage]| {
        let service = Arc::clone(&service);
        let batch: Vec<QueueMessage> = messages.to_vec();

        Box::pin(async move {
            let outcomes = futures::future::join_all(batch.iter().map(|message| {
                let service = Arc::clone(&service);
                async move { service.handle_message(message).await }
            }))
            .await;

            let mut delete = Vec::new();
            let mut leave = Vec::new();
            for (idx, outcome) in outcomes.into_iter().enumerate() {
                match outcome {
                    Ok(()) => delete.push(idx),
                    Err(e) => leave.push((idx, Some(e.to_string()))),
                }
            }

            debug!(
                handled = delete.len(),
                left = leave.len(),
                "Batch processing complete"
            );
            Ok(ProcessingResult::new(delete, leave))
        })
    })
}
