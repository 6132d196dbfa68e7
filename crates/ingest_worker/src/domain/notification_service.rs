use crate::domain::{EnvelopeVerifier, EventIndexer};
use chrono::{DateTime, Utc};
use common::domain::{DomainError, DomainResult, Envelope};
use common::sqs::QueueMessage;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Domain service driving one message through the pipeline.
///
/// Flow:
/// 1. Parse the raw body into a typed envelope
/// 2. Verify the envelope signature against the publisher certificate
/// 3. Decode the inner payload and the envelope timestamp
/// 4. Submit the payload to its dated index
///
/// An error return means the message must not be deleted; the queue's
/// visibility timeout redelivers it. Every failure is logged here with the
/// level its class calls for (parse and verification failures warn, index
/// submission failures error).
pub struct NotificationService {
    verifier: Arc<dyn EnvelopeVerifier>,
    indexer: Arc<dyn EventIndexer>,
}

impl NotificationService {
    pub fn new(verifier: Arc<dyn EnvelopeVerifier>, indexer: Arc<dyn EventIndexer>) -> Self {
        Self { verifier, indexer }
    }

    pub async fn handle_message(&self, message: &QueueMessage) -> DomainResult<()> {
        let envelope = match Envelope::parse(&message.body) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Will never become parseable, so a retry cannot help.
                warn!(
                    queue_message_id = %message.id,
                    error = %e,
                    "Skipping message with unparsable body"
                );
                return Err(e);
            }
        };

        debug!(
            kind = envelope.kind(),
            message_id = envelope.message_id().unwrap_or("unknown"),
            sent_at = ?message.sent_at,
            "Verifying envelope"
        );

        if let Err(e) = self.verifier.verify(&envelope).await {
            warn!(
                queue_message_id = %message.id,
                kind = envelope.kind(),
                error = %e,
                "Envelope failed verification, leaving for redelivery"
            );
            return Err(e);
        }

        // Past verification the envelope is one of the supported kinds, so
        // message id, payload, and timestamp are all present.
        let message_id = envelope.message_id().unwrap_or(&message.id).to_string();

        let payload: serde_json::Value =
            match serde_json::from_str(envelope.message().unwrap_or_default()) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(
                        message_id = %message_id,
                        error = %e,
                        "Envelope payload is not valid JSON, skipping"
                    );
                    return Err(DomainError::MalformedEnvelope(format!(
                        "payload is not valid JSON: {e}"
                    )));
                }
            };

        let timestamp = match envelope
            .timestamp()
            .unwrap_or_default()
            .parse::<DateTime<Utc>>()
        {
            Ok(timestamp) => timestamp,
            Err(e) => {
                warn!(
                    message_id = %message_id,
                    timestamp = envelope.timestamp().unwrap_or_default(),
                    "Envelope timestamp is not ISO-8601, skipping"
                );
                return Err(DomainError::InvalidTimestamp(e.to_string()));
            }
        };

        if let Err(e) = self.indexer.index(&message_id, timestamp, payload).await {
            error!(
                message_id = %message_id,
                error = %e,
                "Failed to index verified payload, leaving for redelivery"
            );
            return Err(e);
        }

        debug!(message_id = %message_id, "Successfully indexed envelope payload");
        Ok(())
    }
}
