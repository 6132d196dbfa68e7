//! End-to-end pipeline test over mocked collaborators: a batch where one
//! message verifies, one carries a corrupted signature, and one has an
//! unparsable body. Only the verified message may be indexed and deleted.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use common::domain::{MockCertificateFetcher, MockEventDocumentRepository};
use common::sqs::{DeleteOutcome, MockNotificationQueue, QueueMessage};
use ingest_worker::{IngestWorker, IngestWorkerConfig};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::EncodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde_json::json;
use sha1::Sha1;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const CERT_URL: &str = "https://sns.eu-west-1.amazonaws.com/cert.pem";

fn test_identity() -> (String, RsaPrivateKey) {
    let mut rng = rand::thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, 2048).expect("failed to generate key");

    let pkcs8 = private_key.to_pkcs8_der().unwrap();
    let key_pair = rcgen::KeyPair::try_from(pkcs8.as_bytes()).unwrap();
    let certificate = rcgen::CertificateParams::new(vec!["sns.test".to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap();

    (certificate.pem(), private_key)
}

/// Sign a notification body the way the publisher does: alternating
/// name/value lines over Message, MessageId, Timestamp, TopicArn, Type.
fn signed_notification_body(message_id: &str, payload: &str, private_key: &RsaPrivateKey) -> String {
    let timestamp = "2024-03-01T10:00:00.000Z";
    let topic_arn = "arn:aws:sns:eu-west-1:123456789012:events";

    let signing_string = format!(
        "Message\n{payload}\nMessageId\n{message_id}\nTimestamp\n{timestamp}\nTopicArn\n{topic_arn}\nType\nNotification\n"
    );
    let signing_key = SigningKey::<Sha1>::new(private_key.clone());
    let signature = BASE64.encode(signing_key.sign(signing_string.as_bytes()).to_bytes());

    json!({
        "Type": "Notification",
        "MessageId": message_id,
        "Message": payload,
        "Timestamp": timestamp,
        "TopicArn": topic_arn,
        "Signature": signature,
        "SigningCertURL": CERT_URL
    })
    .to_string()
}

fn queue_message(id: &str, body: String) -> QueueMessage {
    QueueMessage {
        id: id.to_string(),
        receipt_handle: format!("rh-{id}"),
        body,
        sent_at: None,
    }
}

#[tokio::test]
async fn test_batch_with_valid_tampered_and_unparsable_messages() {
    // Arrange
    let (cert_pem, private_key) = test_identity();

    let valid = queue_message(
        "queue-a",
        signed_notification_body("mid-a", r#"{"level":42}"#, &private_key),
    );

    // Corrupt one signature byte after signing
    let mut tampered_body: serde_json::Value =
        serde_json::from_str(&signed_notification_body("mid-b", r#"{"level":7}"#, &private_key))
            .unwrap();
    tampered_body["Signature"] = json!("AAAA".to_string() + tampered_body["Signature"].as_str().unwrap());
    let tampered = queue_message("queue-b", tampered_body.to_string());

    let unparsable = queue_message("queue-c", "not even close to json".to_string());

    let ctx = CancellationToken::new();

    let mut queue = MockNotificationQueue::new();
    let receives = Arc::new(AtomicUsize::new(0));
    {
        let token = ctx.clone();
        let batch = vec![valid, tampered, unparsable];
        queue
            .expect_receive_batch()
            .returning(move |_, _, _| match receives.fetch_add(1, Ordering::SeqCst) {
                0 => Ok(batch.clone()),
                _ => {
                    token.cancel();
                    Ok(Vec::new())
                }
            });
    }
    // Only the verified message may be deleted, and in a single batch call
    queue
        .expect_delete_batch()
        .withf(|entries| entries.len() == 1 && entries[0].id == "queue-a")
        .times(1)
        .returning(|entries| {
            Ok(DeleteOutcome {
                deleted: entries.iter().map(|e| e.id.clone()).collect(),
                failed: Vec::new(),
            })
        });

    // The valid and tampered messages name the same certificate; concurrent
    // cold misses may fetch it twice, which the design accepts
    let mut fetcher = MockCertificateFetcher::new();
    fetcher
        .expect_fetch()
        .withf(|url| url == CERT_URL)
        .times(1..=2)
        .returning(move |_| Ok(Bytes::from(cert_pem.clone())));

    // Exactly one document: the verified payload, dated by its timestamp
    let mut repository = MockEventDocumentRepository::new();
    repository
        .expect_index_document()
        .withf(|input| {
            input.index == "events-2024.03.01"
                && input.document_type == "event"
                && input.document_id == "mid-a"
                && input.body.get("level") == Some(&json!(42))
                && input.body.contains_key("ingested_at")
        })
        .times(1)
        .returning(|_| Ok(()));

    let worker = IngestWorker::new(
        Arc::new(queue),
        Arc::new(fetcher),
        Arc::new(repository),
        None,
        IngestWorkerConfig::default(),
    );

    // Act + Assert (the mocks verify deletion and indexing)
    worker.run(ctx).await.unwrap();
}
