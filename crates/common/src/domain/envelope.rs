use crate::domain::result::{DomainError, DomainResult};
use serde::Deserialize;

pub const TYPE_NOTIFICATION: &str = "Notification";
pub const TYPE_SUBSCRIPTION_CONFIRMATION: &str = "SubscriptionConfirmation";

/// Wire shape of an envelope as delivered in the queue message body.
///
/// Every field is optional here; which ones are required depends on the
/// envelope type and is enforced during conversion to [`Envelope`].
#[derive(Debug, Clone, Deserialize)]
struct WireEnvelope {
    #[serde(rename = "Type")]
    kind: Option<String>,
    #[serde(rename = "MessageId")]
    message_id: Option<String>,
    #[serde(rename = "Message")]
    message: Option<String>,
    #[serde(rename = "Subject")]
    subject: Option<String>,
    #[serde(rename = "Timestamp")]
    timestamp: Option<String>,
    #[serde(rename = "TopicArn")]
    topic_arn: Option<String>,
    #[serde(rename = "Signature")]
    signature: Option<String>,
    #[serde(rename = "SigningCertURL")]
    signing_cert_url: Option<String>,
    #[serde(rename = "SubscribeURL")]
    subscribe_url: Option<String>,
    #[serde(rename = "Token")]
    token: Option<String>,
}

/// A published notification envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message_id: String,
    pub message: String,
    pub subject: Option<String>,
    pub timestamp: String,
    pub topic_arn: String,
    pub signature: String,
    pub signing_cert_url: Option<String>,
}

/// A subscription-confirmation envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionConfirmation {
    pub message_id: String,
    pub message: String,
    pub subscribe_url: String,
    pub token: String,
    pub timestamp: String,
    pub topic_arn: String,
    pub signature: String,
    pub signing_cert_url: Option<String>,
}

/// Envelope as delivered by the queue, one variant per supported type plus
/// an explicit unsupported variant carrying the raw type string for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Notification(Notification),
    SubscriptionConfirmation(SubscriptionConfirmation),
    Unsupported {
        kind: String,
        message_id: Option<String>,
    },
}

impl Envelope {
    /// Parse a raw queue-message body into a typed envelope.
    ///
    /// A body that is not valid JSON, or that claims a supported type but is
    /// missing one of that type's required fields, is a
    /// [`DomainError::MalformedEnvelope`]. An unrecognized type parses
    /// successfully into [`Envelope::Unsupported`]; rejecting it is the
    /// verifier's call, so the raw type string survives for logging.
    pub fn parse(body: &str) -> DomainResult<Envelope> {
        let wire: WireEnvelope = serde_json::from_str(body)
            .map_err(|e| DomainError::MalformedEnvelope(e.to_string()))?;
        Envelope::from_wire(wire)
    }

    fn from_wire(wire: WireEnvelope) -> DomainResult<Envelope> {
        let kind = wire.kind.clone().unwrap_or_default();
        match kind.as_str() {
            TYPE_NOTIFICATION => Ok(Envelope::Notification(Notification {
                message_id: require(wire.message_id, "MessageId")?,
                message: require(wire.message, "Message")?,
                subject: wire.subject,
                timestamp: require(wire.timestamp, "Timestamp")?,
                topic_arn: require(wire.topic_arn, "TopicArn")?,
                signature: require(wire.signature, "Signature")?,
                signing_cert_url: wire.signing_cert_url,
            })),
            TYPE_SUBSCRIPTION_CONFIRMATION => {
                Ok(Envelope::SubscriptionConfirmation(SubscriptionConfirmation {
                    message_id: require(wire.message_id, "MessageId")?,
                    message: require(wire.message, "Message")?,
                    subscribe_url: require(wire.subscribe_url, "SubscribeURL")?,
                    token: require(wire.token, "Token")?,
                    timestamp: require(wire.timestamp, "Timestamp")?,
                    topic_arn: require(wire.topic_arn, "TopicArn")?,
                    signature: require(wire.signature, "Signature")?,
                    signing_cert_url: wire.signing_cert_url,
                }))
            }
            _ => Ok(Envelope::Unsupported {
                kind,
                message_id: wire.message_id,
            }),
        }
    }

    /// The raw type string of the envelope.
    pub fn kind(&self) -> &str {
        match self {
            Envelope::Notification(_) => TYPE_NOTIFICATION,
            Envelope::SubscriptionConfirmation(_) => TYPE_SUBSCRIPTION_CONFIRMATION,
            Envelope::Unsupported { kind, .. } => kind,
        }
    }

    pub fn message_id(&self) -> Option<&str> {
        match self {
            Envelope::Notification(n) => Some(&n.message_id),
            Envelope::SubscriptionConfirmation(c) => Some(&c.message_id),
            Envelope::Unsupported { message_id, .. } => message_id.as_deref(),
        }
    }

    /// The inner payload string, present on both supported kinds.
    pub fn message(&self) -> Option<&str> {
        match self {
            Envelope::Notification(n) => Some(&n.message),
            Envelope::SubscriptionConfirmation(c) => Some(&c.message),
            Envelope::Unsupported { .. } => None,
        }
    }

    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Envelope::Notification(n) => Some(&n.timestamp),
            Envelope::SubscriptionConfirmation(c) => Some(&c.timestamp),
            Envelope::Unsupported { .. } => None,
        }
    }

    pub fn signature(&self) -> Option<&str> {
        match self {
            Envelope::Notification(n) => Some(&n.signature),
            Envelope::SubscriptionConfirmation(c) => Some(&c.signature),
            Envelope::Unsupported { .. } => None,
        }
    }

    pub fn signing_cert_url(&self) -> Option<&str> {
        match self {
            Envelope::Notification(n) => n.signing_cert_url.as_deref(),
            Envelope::SubscriptionConfirmation(c) => c.signing_cert_url.as_deref(),
            Envelope::Unsupported { .. } => None,
        }
    }

    /// Build the canonical signing string for a supported envelope.
    ///
    /// Fields are concatenated as alternating `name\nvalue\n` lines in the
    /// publisher's documented order; the order must match byte-for-byte or
    /// verification fails. `Subject` participates only when present on a
    /// notification. Returns `None` for unsupported kinds, which cannot be
    /// canonicalized.
    pub fn signing_string(&self) -> Option<String> {
        let mut chunks: Vec<&str> = Vec::new();
        match self {
            Envelope::Notification(n) => {
                chunks.extend(["Message", n.message.as_str(), "MessageId", n.message_id.as_str()]);
                if let Some(subject) = &n.subject {
                    chunks.extend(["Subject", subject.as_str()]);
                }
                chunks.extend([
                    "Timestamp",
                    n.timestamp.as_str(),
                    "TopicArn",
                    n.topic_arn.as_str(),
                    "Type",
                    TYPE_NOTIFICATION,
                ]);
            }
            Envelope::SubscriptionConfirmation(c) => {
                chunks.extend([
                    "Message",
                    c.message.as_str(),
                    "MessageId",
                    c.message_id.as_str(),
                    "SubscribeURL",
                    c.subscribe_url.as_str(),
                    "Timestamp",
                    c.timestamp.as_str(),
                    "Token",
                    c.token.as_str(),
                    "TopicArn",
                    c.topic_arn.as_str(),
                    "Type",
                    TYPE_SUBSCRIPTION_CONFIRMATION,
                ]);
            }
            Envelope::Unsupported { .. } => return None,
        }
        Some(chunks.join("\n") + "\n")
    }
}

fn require(field: Option<String>, name: &str) -> DomainResult<String> {
    field.ok_or_else(|| DomainError::MalformedEnvelope(format!("missing field {name}")))
}
