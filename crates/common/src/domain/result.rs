use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Unsupported envelope type: {0}")]
    UnsupportedType(String),

    #[error("Envelope carries no signing certificate URL")]
    MissingCertUrl,

    #[error("Invalid message signature: {0}")]
    InvalidSignature(String),

    #[error("Certificate fetch failed for {url}: {reason}")]
    CertificateFetch { url: String, reason: String },

    #[error("Invalid envelope timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Index submission failed: {0}")]
    IndexSubmission(String),

    #[error("Queue receive failed: {0}")]
    QueueReceive(String),

    #[error("Queue delete failed: {0}")]
    QueueDelete(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}
