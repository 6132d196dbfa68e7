use crate::domain::result::DomainResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Retrieves raw signing-certificate bytes for a certificate URL.
///
/// Implementations perform a plain HTTPS GET with no custom headers or
/// auth. Caching sits above this trait, not inside implementations.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> DomainResult<Bytes>;
}
