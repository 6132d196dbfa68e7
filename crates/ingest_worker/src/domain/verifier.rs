use crate::domain::CertificateCache;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use common::domain::{CertificateFetcher, DomainError, DomainResult, Envelope};
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::signature::Verifier;
use rsa::RsaPublicKey;
use sha1::Sha1;
use std::sync::Arc;
use tracing::debug;

/// Trait for envelope signature verification.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait EnvelopeVerifier: Send + Sync {
    /// Prove that the envelope was signed by the publisher whose
    /// certificate it names. An `Ok` return is the only permission the
    /// pipeline has to index and delete a message.
    async fn verify(&self, envelope: &Envelope) -> DomainResult<()>;
}

/// Verifies envelopes against their publisher certificates.
///
/// Certificates resolve through the bounded cache; a miss fetches over
/// HTTPS and populates the cache, the only side effect of verification.
pub struct MessageVerifier {
    cache: CertificateCache,
    fetcher: Arc<dyn CertificateFetcher>,
}

impl MessageVerifier {
    pub fn new(cache: CertificateCache, fetcher: Arc<dyn CertificateFetcher>) -> Self {
        Self { cache, fetcher }
    }

    async fn signing_certificate(&self, url: &str) -> DomainResult<Bytes> {
        if let Some(certificate) = self.cache.get(url) {
            return Ok(certificate);
        }

        // Two concurrent misses on the same URL may both fetch; the second
        // insert wins and the extra fetch is harmless.
        debug!(%url, "Signing certificate not cached, fetching");
        let certificate = self.fetcher.fetch(url).await?;
        self.cache.put(url, certificate.clone());
        Ok(certificate)
    }
}

#[async_trait]
impl EnvelopeVerifier for MessageVerifier {
    async fn verify(&self, envelope: &Envelope) -> DomainResult<()> {
        let signing_string = match envelope.signing_string() {
            Some(signing_string) => signing_string,
            None => return Err(DomainError::UnsupportedType(envelope.kind().to_string())),
        };

        let cert_url = envelope
            .signing_cert_url()
            .filter(|url| !url.is_empty())
            .ok_or(DomainError::MissingCertUrl)?;

        // Supported envelope kinds always carry a signature.
        let signature_b64 = envelope.signature().unwrap_or_default();

        let certificate = self.signing_certificate(cert_url).await?;
        verify_rsa_sha1(&certificate, signing_string.as_bytes(), signature_b64)?;

        debug!(
            message_id = envelope.message_id().unwrap_or("unknown"),
            "Envelope signature verified"
        );
        Ok(())
    }
}

/// RSA PKCS#1 v1.5 over a SHA-1 digest, the publisher's documented scheme.
fn verify_rsa_sha1(
    certificate_pem: &[u8],
    signing_string: &[u8],
    signature_b64: &str,
) -> DomainResult<()> {
    let public_key = public_key_from_pem(certificate_pem)?;

    let signature_bytes = BASE64
        .decode(signature_b64)
        .map_err(|e| DomainError::InvalidSignature(format!("signature is not valid base64: {e}")))?;
    let signature = Signature::try_from(signature_bytes.as_slice())
        .map_err(|e| DomainError::InvalidSignature(format!("signature is malformed: {e}")))?;

    VerifyingKey::<Sha1>::new(public_key)
        .verify(signing_string, &signature)
        .map_err(|_| {
            DomainError::InvalidSignature("signature does not match signing string".to_string())
        })
}

fn public_key_from_pem(certificate_pem: &[u8]) -> DomainResult<RsaPublicKey> {
    let (_, pem) = x509_parser::pem::parse_x509_pem(certificate_pem)
        .map_err(|e| DomainError::InvalidSignature(format!("certificate is not valid PEM: {e}")))?;
    let certificate = pem
        .parse_x509()
        .map_err(|e| DomainError::InvalidSignature(format!("certificate is not valid X.509: {e}")))?;

    RsaPublicKey::from_public_key_der(certificate.tbs_certificate.subject_pki.raw).map_err(|e| {
        DomainError::InvalidSignature(format!("certificate does not carry an RSA public key: {e}"))
    })
}
