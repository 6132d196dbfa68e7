pub mod domain;
pub mod elastic;
pub mod http;
pub mod ingest_worker;
pub mod sqs;

pub use domain::*;
pub use elastic::*;
pub use http::*;
pub use ingest_worker::*;
pub use sqs::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockEnvelopeVerifier;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockEventIndexer;
