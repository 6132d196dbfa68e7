pub mod domain;
pub mod elastic;
pub mod sqs;

pub use domain::*;
pub use elastic::*;
pub use sqs::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockCertificateFetcher;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockClock;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockEventDocumentRepository;
#[cfg(any(test, feature = "testing"))]
pub use sqs::MockNotificationQueue;
