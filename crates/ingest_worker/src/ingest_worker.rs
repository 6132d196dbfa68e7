use crate::domain::{
    CertificateCache, EnvelopeVerifier, EventIndexService, EventIndexer, MessageVerifier,
    NotificationService,
};
use crate::sqs::create_notification_processor;
use common::domain::{
    CertificateFetcher, Clock, EventDocumentRepository, PayloadTransform, SystemClock,
};
use common::sqs::{NotificationQueue, PollerConfig, QueuePoller};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct IngestWorkerConfig {
    pub index_prefix: String,
    pub document_type: String,
    pub certificate_cache_capacity: usize,
    pub certificate_cache_ttl: Duration,
    pub poller: PollerConfig,
}

impl Default for IngestWorkerConfig {
    fn default() -> Self {
        Self {
            index_prefix: "events-".to_string(),
            document_type: "event".to_string(),
            certificate_cache_capacity: 100,
            certificate_cache_ttl: Duration::from_secs(14 * 24 * 3600),
            poller: PollerConfig::default(),
        }
    }
}

/// The verify-and-index pipeline, wired and ready to run.
pub struct IngestWorker {
    poller: QueuePoller,
}

impl IngestWorker {
    pub fn new(
        queue: Arc<dyn NotificationQueue>,
        fetcher: Arc<dyn CertificateFetcher>,
        repository: Arc<dyn EventDocumentRepository>,
        transform: Option<PayloadTransform>,
        config: IngestWorkerConfig,
    ) -> Self {
        Self::with_clock(queue, fetcher, repository, transform, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        queue: Arc<dyn NotificationQueue>,
        fetcher: Arc<dyn CertificateFetcher>,
        repository: Arc<dyn EventDocumentRepository>,
        transform: Option<PayloadTransform>,
        config: IngestWorkerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        info!(
            index_prefix = %config.index_prefix,
            document_type = %config.document_type,
            "Initializing ingest worker"
        );

        let cache = CertificateCache::new(
            config.certificate_cache_capacity,
            config.certificate_cache_ttl,
            clock.clone(),
        );
        let verifier: Arc<dyn EnvelopeVerifier> = Arc::new(MessageVerifier::new(cache, fetcher));
        let indexer: Arc<dyn EventIndexer> = Arc::new(EventIndexService::new(
            repository,
            clock,
            config.index_prefix,
            config.document_type,
            transform,
        ));
        let service = Arc::new(NotificationService::new(verifier, indexer));

        let processor = create_notification_processor(service);
        let poller = QueuePoller::new(queue, config.poller, processor);

        Self { poller }
    }

    /// Run the poll loop until the token cancels.
    pub async fn run(&self, ctx: CancellationToken) -> anyhow::Result<()> {
        self.poller.run(ctx).await
    }
}
