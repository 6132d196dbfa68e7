mod config;

use anyhow::Result;
use common::elastic::ElasticClient;
use common::sqs::{PollerConfig, SqsClient};
use ingest_worker::{
    ElasticEventRepository, HttpCertificateFetcher, IngestWorker, IngestWorkerConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let config = match config::ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        queue_url = %config.queue_url,
        elastic_url = %config.elastic_url,
        index = %format!("{}YYYY.MM.DD", config.index_prefix),
        document_type = %config.document_type,
        "Starting sift agent"
    );

    if let Err(e) = run(config).await {
        error!("Agent exiting with error: {:#}", e);
        std::process::exit(1);
    }

    info!("Agent exiting normally");
}

async fn run(config: config::ServiceConfig) -> Result<()> {
    let http_timeout = Duration::from_secs(config.http_timeout_secs);

    let queue = Arc::new(SqsClient::from_env(config.queue_url.clone()).await);

    let elastic = ElasticClient::new(&config.elastic_url, http_timeout)?;
    if let Err(e) = elastic.ping().await {
        // Startup continues: per-message submission errors surface downstream
        warn!(error = %e, "Index store health probe failed");
    }
    let repository = Arc::new(ElasticEventRepository::new(elastic));

    let fetcher = Arc::new(HttpCertificateFetcher::new(http_timeout)?);

    let worker = IngestWorker::new(
        queue,
        fetcher,
        repository,
        None,
        IngestWorkerConfig {
            index_prefix: config.index_prefix,
            document_type: config.document_type,
            certificate_cache_capacity: config.cert_cache_capacity,
            certificate_cache_ttl: Duration::from_secs(config.cert_cache_ttl_days * 24 * 3600),
            poller: PollerConfig {
                max_messages: config.max_messages,
                visibility_timeout_secs: config.visibility_timeout_secs,
                wait_secs: config.wait_secs,
                poll_interval: Duration::from_millis(config.poll_interval_ms),
                cool_off: Duration::from_secs(config.cool_off_secs),
            },
        },
    );

    let token = CancellationToken::new();
    let mut worker_task = tokio::spawn({
        let token = token.clone();
        async move { worker.run(token).await }
    });

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Received shutdown signal, stopping agent");
            token.cancel();
            worker_task.await??;
        }
        result = &mut worker_task => {
            // The poller only returns on cancellation or a wiring error
            result??;
        }
    }

    info!("Agent stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                let _ = ctrl_c.await;
                return;
            }
        };

        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
