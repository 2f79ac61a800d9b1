mod config;

use std::{sync::Arc, time::Duration};

use stand_api::{DispatcherAdapter, HttpApi, LogNotifier, WebhookNotifier};
use stand_core::{Capabilities, Dispatcher, EventBus, Notifier, Subscribe};
use stand_exec::{DiagnosticArchiveSource, DockerCli, HttpHealthProbe};
use stand_observe::{Journal, logger_init};
use stand_prometheus::PrometheusMetrics;
use stand_taskws::TaskWsClient;
use tracing::{info, warn};

use crate::config::DaemonConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Config + logger
    let (cfg, source) = DaemonConfig::load()?;
    logger_init(&cfg.logger)?;
    match &source {
        Some(path) => info!(path = %path.display(), "configuration loaded"),
        None => info!("no configuration file, using defaults"),
    }

    let mut stand = cfg.stand.clone();
    stand.validate()?;
    if stand.access.public_host.trim().is_empty() {
        stand.access.public_host = hostname::get()?.to_string_lossy().into_owned();
    }

    // 2) Event subscribers
    let metrics = Arc::new(PrometheusMetrics::new()?);
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(Journal::new()), metrics.clone()];
    let events = EventBus::new(subscribers);

    // 3) Capabilities
    let notifier: Arc<dyn Notifier> = match cfg.webhook_url.as_deref() {
        Some(url) => {
            info!(url, "notifications go to webhook");
            Arc::new(WebhookNotifier::new(reqwest::Client::new(), url))
        }
        None => {
            warn!("no webhook configured, notifications are only logged");
            Arc::new(LogNotifier)
        }
    };
    let caps = Capabilities {
        runtime: Arc::new(DockerCli::with_program(cfg.docker_program.clone())),
        artifacts: Arc::new(DiagnosticArchiveSource::new(
            reqwest::Client::new(),
            cfg.archive_settings(),
        )),
        transport: Arc::new(TaskWsClient::new(&cfg.task_ws)?),
        probe: Arc::new(HttpHealthProbe::new(
            stand.access.health_url(),
            Duration::from_secs(cfg.probe_timeout_secs),
        )?),
        notifier,
    };
    info!(
        access = %stand.access.access_url(),
        task_ws = %cfg.task_ws.endpoint(),
        "capabilities wired"
    );

    // 4) Dispatcher + HTTP surface
    let dispatcher = Dispatcher::new(Arc::new(stand), caps, events);
    let router = HttpApi::new(Arc::new(DispatcherAdapter::new(dispatcher)))
        .with_metrics(metrics.registry().clone())
        .router();

    let listener = tokio::net::TcpListener::bind(cfg.listen).await?;
    info!(listen = %cfg.listen, "standd is running");

    stand_api::axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
