use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry, proto::MetricFamily};
use stand_core::{Event, EventKind, Subscribe};

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    events_total: IntCounterVec,
    stage_failures_total: IntCounterVec,
    deployments_total: IntCounter,
    queue_length: IntGauge,
}

impl PrometheusMetrics {
    /// Metrics on a fresh registry.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> Result<Self, prometheus::Error> {
        let events_total = IntCounterVec::new(
            Opts::new("stand_events_total", "Session events by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(events_total.clone()))?;

        let stage_failures_total = IntCounterVec::new(
            Opts::new(
                "stand_stage_failures_total",
                "Deployment runs aborted, by stage and error kind",
            ),
            &["stage", "error_kind"],
        )?;
        registry.register(Box::new(stage_failures_total.clone()))?;

        let deployments_total = IntCounter::new(
            "stand_deployments_total",
            "Deployments that reached the ready state",
        )?;
        registry.register(Box::new(deployments_total.clone()))?;

        let queue_length = IntGauge::new("stand_queue_length", "Requesters waiting for the stand")?;
        registry.register(Box::new(queue_length.clone()))?;

        Ok(Self {
            registry,
            events_total,
            stage_failures_total,
            deployments_total,
            queue_length,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        self.registry.gather()
    }

    fn record(&self, event: &Event) {
        self.events_total
            .with_label_values(&[event.kind.as_str()])
            .inc();

        if let Some(len) = event.queue_len {
            self.queue_length.set(i64::try_from(len).unwrap_or(i64::MAX));
        }

        match event.kind {
            EventKind::StageFailed => {
                let stage = event.stage.map(|s| s.as_str()).unwrap_or("unknown");
                let kind = event.reason.as_deref().unwrap_or("unknown");
                self.stage_failures_total
                    .with_label_values(&[stage, kind])
                    .inc();
            }
            EventKind::DeploymentReady => self.deployments_total.inc(),
            _ => {}
        }
    }
}

impl Subscribe for PrometheusMetrics {
    fn on_event(&self, event: &Event) {
        self.record(event);
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics").finish_non_exhaustive()
    }
}
