//! Prometheus view of the stand service.
//!
//! [`PrometheusMetrics`] is an event-bus subscriber; register it with the
//! [`EventBus`](stand_core::EventBus) and serve [`PrometheusMetrics::gather`]
//! from the application's HTTP server.
//!
//! ## Metrics
//! - `stand_events_total{kind}` - Counter
//! - `stand_stage_failures_total{stage, error_kind}` - Counter
//! - `stand_deployments_total` - Counter
//! - `stand_queue_length` - Gauge

mod backend;
pub use backend::PrometheusMetrics;

pub use prometheus::{Encoder, Registry, TextEncoder};
