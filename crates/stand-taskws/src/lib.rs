//! Client for the application's task web service.
//!
//! Tasks are started with an `executeTaskRequest` envelope and observed with
//! `getTaskStatusRequest`; both are XML over HTTP POST with basic auth.

mod config;
pub use config::TaskWsSettings;

mod envelope;

mod client;
pub use client::TaskWsClient;
