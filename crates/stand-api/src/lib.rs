//! Action surface of the stand service.
//!
//! [`ApiHandler`] is the transport-neutral contract; [`DispatcherAdapter`]
//! implements it on top of [`stand_core::Dispatcher`]. The `http` feature
//! mounts it on an axum router, and the notifiers deliver replies to
//! requesters.

mod error;
pub use error::ApiError;

mod handler;
pub use handler::ApiHandler;

mod adapter;
pub use adapter::DispatcherAdapter;

mod notifier;
pub use notifier::{LogNotifier, WebhookNotifier};

#[cfg(feature = "http")]
mod http;

#[cfg(feature = "http")]
pub use http::HttpApi;

#[cfg(feature = "http")]
pub use axum;
