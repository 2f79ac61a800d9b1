//! Logging setup and the log-line view of session events.

mod logger;
pub use logger::*;

mod subscriber;
pub use subscriber::*;
