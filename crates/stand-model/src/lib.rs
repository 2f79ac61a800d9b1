//! Data types shared by the stand service crates.
//!
//! Everything here is plain data: no I/O, no locking. The session and queue
//! logic that mutates these values lives in `stand-core`.

mod requester;
pub use requester::{Requester, RequesterId};

mod version;
pub use version::VersionInfo;

mod session_status;
pub use session_status::SessionStatus;

mod remote_status;
pub use remote_status::RemoteStatus;

mod task_execution;
pub use task_execution::{TaskExecution, TaskParam};

mod artifact;
pub use artifact::ArtifactReference;

mod stage;
pub use stage::Stage;

/// Deterministic container/image name for one holder and one parsed version.
pub type ResourceKey = String;

mod action;
pub use action::ActionToken;
