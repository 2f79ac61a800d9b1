//! Production capabilities backed by the host: the docker CLI, HTTP
//! downloads, `unzip` and plain HTTP health checks.

mod error;
pub use error::{ExecError, ExecResult};

mod cmd;

pub mod docker;
pub use docker::DockerCli;

pub mod archive;
pub use archive::{ArchiveSettings, DiagnosticArchiveSource};

mod probe;
pub use probe::HttpHealthProbe;
