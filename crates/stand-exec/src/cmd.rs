use std::process::Stdio;

use tokio::process::Command;
use tracing::trace;

use crate::error::{ExecError, ExecResult};

/// Captured output of a finished command.
pub(crate) struct Output {
    pub stdout: String,
}

/// Run `program` to completion; a non-zero exit is an error carrying stderr.
pub(crate) async fn run(program: &str, args: &[String]) -> ExecResult<Output> {
    trace!(program, ?args, "spawn");

    let out = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ExecError::Spawn {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !out.status.success() {
        return Err(ExecError::NonZeroExit {
            program: program.to_string(),
            code: out.status.code(),
            stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(Output {
        stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
    })
}

/// Build an owned argument vector from string-likes.
pub(crate) fn args<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = run("stand-exec-definitely-missing", &[]).await.err().unwrap();
        assert!(matches!(err, ExecError::Spawn { .. }));
    }
}
