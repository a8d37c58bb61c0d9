//! External command runner — ffmpeg, aeneas, and the startup probes all go
//! through here.

use std::ffi::OsStr;
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

/// Captured stdout of a successful run. stderr is logged, or carried by
/// [`ToolError::Failed`].
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{program} not found")]
    NotFound { program: String },
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} timed out after {}s", .timeout.as_secs_f32())]
    TimedOut { program: String, timeout: Duration },
    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Run `program` to completion, failing on spawn errors, a non-zero exit
/// or when `timeout` elapses. The child is killed if the future is dropped.
pub async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<ToolOutput, ToolError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = tokio::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    debug!("running {program}");
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Err(_) => {
            return Err(ToolError::TimedOut {
                program: program.to_string(),
                timeout,
            });
        }
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ToolError::NotFound {
                program: program.to_string(),
            });
        }
        Ok(Err(source)) => {
            return Err(ToolError::Spawn {
                program: program.to_string(),
                source,
            });
        }
        Ok(Ok(output)) => output,
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    for line in stderr.lines() {
        debug!("[{program}] {line}");
    }

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(ToolOutput { stdout })
}
