//! Startup dependency check — ffmpeg, espeak-ng and the aeneas package.
//!
//! All probes run; the report lists every problem at once so an operator
//! can fix the host in one pass.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info};

use kashi_core::types::AlignerConfig;

use crate::tool::{run_tool, ToolError};

const AENEAS_IMPORT: &str = "import aeneas; from aeneas.tools import execute_task";

/// Outcome of one probe.
#[derive(Debug, Clone)]
pub struct DependencyCheck {
    pub name: &'static str,
    pub problem: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DependencyReport {
    pub checks: Vec<DependencyCheck>,
}

#[derive(Debug, Error)]
#[error("{banner}")]
pub struct DependencyError {
    banner: String,
}

impl DependencyReport {
    pub fn problems(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().filter_map(|c| c.problem.as_deref())
    }

    pub fn is_ok(&self) -> bool {
        self.problems().next().is_none()
    }

    /// `Ok` when every probe passed, otherwise an error whose message is the
    /// full operator-facing banner.
    pub fn ensure(&self) -> Result<(), DependencyError> {
        if self.is_ok() {
            info!("all dependencies verified: ffmpeg, espeak-ng, aeneas");
            return Ok(());
        }

        let rule = "=".repeat(60);
        let list: Vec<String> = self.problems().map(|p| format!("  - {p}")).collect();
        Err(DependencyError {
            banner: format!(
                "\n{rule}\nDEPENDENCY CHECK FAILED\n\
                 The following required dependencies are missing or broken:\n\n\
                 {}\n\n\
                 Please install all dependencies before starting the server.\n{rule}\n",
                list.join("\n")
            ),
        })
    }
}

pub async fn check_dependencies(config: &AlignerConfig) -> DependencyReport {
    let timeout = config.check_timeout;
    let (ffmpeg, espeak, aeneas) = tokio::join!(
        probe_binary("ffmpeg", &config.ffmpeg_bin, "-version", timeout),
        probe_binary("espeak-ng", &config.espeak_bin, "--version", timeout),
        probe_aeneas(&config.python_bin, timeout),
    );
    DependencyReport {
        checks: vec![ffmpeg, espeak, aeneas],
    }
}

async fn probe_binary(
    name: &'static str,
    program: &str,
    flag: &str,
    timeout: Duration,
) -> DependencyCheck {
    let problem = match run_tool(program, [flag], timeout).await {
        Ok(out) => {
            debug!("{name}: {}", out.stdout.lines().next().unwrap_or("").trim());
            None
        }
        Err(ToolError::NotFound { .. }) => Some(format!(
            "{name} not found. Install with: brew install {name} (macOS) or apt-get install {name} (Linux)"
        )),
        Err(ToolError::TimedOut { .. }) => Some(format!("{name} check timed out")),
        Err(_) => Some(format!("{name} is installed but returned an error")),
    };
    DependencyCheck { name, problem }
}

async fn probe_aeneas(python: &str, timeout: Duration) -> DependencyCheck {
    let problem = match run_tool(python, ["-c", AENEAS_IMPORT], timeout).await {
        Ok(_) => None,
        Err(ToolError::NotFound { .. }) => {
            Some(format!("{python} not found; a Python interpreter is required to run aeneas"))
        }
        Err(ToolError::TimedOut { .. }) => Some("aeneas check timed out".to_string()),
        Err(ToolError::Failed { stderr, .. }) => {
            let reason = stderr.lines().last().unwrap_or("import failed");
            Some(format!(
                "aeneas Python module not found. Install with: pip3 install aeneas. Error: {reason}"
            ))
        }
        Err(e) => Some(format!("aeneas check failed: {e}")),
    };
    DependencyCheck {
        name: "aeneas",
        problem,
    }
}
