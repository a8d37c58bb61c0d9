//! aeneas invocation — `python -m aeneas.tools.execute_task`.

use std::ffi::OsString;
use std::path::Path;

use kashi_core::syncmap::task_config;
use kashi_core::types::AlignerConfig;

use crate::error::AlignError;
use crate::tool::{run_tool, ToolError};

const EXECUTE_TASK: &str = "aeneas.tools.execute_task";

/// Argument vector for one alignment task, after the interpreter.
fn task_args(config: &AlignerConfig, audio: &Path, text: &Path, output: &Path) -> Vec<OsString> {
    vec![
        "-m".into(),
        EXECUTE_TASK.into(),
        audio.into(),
        text.into(),
        task_config(&config.language).into(),
        output.into(),
        format!("-r=tts=espeak-ng|tts_path={}", config.espeak_bin).into(),
    ]
}

/// Align the plain-text `text` against `audio`, writing a JSON sync map to
/// `output`.
pub async fn run_alignment(
    config: &AlignerConfig,
    audio: &Path,
    text: &Path,
    output: &Path,
) -> Result<(), AlignError> {
    let args = task_args(config, audio, text, output);

    run_tool(&config.python_bin, args, config.tool_timeout)
        .await
        .map_err(|e| match e {
            ToolError::NotFound { .. } => {
                AlignError::Alignment("Aeneas not found. Please install aeneas.".into())
            }
            ToolError::Failed { stderr, .. } => AlignError::Alignment(stderr),
            other => AlignError::Alignment(other.to_string()),
        })?;

    if !output.is_file() {
        return Err(AlignError::Alignment("no sync map was written".into()));
    }
    Ok(())
}
