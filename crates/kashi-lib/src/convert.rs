//! ffmpeg conversion to the mono 16 kHz WAV that aeneas expects.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::debug;

use kashi_core::types::AlignerConfig;
use kashi_core::wav::{read_wav_info, WavError, WavInfo};

use crate::error::AlignError;
use crate::tool::{run_tool, ToolError};

/// Convert `input` (any format ffmpeg can read) into `output` and check the
/// result. Returns the audio duration in seconds.
pub async fn convert_to_wav(
    config: &AlignerConfig,
    input: &Path,
    output: &Path,
) -> Result<f64, AlignError> {
    let channels = config.channels.to_string();
    let rate = config.sample_rate.to_string();
    // No source tags, so the output has no LIST chunk to skip.
    let args: [&OsStr; 12] = [
        OsStr::new("-hide_banner"),
        OsStr::new("-nostdin"),
        OsStr::new("-i"),
        input.as_os_str(),
        OsStr::new("-map_metadata"),
        OsStr::new("-1"),
        OsStr::new("-ac"),
        OsStr::new(&channels),
        OsStr::new("-ar"),
        OsStr::new(&rate),
        OsStr::new("-y"),
        output.as_os_str(),
    ];

    run_tool(&config.ffmpeg_bin, args, config.tool_timeout)
        .await
        .map_err(|e| match e {
            ToolError::NotFound { .. } => {
                AlignError::Conversion("ffmpeg not found. Please install ffmpeg.".into())
            }
            ToolError::Failed { stderr, .. } => AlignError::Conversion(stderr),
            other => AlignError::Conversion(other.to_string()),
        })?;

    let info = inspect_output(output.to_path_buf()).await?;
    info.check_normalized(config.sample_rate, config.channels)
        .map_err(AlignError::Conversion)?;

    let duration = info.duration_secs();
    debug!("converted audio: {duration:.2}s");
    Ok(duration)
}

async fn inspect_output(path: PathBuf) -> Result<WavInfo, AlignError> {
    let read = tokio::task::spawn_blocking(move || -> Result<WavInfo, WavError> {
        let mut file = std::fs::File::open(&path)?;
        let file_len = file.metadata()?.len();
        read_wav_info(&mut file, file_len)
    });
    match read.await {
        Ok(Ok(info)) => Ok(info),
        Ok(Err(WavError::Invalid(e))) => Err(AlignError::Conversion(format!(
            "output is not a valid WAV file: {e}"
        ))),
        Ok(Err(WavError::Io(e))) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(AlignError::Conversion(format!("no output produced: {e}")))
        }
        Ok(Err(WavError::Io(e))) => Err(AlignError::staging("reading converted audio", e)),
        Err(e) => Err(AlignError::staging(
            "reading converted audio",
            std::io::Error::other(e),
        )),
    }
}
