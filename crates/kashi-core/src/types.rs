//! Shared types for the kashi alignment service.
//!
//! Wire payloads live here so the CLI client and the server agree on shape
//! without the client pulling in the engine.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Name reported by the health endpoint.
pub const SERVICE_NAME: &str = "Japanese Lyrics Alignment";

// ─── Wire types ────────────────────────────────────────────────────────────

/// Body of `POST /align`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignRequest {
    pub audio_url: String,
    pub lyrics: Vec<String>,
}

/// One aligned lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineTiming {
    /// 1-based position in the request's `lyrics`.
    pub line_index: usize,
    pub text: String,
    /// Seconds from the start of the audio.
    pub start: f64,
    pub end: f64,
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            service: SERVICE_NAME.into(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

// ─── Engine configuration ──────────────────────────────────────────────────

/// Runtime configuration for the alignment engine.
#[derive(Debug, Clone)]
pub struct AlignerConfig {
    pub ffmpeg_bin: String,
    pub espeak_bin: String,
    /// Interpreter that has the `aeneas` package installed.
    pub python_bin: String,
    /// aeneas task language code (ISO 639-3).
    pub language: String,
    /// Parent directory for per-request job directories.
    pub work_dir: PathBuf,
    pub sample_rate: u32,
    pub channels: u16,
    pub max_download_bytes: u64,
    pub download_timeout: Duration,
    /// Upper bound for a single ffmpeg or aeneas run.
    pub tool_timeout: Duration,
    /// Upper bound for each startup dependency probe.
    pub check_timeout: Duration,
    pub max_concurrent_jobs: usize,
}

impl AlignerConfig {
    pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;
    pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 200 * 1024 * 1024;
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".into(),
            espeak_bin: "espeak-ng".into(),
            python_bin: "python3".into(),
            language: "jpn".into(),
            work_dir: std::env::temp_dir(),
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            channels: 1,
            max_download_bytes: Self::DEFAULT_MAX_DOWNLOAD_BYTES,
            download_timeout: Duration::from_secs(120),
            tool_timeout: Duration::from_secs(600),
            check_timeout: Duration::from_secs(5),
            max_concurrent_jobs: 2,
        }
    }
}
