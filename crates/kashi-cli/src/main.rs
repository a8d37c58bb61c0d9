//! kashi CLI — lyrics alignment server.
//!
//! ```text
//! kashi serve [--port 8000] [--host 0.0.0.0] [--language jpn]
//! kashi check
//! kashi align --audio-url https://... --lyrics lyrics.txt [--server http://localhost:8000]
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use kashi_lib::deps::check_dependencies;
use kashi_lib::kashi_core::types::{AlignRequest, AlignerConfig};
use kashi_lib::pipeline::AlignService;

/// kashi — forced alignment of lyric lines to audio
#[derive(Parser)]
#[command(name = "kashi", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the alignment server
    Serve(ServeArgs),
    /// Verify ffmpeg, espeak-ng and aeneas are installed
    Check(ToolArgs),
    /// Send an alignment request to a running server
    Align {
        /// Public http(s) URL of the audio file
        #[arg(long)]
        audio_url: String,
        /// Text file with one lyric line per line
        #[arg(long)]
        lyrics: PathBuf,
        /// Server URL
        #[arg(long, default_value = "http://localhost:8000")]
        server: String,
    },
}

#[derive(Args)]
struct ToolArgs {
    /// ffmpeg binary
    #[arg(long, env = "KASHI_FFMPEG", default_value = "ffmpeg")]
    ffmpeg: String,
    /// espeak-ng binary used by aeneas for reference speech
    #[arg(long, env = "KASHI_ESPEAK", default_value = "espeak-ng")]
    espeak: String,
    /// Python interpreter with the aeneas package installed
    #[arg(long, env = "KASHI_PYTHON", default_value = "python3")]
    python: String,
}

#[derive(Args)]
struct ServeArgs {
    /// Listen port
    #[arg(long, env = "KASHI_PORT", default_value = "8000")]
    port: u16,
    /// Listen host
    #[arg(long, env = "KASHI_HOST", default_value = "0.0.0.0")]
    host: String,
    #[command(flatten)]
    tools: ToolArgs,
    /// aeneas task language
    #[arg(long, env = "KASHI_LANGUAGE", default_value = "jpn")]
    language: String,
    /// Directory for per-request scratch files [default: system temp dir]
    #[arg(long, env = "KASHI_WORK_DIR")]
    work_dir: Option<PathBuf>,
    /// Jobs allowed to run at once
    #[arg(long, env = "KASHI_MAX_CONCURRENT_JOBS", default_value = "2")]
    max_concurrent_jobs: usize,
    /// Largest accepted audio download, in MiB
    #[arg(long, env = "KASHI_MAX_DOWNLOAD_MB", default_value = "200")]
    max_download_mb: u64,
    /// Timeout for fetching the audio file
    #[arg(long, env = "KASHI_DOWNLOAD_TIMEOUT_SECS", default_value = "120")]
    download_timeout_secs: u64,
    /// Timeout for each ffmpeg or aeneas run
    #[arg(long, env = "KASHI_TOOL_TIMEOUT_SECS", default_value = "600")]
    tool_timeout_secs: u64,
}

impl ToolArgs {
    fn apply(self, config: AlignerConfig) -> AlignerConfig {
        AlignerConfig {
            ffmpeg_bin: self.ffmpeg,
            espeak_bin: self.espeak,
            python_bin: self.python,
            ..config
        }
    }
}

impl ServeArgs {
    fn config(self) -> AlignerConfig {
        let defaults = AlignerConfig::default();
        let config = AlignerConfig {
            language: self.language,
            work_dir: self.work_dir.unwrap_or_else(std::env::temp_dir),
            max_concurrent_jobs: self.max_concurrent_jobs,
            max_download_bytes: self.max_download_mb.saturating_mul(1024 * 1024),
            download_timeout: Duration::from_secs(self.download_timeout_secs),
            tool_timeout: Duration::from_secs(self.tool_timeout_secs),
            ..defaults
        };
        self.tools.apply(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kashi_lib=info,kashi=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Check(tools) => check(tools).await,
        Command::Align {
            audio_url,
            lyrics,
            server,
        } => align(&server, audio_url, &lyrics).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: ServeArgs) -> Result<(), String> {
    let addr = format!("{}:{}", args.host, args.port);
    let config = args.config();

    check_dependencies(&config)
        .await
        .ensure()
        .map_err(|e| e.to_string())?;

    let service =
        AlignService::new(config).map_err(|e| format!("failed to build HTTP client: {e}"))?;
    let app = kashi_lib::server::router(service);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;
    info!("kashi listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {e}"))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn check(tools: ToolArgs) -> Result<(), String> {
    let config = tools.apply(AlignerConfig::default());
    let report = check_dependencies(&config).await;
    for c in &report.checks {
        match &c.problem {
            None => println!("✓ {}", c.name),
            Some(p) => println!("✗ {}: {p}", c.name),
        }
    }
    report.ensure().map_err(|e| e.to_string())
}

async fn align(server: &str, audio_url: String, lyrics: &Path) -> Result<(), String> {
    let text = tokio::fs::read_to_string(lyrics)
        .await
        .map_err(|e| format!("failed to read {}: {e}", lyrics.display()))?;
    let req = AlignRequest {
        audio_url,
        lyrics: text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect(),
    };

    let resp = reqwest::Client::new()
        .post(format!("{}/align", server.trim_end_matches('/')))
        .json(&req)
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    let status = resp.status();
    let body: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| format!("invalid response ({status}): {e}"))?;
    let pretty = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());

    if status.is_success() {
        println!("{pretty}");
        Ok(())
    } else {
        Err(format!("alignment failed ({status}): {pretty}"))
    }
}
