//! Alignment job pipeline.
//!
//! ```text
//! align(request) → validate → JobDir → download → ffmpeg → lyrics.txt
//!     → aeneas → parse sync map → Vec<LineTiming>
//! ```
//!
//! The job directory is removed whether the job succeeds, fails, or the
//! caller drops the future mid-way. A semaphore caps how many jobs run
//! their subprocesses at once; excess callers wait for a slot.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use kashi_core::syncmap::parse_sync_map;
use kashi_core::types::{AlignRequest, AlignerConfig, LineTiming};
use kashi_core::validate::{render_lyrics_file, ValidatedRequest};

use crate::align::run_alignment;
use crate::convert::convert_to_wav;
use crate::download::download_audio;
use crate::error::AlignError;
use crate::staging::JobDir;

/// Cloneable handle to the alignment engine.
#[derive(Clone)]
pub struct AlignService {
    inner: Arc<Inner>,
}

struct Inner {
    config: AlignerConfig,
    client: reqwest::Client,
    jobs: Semaphore,
}

impl AlignService {
    pub fn new(config: AlignerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .build()?;
        let jobs = Semaphore::new(config.max_concurrent_jobs.max(1));
        Ok(Self {
            inner: Arc::new(Inner {
                config,
                client,
                jobs,
            }),
        })
    }

    /// Run one request end to end.
    pub async fn align(&self, request: AlignRequest) -> Result<Vec<LineTiming>, AlignError> {
        let request = request.validate()?;

        let _permit = self.inner.jobs.acquire().await.map_err(|e| {
            AlignError::staging("waiting for a job slot", std::io::Error::other(e))
        })?;

        let job = JobDir::create(&self.inner.config.work_dir).await?;
        let started = Instant::now();
        let result = self.run(&request, &job).await;
        job.close().await;

        match &result {
            Ok(lines) => info!(
                "aligned {} lines in {:.2}s",
                lines.len(),
                started.elapsed().as_secs_f32()
            ),
            Err(e) => warn!("alignment job failed: {e}"),
        }
        result
    }

    async fn run(
        &self,
        request: &ValidatedRequest,
        job: &JobDir,
    ) -> Result<Vec<LineTiming>, AlignError> {
        let config = &self.inner.config;
        debug!("job dir {}", job.path().display());

        let bytes = download_audio(
            &self.inner.client,
            &request.audio_url,
            &job.source_audio(),
            config.max_download_bytes,
        )
        .await?;
        debug!("fetched {bytes} bytes");

        let duration = convert_to_wav(config, &job.source_audio(), &job.converted_audio()).await?;

        tokio::fs::write(job.lyrics_file(), render_lyrics_file(&request.lyrics))
            .await
            .map_err(|e| AlignError::staging("writing lyrics file", e))?;

        info!(
            "aligning {} lines against {duration:.1}s of audio",
            request.lyrics.len()
        );
        run_alignment(
            config,
            &job.converted_audio(),
            &job.lyrics_file(),
            &job.sync_map(),
        )
        .await?;

        let json = tokio::fs::read_to_string(job.sync_map())
            .await
            .map_err(|e| AlignError::staging("reading sync map", e))?;
        Ok(parse_sync_map(&json, &request.lyrics)?)
    }
}
