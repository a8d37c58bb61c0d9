//! Per-request scratch directory.
//!
//! Every job gets its own directory under the configured work dir. It is
//! removed by [`JobDir::close`] on the success path and by `Drop` on every
//! other path, including panics and cancelled requests. Creation and
//! `close` run on the blocking pool; `Drop` removes synchronously.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::warn;

use crate::error::AlignError;

pub struct JobDir {
    dir: TempDir,
}

impl JobDir {
    pub async fn create(work_dir: &Path) -> Result<Self, AlignError> {
        let work_dir = work_dir.to_path_buf();
        tokio::task::spawn_blocking(move || Self::create_blocking(&work_dir))
            .await
            .map_err(|e| AlignError::staging("creating job dir", std::io::Error::other(e)))?
    }

    fn create_blocking(work_dir: &Path) -> Result<Self, AlignError> {
        std::fs::create_dir_all(work_dir)
            .map_err(|e| AlignError::staging("creating work dir", e))?;
        let dir = tempfile::Builder::new()
            .prefix("kashi-")
            .tempdir_in(work_dir)
            .map_err(|e| AlignError::staging("creating job dir", e))?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Downloaded file, format unknown until ffmpeg reads it.
    pub fn source_audio(&self) -> PathBuf {
        self.dir.path().join("audio_source")
    }

    pub fn converted_audio(&self) -> PathBuf {
        self.dir.path().join("converted.wav")
    }

    pub fn lyrics_file(&self) -> PathBuf {
        self.dir.path().join("lyrics.txt")
    }

    pub fn sync_map(&self) -> PathBuf {
        self.dir.path().join("alignment.json")
    }

    /// Remove the directory now. Failures are logged, never returned.
    pub async fn close(self) {
        let path = self.dir.path().to_path_buf();
        let removed = tokio::task::spawn_blocking(move || self.dir.close()).await;
        match removed {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("failed to remove job dir {}: {e}", path.display()),
            Err(e) => warn!("cleanup task for {} failed: {e}", path.display()),
        }
    }
}
