//! Source audio downloader — streams the response body to the job directory.

use std::path::Path;

use futures_util::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use url::Url;

use crate::error::AlignError;

/// Download `url` into `dest`, refusing bodies larger than `max_bytes`.
///
/// Returns the number of bytes written. Any partial file is left in place
/// for the job directory cleanup to remove.
pub async fn download_audio(
    client: &reqwest::Client,
    url: &Url,
    dest: &Path,
    max_bytes: u64,
) -> Result<u64, AlignError> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AlignError::Download(format!("request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AlignError::Download(format!("HTTP {status}")));
    }

    if let Some(len) = resp.content_length() {
        if len > max_bytes {
            return Err(AlignError::Download(format!(
                "file is {len} bytes, limit is {max_bytes}"
            )));
        }
    }

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| AlignError::staging("creating download file", e))?;

    let mut bytes_done: u64 = 0;
    let mut stream = resp.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| AlignError::Download(format!("stream error: {e}")))?;
        bytes_done += chunk.len() as u64;
        if bytes_done > max_bytes {
            return Err(AlignError::Download(format!(
                "file exceeds the {max_bytes} byte limit"
            )));
        }
        file.write_all(&chunk)
            .await
            .map_err(|e| AlignError::staging("writing download file", e))?;
    }

    file.flush()
        .await
        .map_err(|e| AlignError::staging("flushing download file", e))?;

    if bytes_done == 0 {
        return Err(AlignError::Download("response body is empty".into()));
    }

    debug!("downloaded {bytes_done} bytes from {}", url.host_str().unwrap_or("?"));
    Ok(bytes_done)
}
