use axum::http::StatusCode;
use thiserror::Error;

use kashi_core::syncmap::SyncMapError;
use kashi_core::validate::ValidationError;

/// Failure of one alignment job, classified by which side is at fault.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Failed to download audio: {0}")]
    Download(String),
    #[error("Audio conversion failed: {0}")]
    Conversion(String),
    #[error("Aeneas alignment failed: {0}")]
    Alignment(String),
    #[error("Failed to parse Aeneas output: {0}")]
    SyncMap(#[from] SyncMapError),
    #[error("I/O error while {context}: {source}")]
    Staging {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

impl AlignError {
    pub(crate) fn staging(context: &'static str, source: std::io::Error) -> Self {
        Self::Staging { context, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Download(_) => StatusCode::BAD_REQUEST,
            Self::Conversion(_) | Self::Alignment(_) | Self::SyncMap(_) | Self::Staging { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Client-facing message. A fragment/lyric count mismatch is reported
    /// without the parse prefix since the output itself was well-formed.
    pub fn detail(&self) -> String {
        match self {
            Self::SyncMap(e @ SyncMapError::CountMismatch { .. }) => e.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_faults_map_to_4xx() {
        let v = AlignError::from(ValidationError::EmptyLyrics);
        assert_eq!(v.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(v.detail(), "lyrics cannot be empty");

        let d = AlignError::Download("HTTP 404 Not Found".into());
        assert_eq!(d.status(), StatusCode::BAD_REQUEST);
        assert_eq!(d.detail(), "Failed to download audio: HTTP 404 Not Found");
    }

    #[test]
    fn engine_faults_map_to_500() {
        for e in [
            AlignError::Conversion("bad codec".into()),
            AlignError::Alignment("boom".into()),
            AlignError::SyncMap(SyncMapError::MissingTiming { index: 1 }),
            AlignError::staging("creating job dir", std::io::Error::other("disk full")),
        ] {
            assert_eq!(e.status(), StatusCode::INTERNAL_SERVER_ERROR, "{e}");
        }
    }

    #[test]
    fn mismatch_detail_has_no_parse_prefix() {
        let e = AlignError::SyncMap(SyncMapError::CountMismatch {
            fragments: 3,
            lyrics: 4,
        });
        assert_eq!(e.detail(), "Alignment mismatch: 3 fragments for 4 lyrics");

        let e = AlignError::SyncMap(SyncMapError::MissingTiming { index: 2 });
        assert_eq!(
            e.detail(),
            "Failed to parse Aeneas output: Fragment 2 has no timing information"
        );
    }
}
