//! aeneas sync-map handling — task configuration and JSON output parsing.
//!
//! aeneas writes one fragment per line of the plain-text input:
//!
//! ```text
//! {"fragments": [{"id": "f000001", "begin": "0.000", "end": "2.480",
//!                 "lines": ["さくら"], "language": "jpn", "children": []}, ...]}
//! ```
//!
//! Times are usually decimal strings, but plain numbers are accepted too.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::types::LineTiming;

#[derive(Debug, Error)]
pub enum SyncMapError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Alignment mismatch: {fragments} fragments for {lyrics} lyrics")]
    CountMismatch { fragments: usize, lyrics: usize },
    #[error("Fragment {index} has no timing information")]
    MissingTiming { index: usize },
    #[error("Fragment {index} has an invalid time value '{value}'")]
    InvalidTime { index: usize, value: String },
}

/// aeneas `config_string` for a plain-text task producing a JSON sync map.
pub fn task_config(language: &str) -> String {
    format!("task_language={language}|os_task_file_format=json|is_text_type=plain")
}

#[derive(Deserialize)]
struct SyncMap {
    #[serde(default)]
    fragments: Vec<Fragment>,
}

#[derive(Deserialize)]
struct Fragment {
    begin: Option<Value>,
    end: Option<Value>,
    #[serde(default)]
    lines: Vec<Value>,
}

/// Map an aeneas JSON sync map onto the request's lyric lines.
///
/// `line_index` in the result is 1-based and `text` is the caller's line
/// exactly as submitted.
pub fn parse_sync_map(json: &str, lyrics: &[String]) -> Result<Vec<LineTiming>, SyncMapError> {
    let map: SyncMap = serde_json::from_str(json)?;

    if map.fragments.len() != lyrics.len() {
        return Err(SyncMapError::CountMismatch {
            fragments: map.fragments.len(),
            lyrics: lyrics.len(),
        });
    }

    map.fragments
        .iter()
        .zip(lyrics)
        .enumerate()
        .map(|(i, (fragment, text))| {
            let index = i + 1;
            let (start, end) = fragment_bounds(fragment, index)?;
            Ok(LineTiming {
                line_index: index,
                text: text.clone(),
                start,
                end,
            })
        })
        .collect()
}

fn fragment_bounds(fragment: &Fragment, index: usize) -> Result<(f64, f64), SyncMapError> {
    if let (Some(begin), Some(end)) = (&fragment.begin, &fragment.end) {
        return Ok((seconds(begin, index)?, seconds(end, index)?));
    }

    // No fragment-level times: take the span of the nested line records.
    let (Some(first), Some(last)) = (fragment.lines.first(), fragment.lines.last()) else {
        return Err(SyncMapError::MissingTiming { index });
    };
    let (Some(first), Some(last)) = (first.as_object(), last.as_object()) else {
        return Err(SyncMapError::MissingTiming { index });
    };

    let start = first.get("begin").map_or(Ok(0.0), |v| seconds(v, index))?;
    let end = last.get("end").map_or(Ok(0.0), |v| seconds(v, index))?;
    Ok((start, end))
}

fn seconds(value: &Value, index: usize) -> Result<f64, SyncMapError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|t| t.is_finite())
        .ok_or_else(|| SyncMapError::InvalidTime {
            index,
            value: value.to_string(),
        })
}
