//! Request validation and lyric file rendering.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use url::Url;

use crate::types::AlignRequest;

// Any character that would split one entry into several aeneas text lines.
static RE_LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n\r\u{0085}\u{2028}\u{2029}]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("audio_url is not a valid URL: {0}")]
    InvalidUrl(String),
    #[error("audio_url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("audio_url has no host")]
    MissingHost,
    #[error("lyrics cannot be empty")]
    EmptyLyrics,
    #[error(
        "lyrics[{index}] appears to be a multiline string. Each item in lyrics should be a \
         single line. Split multiline strings into separate list items."
    )]
    MultilineLyric { index: usize },
    #[error("lyrics[{index}] is blank")]
    BlankLyric { index: usize },
}

/// A request whose URL and lyrics passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub audio_url: Url,
    pub lyrics: Vec<String>,
}

impl AlignRequest {
    pub fn validate(self) -> Result<ValidatedRequest, ValidationError> {
        let audio_url = validate_audio_url(&self.audio_url)?;
        validate_lyrics(&self.lyrics)?;
        Ok(ValidatedRequest {
            audio_url,
            lyrics: self.lyrics,
        })
    }
}

pub fn validate_audio_url(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw.trim()).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost);
    }
    Ok(url)
}

/// Check that `lyrics` is a non-empty list of single, non-blank lines.
pub fn validate_lyrics(lyrics: &[String]) -> Result<(), ValidationError> {
    if lyrics.is_empty() {
        return Err(ValidationError::EmptyLyrics);
    }
    for (index, line) in lyrics.iter().enumerate() {
        if RE_LINE_BREAK.is_match(line) {
            return Err(ValidationError::MultilineLyric { index });
        }
        if line.trim().is_empty() {
            return Err(ValidationError::BlankLyric { index });
        }
    }
    Ok(())
}

/// Render lyrics as an aeneas plain-text input: one trimmed line per entry.
pub fn render_lyrics_file(lyrics: &[String]) -> String {
    let mut out = String::with_capacity(lyrics.iter().map(|l| l.len() + 1).sum());
    for line in lyrics {
        out.push_str(line.trim());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_audio_url("http://cdn.example.com/a.mp3").is_ok());
        assert!(validate_audio_url("https://cdn.example.com/a.mp3?x=1").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            validate_audio_url("ftp://cdn.example.com/a.mp3"),
            Err(ValidationError::UnsupportedScheme("ftp".into()))
        );
        assert!(matches!(
            validate_audio_url("file:///etc/passwd"),
            Err(ValidationError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_garbage_url() {
        assert!(matches!(
            validate_audio_url("not a url"),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(validate_audio_url("").is_err());
    }

    #[test]
    fn empty_lyrics_rejected() {
        assert_eq!(validate_lyrics(&[]), Err(ValidationError::EmptyLyrics));
    }

    #[test]
    fn multiline_entry_reports_index() {
        let l = lines(&["一行目", "二行目\n三行目"]);
        assert_eq!(
            validate_lyrics(&l),
            Err(ValidationError::MultilineLyric { index: 1 })
        );
    }

    #[test]
    fn carriage_return_and_unicode_separators_count_as_breaks() {
        assert!(validate_lyrics(&lines(&["a\rb"])).is_err());
        assert!(validate_lyrics(&lines(&["a\u{2028}b"])).is_err());
    }

    #[test]
    fn blank_entry_rejected() {
        assert_eq!(
            validate_lyrics(&lines(&["a", "   "])),
            Err(ValidationError::BlankLyric { index: 1 })
        );
    }

    #[test]
    fn multiline_message_explains_fix() {
        let msg = ValidationError::MultilineLyric { index: 0 }.to_string();
        assert!(msg.contains("lyrics[0]"));
        assert!(msg.contains("separate list items"));
    }

    #[test]
    fn request_validate_keeps_lyrics_verbatim() {
        let req = AlignRequest {
            audio_url: "https://a.example/song.mp3".into(),
            lyrics: lines(&["  さくら  ", "はな"]),
        };
        let v = req.validate().unwrap();
        assert_eq!(v.audio_url.host_str(), Some("a.example"));
        assert_eq!(v.lyrics[0], "  さくら  ");
    }

    #[test]
    fn render_trims_and_terminates() {
        let out = render_lyrics_file(&lines(&["  さくら ", "はな"]));
        assert_eq!(out, "さくら\nはな\n");
    }
}
