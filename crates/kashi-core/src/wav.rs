//! WAV header inspection for converted audio.
//!
//! Chunks are walked by seeking past each one, so a large LIST/INFO chunk
//! before `data` costs nothing to skip.

use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;

/// Size sentinel written by streaming encoders that never seek back.
const UNKNOWN_SIZE: u32 = 0xFFFF_FFFF;

/// Longest `fmt ` body worth reading (WAVE_FORMAT_EXTENSIBLE).
const MAX_FMT_LEN: u32 = 40;

#[derive(Debug, Error)]
pub enum WavError {
    #[error("{0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Format and payload facts for a PCM WAV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    /// Byte offset of the first PCM sample.
    pub data_offset: u64,
    /// PCM payload length in bytes.
    pub data_len: u64,
}

impl WavInfo {
    pub fn duration_secs(&self) -> f64 {
        let bytes_per_sec =
            self.sample_rate as u64 * self.channels as u64 * (self.bits_per_sample as u64 / 8);
        if bytes_per_sec == 0 {
            return 0.0;
        }
        self.data_len as f64 / bytes_per_sec as f64
    }

    /// Check that the audio matches the layout aeneas is fed and is non-empty.
    pub fn check_normalized(&self, sample_rate: u32, channels: u16) -> Result<(), String> {
        if self.sample_rate != sample_rate {
            return Err(format!(
                "expected {sample_rate} Hz, got {} Hz",
                self.sample_rate
            ));
        }
        if self.channels != channels {
            return Err(format!(
                "expected {channels} channel(s), got {}",
                self.channels
            ));
        }
        if self.data_len == 0 {
            return Err("converted audio contains no samples".into());
        }
        Ok(())
    }
}

/// Read the RIFF/WAVE header from `reader`, which must be positioned at the
/// start of the file.
///
/// `file_len` is the full file size; it bounds the data chunk and stands in
/// for it when the encoder left the size as `0xFFFFFFFF`.
pub fn read_wav_info<R: Read + Seek>(
    reader: &mut R,
    file_len: u64,
) -> Result<WavInfo, WavError> {
    let mut riff = [0u8; 12];
    read_or(reader, &mut riff, "too short for RIFF header")?;
    if &riff[0..4] != b"RIFF" {
        return Err(WavError::Invalid("missing RIFF tag"));
    }
    if &riff[8..12] != b"WAVE" {
        return Err(WavError::Invalid("missing WAVE tag"));
    }

    let mut pos = riff.len() as u64;
    let mut format: Option<(u16, u32, u16)> = None;

    loop {
        let mut head = [0u8; 8];
        read_or(reader, &mut head, "data chunk not found")?;
        let size = read_u32(&head, 4);
        let body = pos + head.len() as u64;

        let skip = match &head[0..4] {
            b"fmt " => {
                let len = if size == UNKNOWN_SIZE { 16 } else { size };
                let mut fmt = vec![0u8; len.min(MAX_FMT_LEN) as usize];
                read_or(reader, &mut fmt, "fmt chunk truncated")?;
                format = Some(parse_fmt(&fmt)?);
                len
            }
            b"data" => {
                let (channels, sample_rate, bits_per_sample) = format
                    .ok_or(WavError::Invalid("data chunk before fmt chunk"))?;
                let available = file_len.saturating_sub(body);
                let data_len = if size == UNKNOWN_SIZE {
                    available
                } else {
                    (size as u64).min(available)
                };
                return Ok(WavInfo {
                    channels,
                    sample_rate,
                    bits_per_sample,
                    data_offset: body,
                    data_len,
                });
            }
            _ if size == UNKNOWN_SIZE => {
                return Err(WavError::Invalid("unknown chunk with indeterminate size"))
            }
            _ => size,
        };

        // Odd-sized chunks carry a pad byte.
        pos = body + skip as u64 + (skip & 1) as u64;
        reader.seek(SeekFrom::Start(pos))?;
    }
}

fn parse_fmt(fmt: &[u8]) -> Result<(u16, u32, u16), WavError> {
    if fmt.len() < 16 {
        return Err(WavError::Invalid("fmt chunk truncated"));
    }
    let audio_format = read_u16(fmt, 0);
    // 0xFFFE is WAVE_FORMAT_EXTENSIBLE, which ffmpeg uses for >2 channels.
    if audio_format != 1 && audio_format != 0xFFFE {
        return Err(WavError::Invalid("not PCM format"));
    }
    Ok((read_u16(fmt, 2), read_u32(fmt, 4), read_u16(fmt, 14)))
}

/// `read_exact`, reporting a short file as `msg` instead of an I/O error.
fn read_or<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    msg: &'static str,
) -> Result<(), WavError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => WavError::Invalid(msg),
        _ => WavError::Io(e),
    })
}

/// Encode interleaved 16-bit samples as a canonical 44-byte-header WAV.
pub fn encode_pcm16(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
    let data_len = (samples.len() * 2) as u32;
    let block_align = channels * 2;
    let mut buf = Vec::with_capacity(44 + data_len as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes());
    buf.extend_from_slice(&channels.to_le_bytes());
    buf.extend_from_slice(&sample_rate.to_le_bytes());
    buf.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&16u16.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        buf.extend_from_slice(&s.to_le_bytes());
    }
    buf
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}
