//! Fixtures shared by the engine tests.

use std::path::Path;

use kashi_core::wav::encode_pcm16;

/// Silent mono WAV with `samples` frames.
pub fn mono_wav(sample_rate: u32, samples: usize) -> Vec<u8> {
    encode_pcm16(&vec![0i16; samples], sample_rate, 1)
}

pub fn is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[cfg(unix)]
pub use fake::*;

#[cfg(unix)]
mod fake {
    use std::path::Path;

    use httpmock::prelude::*;
    use kashi_core::types::AlignerConfig;

    use super::mono_wav;

    /// Two-fragment sync map in the shape aeneas writes.
    pub const SYNC_MAP: &str = r#"{"fragments":[{"id":"f000001","begin":"0.000","end":"1.200","lines":["さくら"]},{"id":"f000002","begin":"1.200","end":"2.000","lines":["はな"]}]}"#;

    /// Write an executable `/bin/sh` script named `name` into `dir` and
    /// return its path, standing in for ffmpeg, espeak-ng or python.
    pub fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.display().to_string()
    }

    /// Mock audio host plus fake tools wired into an [`AlignerConfig`].
    pub struct Harness {
        _tools: tempfile::TempDir,
        pub work: tempfile::TempDir,
        pub server: MockServer,
        pub config: AlignerConfig,
    }

    /// Fake ffmpeg copies a 2 s mono 16 kHz WAV to its last argument. Fake
    /// python copies [`SYNC_MAP`] to the task output (`$6`), or runs
    /// `python_body` instead. `GET /song.mp3` serves a small body.
    pub async fn harness(python_body: Option<&str>) -> Harness {
        let tools = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();

        let fixture = tools.path().join("fixture.wav");
        std::fs::write(&fixture, mono_wav(16_000, 32_000)).unwrap();
        let ffmpeg = fake_tool(
            tools.path(),
            "ffmpeg",
            &format!("for a; do out=\"$a\"; done\ncp '{}' \"$out\"", fixture.display()),
        );

        let map = tools.path().join("map.json");
        std::fs::write(&map, SYNC_MAP).unwrap();
        let default_body = format!("cp '{}' \"$6\"", map.display());
        let python = fake_tool(tools.path(), "python", python_body.unwrap_or(&default_body));

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/song.mp3");
                then.status(200).body("fake mp3");
            })
            .await;

        let config = AlignerConfig {
            ffmpeg_bin: ffmpeg,
            python_bin: python,
            work_dir: work.path().to_path_buf(),
            ..Default::default()
        };
        Harness {
            _tools: tools,
            work,
            server,
            config,
        }
    }
}
