//! External probe capability

use crate::error::ExtractionError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Runs a media inspector against a file and returns its raw JSON output.
///
/// Implementations must be cancel-safe: the caller enforces the time budget by
/// dropping the returned future.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Vec<u8>, ExtractionError>;
}

/// `ffprobe` invoked as a child process
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: String,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.ffprobe_path
    }
}

#[async_trait]
impl Probe for FfprobeProbe {
    async fn probe(&self, path: &Path) -> Result<Vec<u8>, ExtractionError> {
        tracing::debug!(ffprobe = %self.ffprobe_path, path = %path.display(), "Running ffprobe");

        // kill_on_drop: a timed-out future takes the child down with it
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ExtractionError::Spawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::error!(status = ?output.status.code(), stderr = %stderr, "ffprobe failed");
            return Err(ExtractionError::Process {
                status: output.status.code(),
                stderr,
            });
        }

        Ok(output.stdout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let probe = FfprobeProbe::new("/nonexistent/bin/ffprobe-missing");
        let result = probe.probe(Path::new("/tmp/whatever.wav")).await;
        assert!(matches!(result, Err(ExtractionError::Spawn(_))));
    }

    #[test]
    fn test_probe_new() {
        let probe = FfprobeProbe::new("custom_ffprobe_path");
        assert_eq!(probe.ffprobe_path(), "custom_ffprobe_path");
    }
}
