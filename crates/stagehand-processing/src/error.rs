//! Metadata extraction error types

use stagehand_core::AppError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Probe timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    /// The probe binary could not be started (missing, not executable)
    #[error("Failed to run probe: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Probe exited with status {status:?}: {stderr}")]
    Process { status: Option<i32>, stderr: String },

    #[error("Failed to parse probe output: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No audio stream found")]
    NoAudioStream,
}

impl ExtractionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ExtractionError::TimedOut { .. })
    }

    /// Short classification used in log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::TimedOut { .. } => "timed_out",
            ExtractionError::Spawn(_) => "spawn",
            ExtractionError::Process { .. } => "process",
            ExtractionError::Parse(_) => "parse",
            ExtractionError::NoAudioStream => "no_audio_stream",
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        AppError::MetadataExtraction(err.to_string())
    }
}
