//! Audio metadata extraction from staged files

use crate::audio::normalize::{infer_bit_depth, normalize_format};
use crate::audio::probe::{FfprobeProbe, Probe};
use crate::error::ExtractionError;
use serde::Deserialize;
use stagehand_core::{AudioMetadata, FileFormat};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct FFprobeOutput {
    #[serde(default)]
    streams: Vec<FFprobeStream>,
    format: Option<FFprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FFprobeFormat {
    format_name: Option<String>,
    duration: Option<Numeric>,
}

#[derive(Debug, Deserialize)]
struct FFprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    sample_rate: Option<Numeric>,
    channels: Option<Numeric>,
    bits_per_sample: Option<Numeric>,
    bits_per_raw_sample: Option<Numeric>,
}

/// ffprobe reports some numbers as JSON strings ("48000") and others as numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Int(u64),
    Float(f64),
    Text(String),
}

impl Numeric {
    fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Int(v) => Some(*v as f64),
            Numeric::Float(v) => Some(*v),
            Numeric::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value.filter(|v| v.is_finite())
    }

    fn as_u32(&self) -> Option<u32> {
        match self {
            Numeric::Int(v) => u32::try_from(*v).ok(),
            Numeric::Float(v) if *v >= 0.0 && *v <= u32::MAX as f64 => Some(*v as u32),
            Numeric::Float(_) => None,
            Numeric::Text(s) => s.trim().parse::<u32>().ok(),
        }
    }
}

/// Normalize raw probe JSON into `AudioMetadata`.
///
/// The first stream with `codec_type == "audio"` is used; a file without one is
/// rejected with `NoAudioStream`.
pub fn parse_probe_output(raw: &[u8]) -> Result<AudioMetadata, ExtractionError> {
    let output: FFprobeOutput = serde_json::from_slice(raw)?;

    let stream = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .ok_or(ExtractionError::NoAudioStream)?;

    let file_format = output
        .format
        .as_ref()
        .and_then(|f| f.format_name.as_deref())
        .map(normalize_format)
        .unwrap_or(FileFormat::Unknown);

    let duration_seconds = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(Numeric::as_f64)
        .unwrap_or(0.0);

    let sample_rate = stream
        .sample_rate
        .as_ref()
        .and_then(Numeric::as_u32)
        .unwrap_or(0);

    let channels = stream
        .channels
        .as_ref()
        .and_then(Numeric::as_u32)
        .unwrap_or(0);

    let declared_bits = |field: &Option<Numeric>| {
        field
            .as_ref()
            .and_then(Numeric::as_u32)
            .filter(|bits| *bits > 0)
    };
    let bit_depth = declared_bits(&stream.bits_per_raw_sample)
        .or_else(|| declared_bits(&stream.bits_per_sample))
        .or_else(|| stream.codec_name.as_deref().and_then(infer_bit_depth));

    Ok(AudioMetadata {
        file_format,
        sample_rate,
        bit_depth,
        duration_seconds,
        channels,
    })
}

/// Extracts `AudioMetadata` from files through a `Probe`, bounded by a timeout.
///
/// The timeout wraps the whole probe call, so it holds for any `Probe`
/// implementation, not only ffprobe.
#[derive(Clone)]
pub struct AudioMetadataExtractor {
    probe: Arc<dyn Probe>,
    timeout: Duration,
}

impl AudioMetadataExtractor {
    pub fn new(probe: Arc<dyn Probe>, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    /// Extractor backed by the `ffprobe` binary at `ffprobe_path`
    pub fn ffprobe(ffprobe_path: impl Into<String>, timeout: Duration) -> Self {
        Self::new(Arc::new(FfprobeProbe::new(ffprobe_path)), timeout)
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe `path` and normalize the output, surfacing why it failed
    #[tracing::instrument(skip(self, path), fields(service = "audio", path = %path.display()))]
    pub async fn try_extract(&self, path: &Path) -> Result<AudioMetadata, ExtractionError> {
        info!("Extracting audio metadata");
        let start = Instant::now();

        let raw = match tokio::time::timeout(self.timeout, self.probe.probe(path)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Probe exceeded its time budget and was abandoned"
                );
                return Err(ExtractionError::TimedOut {
                    timeout: self.timeout,
                });
            }
        };

        let metadata = parse_probe_output(&raw)?;

        info!(
            file_format = %metadata.file_format,
            sample_rate = metadata.sample_rate,
            channels = metadata.channels,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Audio metadata extracted"
        );

        Ok(metadata)
    }

    /// Best-effort extraction: every failure is logged and becomes `None`
    pub async fn extract(&self, path: &Path) -> Option<AudioMetadata> {
        match self.try_extract(path).await {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    path = %path.display(),
                    "Audio metadata extraction failed"
                );
                None
            }
        }
    }
}
