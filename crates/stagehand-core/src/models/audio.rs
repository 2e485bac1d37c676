use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Normalized container/codec family of an audio file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileFormat {
    Wav,
    Mp3,
    Flac,
    Aac,
    M4a,
    Ogg,
    Aiff,
    Unknown,
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            FileFormat::Wav => "WAV",
            FileFormat::Mp3 => "MP3",
            FileFormat::Flac => "FLAC",
            FileFormat::Aac => "AAC",
            FileFormat::M4a => "M4A",
            FileFormat::Ogg => "OGG",
            FileFormat::Aiff => "AIFF",
            FileFormat::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Technical metadata of a staged audio file.
///
/// Produced fresh by every extraction; never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioMetadata {
    pub file_format: FileFormat,
    /// Hz, `0` when the probe does not report it
    pub sample_rate: u32,
    /// `None` for lossy codecs or when it cannot be determined
    pub bit_depth: Option<u32>,
    pub duration_seconds: f64,
    pub channels: u32,
}
