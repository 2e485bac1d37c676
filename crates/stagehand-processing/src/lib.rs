//! Stagehand Media Processing Library
//!
//! This crate inspects staged audio files with an external probe (ffprobe) under
//! a hard time budget and normalizes the result into `AudioMetadata`.

pub mod audio;
pub mod error;

// Re-export commonly used types
pub use audio::{
    infer_bit_depth, normalize_format, parse_probe_output, AudioMetadataExtractor, FfprobeProbe,
    Probe,
};
pub use error::ExtractionError;
pub use stagehand_core::AudioMetadata;
