//! Data models for the temporary-upload subsystem

mod audio;
mod staged;

pub use audio::{AudioMetadata, FileFormat};
pub use staged::{is_older_than, StagedFile, StagedFileState};
