//! Stagehand Services Layer
//!
//! This crate is the service facade consumed by request handlers: it wires the
//! staging store, the metadata extractor and the promoter into the upload,
//! analysis and creation entry points, and hosts the janitor that reclaims
//! abandoned uploads. Keep coordination here; keep HTTP handling out.

pub mod cleanup;
pub mod staging;

pub use cleanup::CleanupService;
pub use staging::{AnalyzeError, AudioStagingService};

pub use stagehand_core::{
    AppError, AudioMetadata, Clock, ErrorMetadata, FileFormat, FixedClock, StagedFile, StagedFileState,
    StagingConfig, SystemClock,
};
pub use stagehand_processing::{AudioMetadataExtractor, ExtractionError, FfprobeProbe, Probe};
pub use stagehand_storage::{
    FilePromoter, PromoteError, StorageError, StorageResult, SweepReport, TempFileNotFoundError,
    TempFileStore,
};
