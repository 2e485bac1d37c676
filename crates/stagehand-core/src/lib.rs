//! Stagehand Core Library
//!
//! This crate provides the domain models, error types, configuration and clock
//! shared across all Stagehand components.

pub mod clock;
pub mod config;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StagingConfig;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{AudioMetadata, FileFormat, StagedFile, StagedFileState};
