//! Storage error types

use stagehand_core::AppError;
use thiserror::Error;

/// Staging directory operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// No staged entry for this id, or the staging directory does not exist
    #[error("Temporary file not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The staged file a caller referred to is gone (expired, already promoted,
/// or never uploaded). The user has to upload again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Temporary file not found or expired. Please re-upload the file.")]
pub struct TempFileNotFoundError {
    pub temp_file_id: String,
}

/// Promotion errors
#[derive(Debug, Error)]
pub enum PromoteError {
    #[error(transparent)]
    TempFileNotFound(#[from] TempFileNotFoundError),

    #[error("Invalid permanent file name: {0}")]
    InvalidName(String),

    /// Permission, disk space and other OS-level failures, propagated as-is
    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(id) => AppError::TempFileNotFound(id),
            StorageError::InvalidName(msg) => AppError::InvalidInput(msg),
            StorageError::Io(e) => AppError::from(e),
        }
    }
}

impl From<PromoteError> for AppError {
    fn from(err: PromoteError) -> Self {
        match err {
            PromoteError::TempFileNotFound(e) => AppError::TempFileNotFound(e.temp_file_id),
            PromoteError::InvalidName(msg) => AppError::InvalidInput(msg),
            PromoteError::Filesystem(e) => AppError::from(e),
        }
    }
}
