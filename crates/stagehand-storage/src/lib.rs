//! Stagehand Storage Library
//!
//! Filesystem side of the upload lifecycle: the staging directory
//! (`TempFileStore`) and promotion into permanent storage (`FilePromoter`).
//!
//! # Staged file layout
//!
//! Staged files live directly under the staging directory as `{id}_{original_name}`.
//! The id is a UUID generated at save time; lookups scan the directory for the
//! `{id}_` prefix, so there is no index to keep in sync.

pub mod error;
pub mod promote;
pub mod temp;

// Re-export commonly used types
pub use error::{PromoteError, StorageError, StorageResult, TempFileNotFoundError};
pub use promote::FilePromoter;
pub use temp::{SweepReport, TempFileStore};
