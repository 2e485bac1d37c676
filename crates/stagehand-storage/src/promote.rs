use crate::error::{PromoteError, StorageError, TempFileNotFoundError};
use crate::temp::TempFileStore;
use stagehand_core::{StagedFile, StagedFileState};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Moves staged files into permanent storage
#[derive(Clone, Debug)]
pub struct FilePromoter {
    temp_store: TempFileStore,
    storage_path: PathBuf,
}

impl FilePromoter {
    /// # Arguments
    /// * `temp_store` - Staging directory files are taken from
    /// * `storage_path` - Permanent directory (e.g., "/var/lib/stagehand/audio")
    pub fn new(temp_store: TempFileStore, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            temp_store,
            storage_path: storage_path.into(),
        }
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Reject names that would escape the storage directory
    fn validate_permanent_name(permanent_name: &str) -> Result<(), PromoteError> {
        if permanent_name.trim().is_empty()
            || permanent_name.contains("..")
            || permanent_name.contains('/')
            || permanent_name.contains('\\')
        {
            return Err(PromoteError::InvalidName(permanent_name.to_string()));
        }
        Ok(())
    }

    fn not_found(temp_file_id: &str) -> PromoteError {
        TempFileNotFoundError {
            temp_file_id: temp_file_id.to_string(),
        }
        .into()
    }

    /// Move the staged file for `temp_file_id` to `{storage_path}/{permanent_name}`.
    ///
    /// A second call for the same id fails with `TempFileNotFound`: the first
    /// call already moved the file.
    #[tracing::instrument(skip(self), fields(service = "promote"))]
    pub async fn promote(
        &self,
        temp_file_id: &str,
        permanent_name: &str,
    ) -> Result<PathBuf, PromoteError> {
        Self::validate_permanent_name(permanent_name)?;

        let staged = match self.temp_store.stat(temp_file_id).await {
            Ok(staged) => staged,
            Err(StorageError::NotFound(_)) => return Err(Self::not_found(temp_file_id)),
            Err(StorageError::InvalidName(msg)) => return Err(PromoteError::InvalidName(msg)),
            Err(StorageError::Io(e)) => return Err(PromoteError::Filesystem(e)),
        };

        self.move_into_storage(&staged, permanent_name).await
    }

    /// Perform the `Staged -> Promoted` transition for an already resolved file
    pub async fn promote_staged(
        &self,
        staged: StagedFile,
        permanent_name: &str,
    ) -> Result<StagedFileState, PromoteError> {
        Self::validate_permanent_name(permanent_name)?;
        let permanent_path = self.move_into_storage(&staged, permanent_name).await?;

        Ok(StagedFileState::Promoted {
            id: staged.id,
            permanent_path,
        })
    }

    async fn move_into_storage(
        &self,
        staged: &StagedFile,
        permanent_name: &str,
    ) -> Result<PathBuf, PromoteError> {
        fs::create_dir_all(&self.storage_path).await?;

        let permanent_path = self.storage_path.join(permanent_name);
        let start = std::time::Instant::now();

        match fs::rename(&staged.path, &permanent_path).await {
            Ok(()) => {}
            // Swept or promoted by someone else between lookup and rename
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(Self::not_found(&staged.id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            temp_file_id = %staged.id,
            from = %staged.path.display(),
            to = %permanent_path.display(),
            size_bytes = staged.size_bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Promoted temporary file to permanent storage"
        );

        Ok(permanent_path)
    }
}
