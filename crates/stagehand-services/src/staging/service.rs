use crate::cleanup::CleanupService;
use stagehand_core::{AppError, AudioMetadata, Clock, StagingConfig, SystemClock};
use stagehand_processing::{AudioMetadataExtractor, ExtractionError, Probe};
use stagehand_storage::{
    FilePromoter, PromoteError, StorageError, StorageResult, SweepReport, TempFileStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Failure of an explicit metadata request
#[derive(Debug, Error)]
pub enum AnalyzeError {
    /// Expired, already promoted, or never uploaded
    #[error("Temporary file not found")]
    TempFileNotFound { temp_file_id: String },

    /// The cause is kept as the source so timeouts stay distinguishable
    #[error("Failed to extract metadata")]
    ExtractionFailed(#[source] ExtractionError),

    #[error(transparent)]
    Storage(StorageError),
}

impl AnalyzeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AnalyzeError::ExtractionFailed(e) if e.is_timeout())
    }
}

impl From<AnalyzeError> for AppError {
    fn from(err: AnalyzeError) -> Self {
        match err {
            AnalyzeError::TempFileNotFound { temp_file_id } => {
                AppError::TempFileNotFound(temp_file_id)
            }
            AnalyzeError::ExtractionFailed(e) => e.into(),
            AnalyzeError::Storage(e) => e.into(),
        }
    }
}

/// Entry points of the temporary-upload subsystem.
///
/// Upload handlers stage bytes, analysis handlers read metadata for display,
/// creation handlers promote the file once the user saves, and a scheduler
/// drives `cleanup_expired`.
#[derive(Clone)]
pub struct AudioStagingService {
    temp_store: TempFileStore,
    promoter: FilePromoter,
    extractor: AudioMetadataExtractor,
    janitor: CleanupService,
}

impl AudioStagingService {
    pub fn new(
        temp_store: TempFileStore,
        promoter: FilePromoter,
        extractor: AudioMetadataExtractor,
        janitor: CleanupService,
    ) -> Self {
        Self {
            temp_store,
            promoter,
            extractor,
            janitor,
        }
    }

    /// Wire the service from configuration, probing with ffprobe
    pub fn from_config(config: &StagingConfig) -> Self {
        let extractor =
            AudioMetadataExtractor::ffprobe(config.ffprobe_path.clone(), config.probe_timeout);
        Self::with_parts(config, extractor, Arc::new(SystemClock))
    }

    /// Wire the service from configuration with a custom probe and clock
    pub fn with_probe(
        config: &StagingConfig,
        probe: Arc<dyn Probe>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let extractor = AudioMetadataExtractor::new(probe, config.probe_timeout);
        Self::with_parts(config, extractor, clock)
    }

    fn with_parts(
        config: &StagingConfig,
        extractor: AudioMetadataExtractor,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let temp_store = TempFileStore::new(config.temp_dir.clone());
        let promoter = FilePromoter::new(temp_store.clone(), config.storage_dir.clone());
        let janitor = CleanupService::new(
            temp_store.clone(),
            config.temp_file_ttl,
            config.cleanup_interval,
            clock,
        );
        Self::new(temp_store, promoter, extractor, janitor)
    }

    pub fn temp_store(&self) -> &TempFileStore {
        &self.temp_store
    }

    pub fn extractor(&self) -> &AudioMetadataExtractor {
        &self.extractor
    }

    /// The janitor, for callers that want to run it on its own schedule
    pub fn janitor(&self) -> CleanupService {
        self.janitor.clone()
    }

    /// Stage uploaded bytes; returns the temp file id
    pub async fn save_temp_file(&self, data: &[u8], file_name: &str) -> StorageResult<String> {
        self.temp_store.save(data, file_name).await
    }

    /// Metadata of a staged upload. Unlike `AudioMetadataExtractor::extract`,
    /// failures are reported to the caller.
    #[tracing::instrument(skip(self), fields(service = "audio"))]
    pub async fn analyze_audio(&self, temp_file_id: &str) -> Result<AudioMetadata, AnalyzeError> {
        let path = match self.temp_store.resolve(temp_file_id).await {
            Ok(path) => path,
            Err(StorageError::NotFound(_)) => {
                tracing::debug!(temp_file_id = %temp_file_id, "Temporary file not found");
                return Err(AnalyzeError::TempFileNotFound {
                    temp_file_id: temp_file_id.to_string(),
                });
            }
            Err(e) => return Err(AnalyzeError::Storage(e)),
        };

        let err = match self.extractor.try_extract(&path).await {
            Ok(metadata) => return Ok(metadata),
            Err(e) => e,
        };

        // Swept or promoted while the probe ran
        if !self.temp_store.exists(temp_file_id).await {
            tracing::debug!(
                error = %err,
                temp_file_id = %temp_file_id,
                "Temporary file disappeared during extraction"
            );
            return Err(AnalyzeError::TempFileNotFound {
                temp_file_id: temp_file_id.to_string(),
            });
        }

        tracing::warn!(
            error = %err,
            kind = err.kind(),
            temp_file_id = %temp_file_id,
            "Failed to extract metadata"
        );
        Err(AnalyzeError::ExtractionFailed(err))
    }

    /// Move a staged upload to permanent storage under `permanent_file_name`
    pub async fn persist_temp_file(
        &self,
        temp_file_id: &str,
        permanent_file_name: &str,
    ) -> Result<PathBuf, PromoteError> {
        self.promoter
            .promote(temp_file_id, permanent_file_name)
            .await
    }

    /// One janitor pass, for external schedulers
    pub async fn cleanup_expired(&self) -> StorageResult<SweepReport> {
        self.janitor.sweep().await
    }
}
