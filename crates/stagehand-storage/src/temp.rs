use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stagehand_core::{StagedFile, StagedFileState};
use std::future::Future;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const FALLBACK_NAME: &str = "upload";

/// Outcome of one pass over the staging directory
#[derive(Debug, Default, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
    pub expired: Vec<StagedFileState>,
}

/// Staging directory for uploaded-but-uncommitted files
#[derive(Clone, Debug)]
pub struct TempFileStore {
    base_path: PathBuf,
}

impl TempFileStore {
    /// Create a store rooted at `base_path`.
    ///
    /// The directory is not touched until the first save.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Keep only the final component of a client-supplied file name
    fn sanitize_original_name(original_name: &str) -> String {
        let name = original_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or_default()
            .trim();

        if name.is_empty() || name == "." || name == ".." {
            FALLBACK_NAME.to_string()
        } else {
            name.to_string()
        }
    }

    fn id_prefix(temp_file_id: &str) -> String {
        format!("{}_", temp_file_id)
    }

    /// Write `data` under a freshly generated id and return that id
    #[tracing::instrument(skip(self, data), fields(size_bytes = data.len()))]
    pub async fn save(&self, data: &[u8], original_name: &str) -> StorageResult<String> {
        fs::create_dir_all(&self.base_path).await?;

        let temp_file_id = Uuid::new_v4().to_string();
        let stored_name = format!(
            "{}_{}",
            temp_file_id,
            Self::sanitize_original_name(original_name)
        );
        let path = self.base_path.join(&stored_name);
        let start = std::time::Instant::now();

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(data).await?;
        file.sync_all().await?;

        tracing::info!(
            temp_file_id = %temp_file_id,
            path = %path.display(),
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Staged temporary file"
        );

        Ok(temp_file_id)
    }

    /// Scan the staging directory for the entry owned by `temp_file_id`.
    ///
    /// A missing staging directory is reported as "no entry".
    async fn find_entry(&self, temp_file_id: &str) -> StorageResult<Option<(PathBuf, String)>> {
        if temp_file_id.is_empty() {
            return Ok(None);
        }

        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let prefix = Self::id_prefix(temp_file_id);
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) {
                return Ok(Some((entry.path(), name)));
            }
        }

        Ok(None)
    }

    /// Path of the staged file for `temp_file_id`
    pub async fn resolve(&self, temp_file_id: &str) -> StorageResult<PathBuf> {
        self.find_entry(temp_file_id)
            .await?
            .map(|(path, _)| path)
            .ok_or_else(|| StorageError::NotFound(temp_file_id.to_string()))
    }

    /// Non-failing pre-flight check
    pub async fn exists(&self, temp_file_id: &str) -> bool {
        match self.find_entry(temp_file_id).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                tracing::warn!(error = %e, temp_file_id = %temp_file_id, "Failed to scan staging directory");
                false
            }
        }
    }

    /// Snapshot of the staged file for `temp_file_id`
    pub async fn stat(&self, temp_file_id: &str) -> StorageResult<StagedFile> {
        let (path, stored_name) = self
            .find_entry(temp_file_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(temp_file_id.to_string()))?;

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::NotFound(temp_file_id.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        Ok(StagedFile {
            id: temp_file_id.to_string(),
            stored_name,
            path,
            size_bytes: metadata.len(),
            modified_at: DateTime::<Utc>::from(metadata.modified()?),
        })
    }

    /// Delete every entry last modified before `now - ttl`.
    ///
    /// Per-entry failures are logged and counted; they never abort the pass.
    /// Entries that vanish mid-sweep (promoted concurrently) are skipped.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "delete_expired"))]
    pub async fn delete_expired(
        &self,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> StorageResult<SweepReport> {
        self.sweep_with(ttl, now, |path| async move { fs::remove_file(path).await })
            .await
    }

    async fn sweep_with<F, Fut>(
        &self,
        ttl: Duration,
        now: DateTime<Utc>,
        remove: F,
    ) -> StorageResult<SweepReport>
    where
        F: Fn(PathBuf) -> Fut,
        Fut: Future<Output = io::Result<()>>,
    {
        let mut report = SweepReport::default();

        let mut entries = match fs::read_dir(&self.base_path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.base_path.display(), "Staging directory does not exist, nothing to sweep");
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        };

        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        path = %self.base_path.display(),
                        "Failed to read staging directory, ending sweep early"
                    );
                    report.failed += 1;
                    break;
                }
            };
            report.scanned += 1;
            let path = entry.path();

            let metadata = match entry.metadata().await {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to stat staged file");
                    report.failed += 1;
                    continue;
                }
            };

            if !metadata.is_file() {
                tracing::debug!(path = %path.display(), "Skipping non-file entry in staging directory");
                continue;
            }

            let modified_at = match metadata.modified() {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(e) => {
                    tracing::error!(error = %e, path = %path.display(), "Failed to read modification time");
                    report.failed += 1;
                    continue;
                }
            };

            let stored_name = entry.file_name().to_string_lossy().into_owned();
            let staged = StagedFile {
                id: stored_name
                    .split_once('_')
                    .map(|(id, _)| id.to_string())
                    .unwrap_or_else(|| stored_name.clone()),
                stored_name,
                path,
                size_bytes: metadata.len(),
                modified_at,
            };

            if !staged.is_expired(ttl, now) {
                continue;
            }

            match remove(staged.path.clone()).await {
                Ok(()) => {
                    tracing::info!(
                        temp_file_id = %staged.id,
                        path = %staged.path.display(),
                        age_secs = (now - staged.modified_at).num_seconds(),
                        "Deleted expired temporary file"
                    );
                    report.deleted += 1;
                    report.expired.push(StagedFileState::Expired { id: staged.id });
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    tracing::debug!(path = %staged.path.display(), "Temporary file already gone");
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        path = %staged.path.display(),
                        "Failed to delete expired temporary file, continuing"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use filetime::FileTime;
    use tempfile::tempdir;

    fn set_age(path: &Path, now: DateTime<Utc>, age: TimeDelta) {
        let mtime = now - age;
        filetime::set_file_mtime(path, FileTime::from_unix_time(mtime.timestamp(), 0)).unwrap();
    }

    #[tokio::test]
    async fn test_save_creates_directory_and_round_trips() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path().join("nested").join("temp"));

        let data = b"RIFF....WAVEfmt ".to_vec();
        let id = store.save(&data, "take 1.wav").await.unwrap();

        let path = store.resolve(&id).await.unwrap();
        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            format!("{}_take 1.wav", id)
        );
        assert_eq!(tokio::fs::read(&path).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_identical_saves_get_distinct_ids() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());

        let first = store.save(b"same", "same.wav").await.unwrap();
        let second = store.save(b"same", "same.wav").await.unwrap();

        assert_ne!(first, second);
        assert!(store.exists(&first).await);
        assert!(store.exists(&second).await);
        assert_ne!(
            store.resolve(&first).await.unwrap(),
            store.resolve(&second).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_resolve_missing_directory_is_not_found() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path().join("never-created"));

        let result = store.resolve("nonexistent-id").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
        assert!(!store.exists("nonexistent-id").await);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id_is_not_found() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        store.save(b"data", "a.wav").await.unwrap();

        let result = store.resolve("nonexistent-id").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_truncated_or_empty_id_does_not_match() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let id = store.save(b"data", "a.wav").await.unwrap();

        assert!(!store.exists(&id[..8]).await);
        assert!(!store.exists("").await);
    }

    #[tokio::test]
    async fn test_save_strips_directory_components() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path().join("temp"));

        let id = store.save(b"data", "../../etc/passwd").await.unwrap();
        let staged = store.stat(&id).await.unwrap();
        assert_eq!(staged.original_name(), "passwd");
        assert_eq!(staged.path.parent().unwrap(), store.base_path());

        let id = store.save(b"data", "..").await.unwrap();
        let staged = store.stat(&id).await.unwrap();
        assert_eq!(staged.original_name(), "upload");
    }

    #[tokio::test]
    async fn test_stat_reports_size() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let id = store.save(b"12345", "five.flac").await.unwrap();

        let staged = store.stat(&id).await.unwrap();
        assert_eq!(staged.id, id);
        assert_eq!(staged.size_bytes, 5);
        assert_eq!(staged.original_name(), "five.flac");
    }

    #[tokio::test]
    async fn test_delete_expired_boundary() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let now = Utc::now();
        let ttl = Duration::from_secs(3600);

        let stale = store.save(b"old", "old.wav").await.unwrap();
        let fresh = store.save(b"new", "new.wav").await.unwrap();
        set_age(&store.resolve(&stale).await.unwrap(), now, TimeDelta::seconds(3601));
        set_age(&store.resolve(&fresh).await.unwrap(), now, TimeDelta::seconds(3599));

        let report = store.delete_expired(ttl, now).await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.expired, vec![StagedFileState::Expired { id: stale.clone() }]);
        assert!(!store.exists(&stale).await);
        assert!(store.exists(&fresh).await);
    }

    #[tokio::test]
    async fn test_sweep_continues_past_failed_deletion() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let now = Utc::now();

        let stuck = store.save(b"locked", "locked.wav").await.unwrap();
        let stale = store.save(b"old", "old.wav").await.unwrap();
        let stuck_path = store.resolve(&stuck).await.unwrap();
        set_age(&stuck_path, now, TimeDelta::seconds(7200));
        set_age(&store.resolve(&stale).await.unwrap(), now, TimeDelta::seconds(7200));

        let report = store
            .sweep_with(Duration::from_secs(3600), now, |path| {
                let locked = path == stuck_path;
                async move {
                    if locked {
                        Err(io::Error::new(ErrorKind::PermissionDenied, "locked"))
                    } else {
                        fs::remove_file(path).await
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.expired, vec![StagedFileState::Expired { id: stale.clone() }]);
        assert!(store.exists(&stuck).await);
        assert!(!store.exists(&stale).await);
    }

    #[tokio::test]
    async fn test_sweep_ignores_entry_removed_concurrently() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let now = Utc::now();

        let id = store.save(b"old", "old.wav").await.unwrap();
        set_age(&store.resolve(&id).await.unwrap(), now, TimeDelta::seconds(7200));

        let report = store
            .sweep_with(Duration::from_secs(3600), now, |path| async move {
                fs::remove_file(&path).await?;
                fs::remove_file(&path).await
            })
            .await
            .unwrap();

        assert_eq!(report.failed, 0);
        assert_eq!(report.deleted, 0);
        assert!(!store.exists(&id).await);
    }

    #[tokio::test]
    async fn test_delete_expired_without_directory() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path().join("missing"));

        let report = store
            .delete_expired(Duration::from_secs(1), Utc::now())
            .await
            .unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(report.deleted, 0);
    }

    #[tokio::test]
    async fn test_delete_expired_skips_subdirectories() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let report = store
            .delete_expired(Duration::from_secs(1), Utc::now() + TimeDelta::days(365))
            .await
            .unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 0);
        assert!(dir.path().join("nested").exists());
    }
}
