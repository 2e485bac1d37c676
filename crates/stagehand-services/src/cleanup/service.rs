use stagehand_core::Clock;
use stagehand_storage::{StorageResult, SweepReport, TempFileStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Reclaims staged uploads nobody promoted within the TTL.
///
/// Stateless between runs: every sweep re-reads the staging directory and
/// shares nothing with request handlers except the filesystem.
#[derive(Clone, Debug)]
pub struct CleanupService {
    temp_store: TempFileStore,
    ttl: Duration,
    interval: Duration,
    clock: Arc<dyn Clock>,
}

const MIN_INTERVAL: Duration = Duration::from_secs(1);

impl CleanupService {
    /// A zero `interval` is raised to one second.
    pub fn new(
        temp_store: TempFileStore,
        ttl: Duration,
        interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let interval = if interval.is_zero() {
            tracing::warn!(
                min_interval_secs = MIN_INTERVAL.as_secs(),
                "Cleanup interval of zero requested, using minimum"
            );
            MIN_INTERVAL
        } else {
            interval
        };

        Self {
            temp_store,
            ttl,
            interval,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the background sweep loop; the first sweep runs immediately.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut cleanup_interval = interval(self.interval);

            loop {
                cleanup_interval.tick().await;

                tracing::info!("Starting scheduled cleanup of expired temporary files");

                if let Err(e) = self.sweep().await {
                    tracing::error!(error = %e, "Temporary file cleanup failed");
                }
            }
        })
    }

    /// Delete every staged file older than the TTL, once
    #[tracing::instrument(skip(self), fields(cleanup.operation = "expire_temp_files"))]
    pub async fn sweep(&self) -> StorageResult<SweepReport> {
        let now = self.clock.now();
        let report = self.temp_store.delete_expired(self.ttl, now).await?;

        tracing::info!(
            scanned = report.scanned,
            deleted = report.deleted,
            failed = report.failed,
            ttl_secs = self.ttl.as_secs(),
            "Cleanup completed"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, Utc};
    use filetime::FileTime;
    use stagehand_core::{FixedClock, StagedFileState};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_sweep_uses_injected_clock() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let id = store.save(b"abandoned", "draft.wav").await.unwrap();

        let ttl = Duration::from_secs(3600);
        let now = Utc::now();

        let early = CleanupService::new(
            store.clone(),
            ttl,
            Duration::from_secs(3600),
            Arc::new(FixedClock(now)),
        );
        assert_eq!(early.sweep().await.unwrap().deleted, 0);
        assert!(store.exists(&id).await);

        let late = CleanupService::new(
            store.clone(),
            ttl,
            Duration::from_secs(3600),
            Arc::new(FixedClock(now + TimeDelta::seconds(3602))),
        );
        let report = late.sweep().await.unwrap();
        assert_eq!(report.deleted, 1);
        assert_eq!(report.expired, vec![StagedFileState::Expired { id: id.clone() }]);
        assert!(!store.exists(&id).await);
    }

    #[tokio::test]
    async fn test_zero_interval_is_raised_to_minimum() {
        let dir = tempdir().unwrap();
        let service = Arc::new(CleanupService::new(
            TempFileStore::new(dir.path()),
            Duration::from_secs(60),
            Duration::ZERO,
            Arc::new(stagehand_core::SystemClock),
        ));
        assert_eq!(service.interval(), Duration::from_secs(1));

        let handle = service.start();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished(), "loop should still be running");
        handle.abort();
    }

    #[tokio::test]
    async fn test_started_loop_sweeps_immediately() {
        let dir = tempdir().unwrap();
        let store = TempFileStore::new(dir.path());
        let id = store.save(b"abandoned", "draft.wav").await.unwrap();
        let path = store.resolve(&id).await.unwrap();
        filetime::set_file_mtime(&path, FileTime::from_unix_time(0, 0)).unwrap();

        let service = Arc::new(CleanupService::new(
            store.clone(),
            Duration::from_secs(60),
            Duration::from_secs(3600),
            Arc::new(stagehand_core::SystemClock),
        ));
        let handle = service.start();

        let mut gone = false;
        for _ in 0..100 {
            if !store.exists(&id).await {
                gone = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        handle.abort();

        assert!(gone, "first tick should sweep the stale file");
    }
}
