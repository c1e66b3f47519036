//! Retention sweep for uploaded and generated files

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{info, warn};

use super::progress::ProgressStore;

/// Delete regular files in `dir` last modified more than `max_age` ago
///
/// Returns the number of files removed. A missing directory counts as empty.
pub async fn sweep_directory(dir: &Path, max_age: Duration) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();

        if age > max_age {
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %entry.path().display(), error = %e, "failed to remove stale file"),
            }
        }
    }

    Ok(removed)
}

/// Spawn the periodic sweep over `dirs` plus progress-entry eviction
///
/// The first pass runs one `period` after startup.
pub fn spawn_retention_sweep(
    dirs: Vec<PathBuf>,
    progress: ProgressStore,
    period: Duration,
    max_age: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            ticker.tick().await;

            for dir in &dirs {
                match sweep_directory(dir, max_age).await {
                    Ok(0) => {}
                    Ok(n) => info!(dir = %dir.display(), removed = n, "retention sweep"),
                    Err(e) => warn!(dir = %dir.display(), error = %e, "retention sweep failed"),
                }
            }

            let evicted = progress.evict_older_than(max_age);
            if evicted > 0 {
                info!(evicted, "evicted stale progress entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweep_removes_only_old_files() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("old.xlsx");
        std::fs::write(&old, b"x").unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        let fresh = temp_dir.path().join("fresh.xlsx");
        std::fs::write(&fresh, b"y").unwrap();

        let removed = sweep_directory(temp_dir.path(), Duration::from_millis(25))
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let removed = sweep_directory(&temp_dir.path().join("nope"), Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_sweep_skips_subdirectories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let removed = sweep_directory(temp_dir.path(), Duration::ZERO).await.unwrap();
        assert_eq!(removed, 0);
        assert!(temp_dir.path().join("nested").exists());
    }
}
