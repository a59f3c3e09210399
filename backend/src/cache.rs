//! Inventory snapshot cache
//!
//! Holds the most recently loaded inventory snapshot in memory and mirrors it
//! to a single JSON file. The cache never queries the ERP itself: a snapshot
//! only changes through an explicit [`SnapshotCache::refresh`].
//!
//! Readers get an `Arc` to the last published snapshot. Refreshes are
//! serialized by an internal lock so the durable file always holds the
//! snapshot that was published last.

use chrono::{DateTime, Utc};
use shared::models::{InventoryRow, InventorySnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cannot write snapshot to {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("snapshot file {path} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Manual-refresh, file-backed inventory cache
pub struct SnapshotCache {
    path: PathBuf,
    current: RwLock<Option<Arc<InventorySnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl SnapshotCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The current snapshot. A cold cache makes one attempt to load the
    /// durable file; a missing or corrupt file yields `None`.
    pub async fn get(&self) -> Option<Arc<InventorySnapshot>> {
        if let Some(snapshot) = self.peek().await {
            return Some(snapshot);
        }

        let loaded = match self.load_persisted().await {
            Ok(Some(snapshot)) => Arc::new(snapshot),
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("Ignoring inventory cache file: {}", err);
                return None;
            }
        };

        let mut current = self.current.write().await;
        // A refresh may have published while the file was being read
        match current.as_ref() {
            Some(newer) => Some(newer.clone()),
            None => {
                tracing::info!(
                    "Inventory cache loaded from {}: {} items captured at {}",
                    self.path.display(),
                    loaded.len(),
                    loaded.captured_at
                );
                *current = Some(loaded.clone());
                Some(loaded)
            }
        }
    }

    /// The in-memory snapshot only, without touching the durable file
    pub async fn peek(&self) -> Option<Arc<InventorySnapshot>> {
        self.current.read().await.clone()
    }

    /// Time elapsed since the in-memory snapshot was captured
    pub async fn staleness(&self) -> Option<chrono::Duration> {
        self.peek()
            .await
            .map(|snapshot| Utc::now() - snapshot.captured_at)
    }

    /// Fold flat rows into a new snapshot, publish it, then persist it.
    ///
    /// The in-memory snapshot is replaced before the file is written and is
    /// not rolled back if the write fails.
    pub async fn refresh(
        &self,
        rows: Vec<InventoryRow>,
    ) -> Result<Arc<InventorySnapshot>, CacheError> {
        self.refresh_at(rows, Utc::now()).await
    }

    async fn refresh_at(
        &self,
        rows: Vec<InventoryRow>,
        captured_at: DateTime<Utc>,
    ) -> Result<Arc<InventorySnapshot>, CacheError> {
        let _guard = self.refresh_lock.lock().await;

        let snapshot = Arc::new(InventorySnapshot::from_rows(rows, captured_at));
        *self.current.write().await = Some(snapshot.clone());

        self.persist(&snapshot).await?;
        tracing::info!(
            "Inventory snapshot saved to {}: {} items",
            self.path.display(),
            snapshot.len()
        );

        Ok(snapshot)
    }

    /// Read the durable file. `Ok(None)` when it does not exist.
    pub async fn load_persisted(&self) -> Result<Option<InventorySnapshot>, CacheError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No inventory cache file at {}", self.path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(CacheError::Persistence {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        serde_json::from_slice(&raw)
            .map(Some)
            .map_err(|source| CacheError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Overwrite the durable file as a whole: write a sibling temp file, then
    /// rename it over the target.
    async fn persist(&self, snapshot: &InventorySnapshot) -> Result<(), CacheError> {
        let encoded = serde_json::to_vec_pretty(snapshot)?;
        let io_err = |source| CacheError::Persistence {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let tmp_path = temp_path_for(&self.path);
        if let Err(err) = write_synced(&tmp_path, &encoded).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(io_err(err));
        }
        if let Err(err) = tokio::fs::rename(&tmp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(io_err(err));
        }
        Ok(())
    }

    /// Drop the in-memory snapshot, leaving the durable file alone
    pub async fn clear(&self) {
        *self.current.write().await = None;
    }
}

/// The bytes reach the disk before the caller renames the file into place
async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "inventory_cache.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn row(item: &str, whs: &str) -> InventoryRow {
        InventoryRow {
            item_code: item.to_string(),
            item_name: item.to_lowercase(),
            list_price: None,
            warehouse_code: whs.to_string(),
            warehouse_name: whs.to_string(),
            on_hand: Decimal::from(2),
            committed: None,
            available: Decimal::from(2),
            transit_total: None,
            transit_available: None,
        }
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path_for(Path::new("/var/cache/inventario_cache.json"));
        assert_eq!(tmp, PathBuf::from("/var/cache/inventario_cache.json.tmp"));
    }

    #[tokio::test]
    async fn test_refresh_at_stamps_given_time() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::new(dir.path().join("cache.json"));
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let snapshot = cache.refresh_at(vec![row("A", "01")], at).await.unwrap();

        assert_eq!(snapshot.captured_at, at);
        assert!(!dir.path().join("cache.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_write_synced_leaves_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json.tmp");

        write_synced(&path, b"{\"productos\":[]}").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"{\"productos\":[]}");
    }
}
