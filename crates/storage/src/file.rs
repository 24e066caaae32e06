//! JSON-directory backend.
//!
//! Layout under the root directory:
//!
//! ```text
//! <root>/executions/<id>.json   one pretty-printed execution per file
//! <root>/config.json            {"scope": {"key": "value"}}
//! ```
//!
//! Files are written to a temporary sibling and renamed into place, so a
//! reader never observes a half-written record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stratus_core::Execution;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::StorageError;
use crate::traits::{check_config_key, ExecutionFilter, StratusStorage};

type ConfigDoc = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    // Serializes read-modify-write of config.json.
    config_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStorage {
            root: root.into(),
            config_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn executions_dir(&self) -> PathBuf {
        self.root.join("executions")
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn execution_path(&self, id: &str) -> Option<PathBuf> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| self.executions_dir().join(format!("{id}.json")))
    }

    async fn read_config(&self) -> Result<ConfigDoc, StorageError> {
        let path = self.config_path();
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
                path: path.display().to_string(),
                source,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigDoc::new()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, bytes).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Execution, StorageError> {
    serde_json::from_slice(bytes).map_err(|source| StorageError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

#[async_trait]
impl StratusStorage for FileStorage {
    async fn save_execution(&self, exec: &Execution) -> Result<(), StorageError> {
        let path = self
            .execution_path(&exec.id)
            .ok_or_else(|| StorageError::Backend(format!("invalid execution id '{}'", exec.id)))?;
        let bytes = serde_json::to_vec_pretty(exec).map_err(|source| StorageError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        write_atomic(&path, &bytes).await?;
        debug!(id = %exec.id, path = %path.display(), "saved execution");
        Ok(())
    }

    async fn load_execution(&self, id: &str) -> Result<Execution, StorageError> {
        let not_found = || StorageError::ExecutionNotFound {
            execution_id: id.to_string(),
        };
        let path = self.execution_path(id).ok_or_else(not_found)?;
        match fs::read(&path).await {
            Ok(bytes) => decode(&path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found()),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_executions(
        &self,
        filter: &ExecutionFilter,
    ) -> Result<Vec<Execution>, StorageError> {
        let mut entries = match fs::read_dir(self.executions_dir()).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut execs = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let bytes = fs::read(&path).await?;
            match decode(&path, &bytes) {
                Ok(exec) => execs.push(exec),
                Err(e) => warn!(error = %e, "skipping unreadable execution"),
            }
        }
        Ok(filter.select(execs))
    }

    async fn config_get(&self, scope: &str, key: &str) -> Result<Option<String>, StorageError> {
        check_config_key(scope, key)?;
        let doc = self.read_config().await?;
        Ok(doc.get(scope).and_then(|s| s.get(key)).cloned())
    }

    async fn config_set(&self, scope: &str, key: &str, value: &str) -> Result<(), StorageError> {
        check_config_key(scope, key)?;
        let _guard = self.config_lock.lock().await;
        let mut doc = self.read_config().await?;
        doc.entry(scope.to_string())
            .or_default()
            .insert(key.to_string(), value.to_string());
        let path = self.config_path();
        let bytes = serde_json::to_vec_pretty(&doc).map_err(|source| StorageError::Corrupt {
            path: path.display().to_string(),
            source,
        })?;
        write_atomic(&path, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance::{make_execution, run_conformance_suite};

    #[tokio::test]
    async fn file_conformance() {
        let dirs = std::sync::Mutex::new(Vec::new());
        let report = run_conformance_suite(|| {
            let dir = tempfile::tempdir().unwrap();
            let storage = FileStorage::new(dir.path());
            dirs.lock().unwrap().push(dir);
            async move { storage }
        })
        .await;
        assert!(report.failed == 0, "{report}");
    }

    #[tokio::test]
    async fn reopened_storage_sees_saved_records() {
        let dir = tempfile::tempdir().unwrap();
        let exec = make_execution("abc123", "t1", "2025-01-01T00:00:00Z", false);
        FileStorage::new(dir.path()).save_execution(&exec).await.unwrap();
        FileStorage::new(dir.path())
            .config_set("aws", "region", "eu-west-1")
            .await
            .unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.load_execution("abc123").await.unwrap(), exec);
        assert_eq!(
            reopened.config_get("aws", "region").await.unwrap().as_deref(),
            Some("eu-west-1")
        );
        assert!(dir.path().join("executions/abc123.json").exists());
    }

    #[tokio::test]
    async fn corrupt_files_are_skipped_in_listings() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        let exec = make_execution("good", "t1", "2025-01-01T00:00:00Z", false);
        storage.save_execution(&exec).await.unwrap();
        std::fs::write(dir.path().join("executions/bad.json"), b"{not json").unwrap();

        let all = storage.load_executions(&ExecutionFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(matches!(
            storage.load_execution("bad").await,
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn path_like_ids_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(
            storage.load_execution("../config").await,
            Err(StorageError::ExecutionNotFound { .. })
        ));
        let exec = make_execution("../x", "t1", "2025-01-01T00:00:00Z", false);
        assert!(matches!(
            storage.save_execution(&exec).await,
            Err(StorageError::Backend(_))
        ));
    }
}
