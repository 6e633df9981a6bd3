use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::HeatwireError;

/// On-disk set of completed query keys enabling crash resume.
///
/// The file is created lazily on the first persist, rewritten atomically
/// (temp file + rename) after every completion, and removed by the caller
/// once the whole run has succeeded. A failed run leaves it behind for the
/// next run to pick up.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    completed: BTreeSet<String>,
}

#[derive(Serialize, Deserialize)]
struct CheckpointFile {
    completed_queries: Vec<String>,
}

impl CheckpointStore {
    /// Load an existing checkpoint file, or start empty when there is none.
    /// A corrupt file is treated as absent so a damaged checkpoint can never
    /// wedge the daily run.
    pub fn load_or_new(path: impl Into<PathBuf>) -> CheckpointStore {
        let path = path.into();
        let completed = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<CheckpointFile>(&raw) {
                Ok(file) => {
                    debug!(
                        path = %path.display(),
                        keys = file.completed_queries.len(),
                        "resuming from checkpoint"
                    );
                    file.completed_queries.into_iter().collect()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt checkpoint ignored");
                    BTreeSet::new()
                }
            },
            Err(_) => BTreeSet::new(),
        };
        CheckpointStore { path, completed }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, key: &str) -> bool {
        self.completed.contains(key)
    }

    pub fn insert(&mut self, key: String) {
        self.completed.insert(key);
    }

    pub fn len(&self) -> usize {
        self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }

    /// Write the current set to disk atomically.
    pub async fn persist(&self) -> Result<(), HeatwireError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = CheckpointFile {
            completed_queries: self.completed.iter().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Delete the checkpoint file after a fully successful run.
    pub async fn remove(self) -> Result<(), HeatwireError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn persist_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".checkpoint.json");

        let mut store = CheckpointStore::load_or_new(&path);
        assert!(store.is_empty());
        store.insert("aabbccddeeff0011".to_string());
        store.insert("1122334455667788".to_string());
        store.persist().await.unwrap();

        let reloaded = CheckpointStore::load_or_new(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("aabbccddeeff0011"));
        assert!(!reloaded.contains("ffffffffffffffff"));
    }

    #[tokio::test]
    async fn file_schema_is_completed_queries_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".checkpoint.json");

        let mut store = CheckpointStore::load_or_new(&path);
        store.insert("aabbccddeeff0011".to_string());
        store.persist().await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["completed_queries"][0], "aabbccddeeff0011");
        // no stray temp file left behind
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".checkpoint.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = CheckpointStore::load_or_new(&path);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".checkpoint.json");

        let mut store = CheckpointStore::load_or_new(&path);
        store.insert("aabbccddeeff0011".to_string());
        store.persist().await.unwrap();
        assert!(path.exists());
        store.remove().await.unwrap();
        assert!(!path.exists());

        // removing a never-persisted checkpoint is fine
        let store = CheckpointStore::load_or_new(&path);
        store.remove().await.unwrap();
    }

    #[tokio::test]
    async fn lazy_creation_only_on_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".checkpoint.json");
        let mut store = CheckpointStore::load_or_new(&path);
        store.insert("aabbccddeeff0011".to_string());
        assert!(!path.exists(), "no file until persist");
        store.persist().await.unwrap();
        assert!(path.exists());
    }
}
