//! JSON snapshot store
//!
//! A local file-backed implementation of the store collaborator traits, used
//! by the CLI and its tests. The file holds a JSON array of parameter
//! records; the real remote store plugs in behind the same traits.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use paramtree_core::{MemoryStore, ParameterPage, ParameterStoreReader, ParameterStoreWriter, StoreError};
use paramtree_model::{ParamPath, Parameter, ParameterKind};

/// File-backed parameter store
///
/// Reads delegate to an in-memory copy loaded at open time; every successful
/// put persists the whole snapshot back to disk.
#[derive(Debug)]
pub struct SnapshotStore {
    file: PathBuf,
    inner: MemoryStore,
}

impl SnapshotStore {
    /// Open a snapshot file, or start empty if it does not exist yet
    ///
    /// # Errors
    /// Fails if the file exists but cannot be read or parsed.
    pub fn open(file: &Path) -> anyhow::Result<Self> {
        let inner = MemoryStore::new();
        if file.exists() {
            let raw = std::fs::read_to_string(file)
                .with_context(|| format!("reading snapshot file {}", file.display()))?;
            let parameters: Vec<Parameter> = serde_json::from_str(&raw)
                .with_context(|| format!("parsing snapshot file {}", file.display()))?;
            inner.seed(parameters);
        }
        tracing::debug!(file = %file.display(), count = inner.len(), "opened snapshot");
        Ok(Self {
            file: file.to_path_buf(),
            inner,
        })
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let parameters = self.inner.parameters();
        let json = serde_json::to_string_pretty(&parameters)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tokio::fs::write(&self.file, json)
            .await
            .map_err(|e| StoreError::Backend(format!("writing {}: {e}", self.file.display())))?;
        tracing::debug!(file = %self.file.display(), count = parameters.len(), "persisted snapshot");
        Ok(())
    }
}

#[async_trait]
impl ParameterStoreReader for SnapshotStore {
    async fn fetch_page(
        &self,
        prefix: &ParamPath,
        recursive: bool,
        decrypt: bool,
        token: Option<&str>,
    ) -> Result<ParameterPage, StoreError> {
        self.inner.fetch_page(prefix, recursive, decrypt, token).await
    }
}

#[async_trait]
impl ParameterStoreWriter for SnapshotStore {
    async fn put(
        &self,
        path: &ParamPath,
        value: &str,
        kind: ParameterKind,
        overwrite: bool,
        kms_key_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.inner.put(path, value, kind, overwrite, kms_key_id).await?;
        self.persist().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramtree_core::fetch_all;
    use paramtree_test_utils::param;

    fn root(s: &str) -> ParamPath {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::open(&dir.path().join("absent.json")).unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn put_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let store = SnapshotStore::open(&file).unwrap();
        store
            .put(&root("/app/key"), "v", ParameterKind::String, false, None)
            .await
            .unwrap();

        let reopened = SnapshotStore::open(&file).unwrap();
        let all = fetch_all(&reopened, &root("/app"), true, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].value, "v");
        assert_eq!(all[0].version, 1);
    }

    #[tokio::test]
    async fn open_rejects_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bad.json");
        std::fs::write(&file, "not json").unwrap();
        assert!(SnapshotStore::open(&file).is_err());
    }

    #[tokio::test]
    async fn seeded_records_survive_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("store.json");

        let store = SnapshotStore::open(&file).unwrap();
        let fixture = param("/app/prod/db/host", "prod-db.example.com");
        store.inner.seed([fixture.clone()]);
        store.persist().await.unwrap();

        let reopened = SnapshotStore::open(&file).unwrap();
        assert_eq!(reopened.inner.get(&fixture.path), Some(fixture));
    }
}
