//! Store boundary
//!
//! The remote parameter store is an external collaborator behind the
//! [`ParameterStoreReader`] / [`ParameterStoreWriter`] traits; errors it
//! produces are opaque to the core. [`fetch_all`] drives pagination to a
//! complete snapshot. [`MemoryStore`] is the in-memory reference
//! implementation used by the snapshot-file backend and by tests.

use async_trait::async_trait;
use chrono::Utc;
use paramtree_model::{ParamPath, Parameter, ParameterKind};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Errors surfaced by a store backend
///
/// The core does not interpret these beyond display: fetch errors surface
/// as-is (a fetch is atomic), write errors become per-action `Failed`
/// outcomes with the detail passed through unmodified.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Opaque backend failure, detail verbatim
    #[error("{0}")]
    Backend(String),

    /// Put without overwrite hit an existing parameter
    #[error("parameter already exists: {0}")]
    AlreadyExists(ParamPath),
}

/// One page of a paginated fetch
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterPage {
    /// Records in this page
    pub parameters: Vec<Parameter>,
    /// Opaque continuation token; `None` on the last page
    pub next_token: Option<String>,
}

/// Read side of the store collaborator
///
/// `decrypt` controls the representation of `SecureString` values: when
/// `false` the backend must return ciphertext or a placeholder, and it must
/// do so consistently: both sides of any diff/copy must be fetched in the
/// same representation.
#[async_trait]
pub trait ParameterStoreReader: Send + Sync {
    /// Fetch one page of parameters under `prefix`
    ///
    /// # Errors
    /// Backend errors are returned as-is.
    async fn fetch_page(
        &self,
        prefix: &ParamPath,
        recursive: bool,
        decrypt: bool,
        token: Option<&str>,
    ) -> Result<ParameterPage, StoreError>;
}

/// Write side of the store collaborator
#[async_trait]
pub trait ParameterStoreWriter: Send + Sync {
    /// Write one parameter
    ///
    /// `kms_key_id` only applies to `SecureString` writes; backends without
    /// key management accept and ignore it.
    ///
    /// # Errors
    /// Backend errors are returned as-is; the copy executor records them as
    /// `Failed` outcomes.
    async fn put(
        &self,
        path: &ParamPath,
        value: &str,
        kind: ParameterKind,
        overwrite: bool,
        kms_key_id: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Fetch a complete, depaginated snapshot under `prefix`, sorted by path
///
/// A fetch is atomic from the caller's point of view: either the full list
/// is returned or the error surfaces with nothing.
///
/// # Errors
/// The first backend error aborts the whole fetch.
pub async fn fetch_all(
    reader: &dyn ParameterStoreReader,
    prefix: &ParamPath,
    recursive: bool,
    decrypt: bool,
) -> Result<Vec<Parameter>, StoreError> {
    let mut parameters = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = reader
            .fetch_page(prefix, recursive, decrypt, token.as_deref())
            .await?;
        parameters.extend(page.parameters);
        match page.next_token {
            Some(next) => token = Some(next),
            None => break,
        }
    }

    parameters.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(prefix = %prefix, count = parameters.len(), "fetched snapshot");
    Ok(parameters)
}

/// Default page size, matching the SSM `GetParametersByPath` maximum
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// In-memory parameter store
///
/// Implements both collaborator traits over a `BTreeMap` keyed by canonical
/// path. Holds a single value representation, so the `decrypt` flag is
/// accepted for interface parity and does not change what is returned (a
/// consistent representation, as the reader contract requires). Puts assign
/// versions (monotonic per path) and timestamps the way the real store does.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<BTreeMap<String, Parameter>>,
    page_size: usize,
}

impl MemoryStore {
    /// Empty store with the default page size
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }

    /// Empty store with an explicit page size (tests exercise depagination
    /// with small pages)
    #[inline]
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            inner: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Insert a record as-is, bypassing version assignment
    pub fn seed(&self, parameters: impl IntoIterator<Item = Parameter>) {
        let mut map = self.inner.lock();
        for param in parameters {
            let _ = map.insert(param.path.to_string(), param);
        }
    }

    /// Current record at `path`, if any
    #[must_use]
    pub fn get(&self, path: &ParamPath) -> Option<Parameter> {
        self.inner.lock().get(&path.to_string()).cloned()
    }

    /// All records, sorted by path
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        self.inner.lock().values().cloned().collect()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ParameterStoreReader for MemoryStore {
    async fn fetch_page(
        &self,
        prefix: &ParamPath,
        recursive: bool,
        _decrypt: bool,
        token: Option<&str>,
    ) -> Result<ParameterPage, StoreError> {
        let offset: usize = match token {
            None => 0,
            Some(t) => t
                .parse()
                .map_err(|_| StoreError::Backend(format!("invalid pagination token '{t}'")))?,
        };

        // Strict descendants only, matching GetParametersByPath: a parameter
        // stored exactly at the prefix is not part of the subtree listing.
        let matching: Vec<Parameter> = self
            .inner
            .lock()
            .values()
            .filter(|p| {
                p.path != *prefix
                    && prefix.is_prefix_of(&p.path)
                    && (recursive || p.path.len() == prefix.len() + 1)
            })
            .cloned()
            .collect();

        let end = (offset + self.page_size).min(matching.len());
        let next_token = (end < matching.len()).then(|| end.to_string());
        Ok(ParameterPage {
            parameters: matching.get(offset..end).unwrap_or_default().to_vec(),
            next_token,
        })
    }
}

#[async_trait]
impl ParameterStoreWriter for MemoryStore {
    async fn put(
        &self,
        path: &ParamPath,
        value: &str,
        kind: ParameterKind,
        overwrite: bool,
        _kms_key_id: Option<&str>,
    ) -> Result<(), StoreError> {
        let mut map = self.inner.lock();
        let key = path.to_string();

        let version = match map.get(&key) {
            Some(_) if !overwrite => return Err(StoreError::AlreadyExists(path.clone())),
            Some(existing) => existing.version + 1,
            None => 1,
        };

        let _ = map.insert(
            key,
            Parameter::new(path.clone(), value, kind, version, Utc::now()),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn param(path: &str, value: &str) -> Parameter {
        Parameter::new(
            path.parse().unwrap(),
            value,
            ParameterKind::String,
            1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn root(s: &str) -> ParamPath {
        s.parse().unwrap()
    }

    fn seeded(paths: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        store.seed(paths.iter().map(|p| param(p, "v")));
        store
    }

    #[tokio::test]
    async fn fetch_all_depaginates_and_sorts() {
        let store = MemoryStore::with_page_size(2);
        store.seed(["/app/e", "/app/a", "/app/c", "/app/b", "/app/d"].map(|p| param(p, "v")));

        let all = fetch_all(&store, &root("/app"), true, false).await.unwrap();

        let paths: Vec<String> = all.iter().map(|p| p.path.to_string()).collect();
        assert_eq!(paths, ["/app/a", "/app/b", "/app/c", "/app/d", "/app/e"]);
    }

    #[tokio::test]
    async fn fetch_page_respects_page_size() {
        let store = MemoryStore::with_page_size(2);
        store.seed(["/app/a", "/app/b", "/app/c"].map(|p| param(p, "v")));

        let first = store.fetch_page(&root("/app"), true, false, None).await.unwrap();
        assert_eq!(first.parameters.len(), 2);
        let token = first.next_token.unwrap();

        let second = store
            .fetch_page(&root("/app"), true, false, Some(&token))
            .await
            .unwrap();
        assert_eq!(second.parameters.len(), 1);
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn fetch_rejects_garbage_token() {
        let store = seeded(&["/app/a"]);
        let result = store.fetch_page(&root("/app"), true, false, Some("bogus")).await;
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn fetch_excludes_other_prefixes() {
        let store = seeded(&["/app/key", "/other/key"]);
        let all = fetch_all(&store, &root("/app"), true, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].path.to_string(), "/app/key");
    }

    #[tokio::test]
    async fn fetch_excludes_parameter_at_exact_prefix() {
        let store = seeded(&["/app", "/app/key"]);
        let all = fetch_all(&store, &root("/app"), true, false).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn fetch_prefix_match_is_segment_wise() {
        let store = seeded(&["/app/key", "/app2/key"]);
        let all = fetch_all(&store, &root("/app"), true, false).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn non_recursive_fetch_lists_direct_children_only() {
        let store = seeded(&["/app/direct", "/app/nested/deeper"]);
        let all = fetch_all(&store, &root("/app"), false, false).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].path.to_string(), "/app/direct");
    }

    #[tokio::test]
    async fn fetch_from_empty_store() {
        let store = MemoryStore::new();
        let all = fetch_all(&store, &root("/app"), true, false).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn put_assigns_version_one() {
        let store = MemoryStore::new();
        store
            .put(&root("/app/key"), "v", ParameterKind::String, false, None)
            .await
            .unwrap();
        assert_eq!(store.get(&root("/app/key")).unwrap().version, 1);
    }

    #[tokio::test]
    async fn put_overwrite_bumps_version() {
        let store = MemoryStore::new();
        let path = root("/app/key");
        store.put(&path, "v1", ParameterKind::String, false, None).await.unwrap();
        store.put(&path, "v2", ParameterKind::String, true, None).await.unwrap();

        let current = store.get(&path).unwrap();
        assert_eq!(current.version, 2);
        assert_eq!(current.value, "v2");
    }

    #[tokio::test]
    async fn put_without_overwrite_rejects_existing() {
        let store = MemoryStore::new();
        let path = root("/app/key");
        store.put(&path, "v1", ParameterKind::String, false, None).await.unwrap();

        let result = store.put(&path, "v2", ParameterKind::String, false, None).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.get(&path).unwrap().value, "v1");
    }
}
