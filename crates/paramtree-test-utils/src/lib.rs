//! Testing utilities for the paramtree workspace
//!
//! Shared fixtures and store doubles: parameter builders, the canonical
//! prod/staging namespaces used across crate tests, a writer that fails on
//! configured paths and a writer that records every call.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use paramtree_core::{MemoryStore, ParameterStoreWriter, StoreError};
use paramtree_model::{ParamPath, Parameter, ParameterKind};

/// Fixed timestamp used by all fixtures so trees and diffs compare equal.
#[must_use]
pub fn fixture_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
}

/// Build a `String` parameter at `path`.
#[must_use]
pub fn param(path: &str, value: &str) -> Parameter {
    param_of_kind(path, value, ParameterKind::String)
}

/// Build a parameter of an explicit kind at `path`.
#[must_use]
pub fn param_of_kind(path: &str, value: &str, kind: ParameterKind) -> Parameter {
    Parameter::new(path.parse().unwrap(), value, kind, 1, fixture_time())
}

/// The `/app/prod` namespace fixture: strings, secure strings and lists,
/// nested two levels deep.
#[must_use]
pub fn prod_params() -> Vec<Parameter> {
    vec![
        param("/app/prod/db/host", "prod-db.example.com"),
        param("/app/prod/db/port", "5432"),
        param_of_kind(
            "/app/prod/db/password",
            "FAKE-test-password",
            ParameterKind::SecureString,
        ),
        param_of_kind(
            "/app/prod/api/key",
            "TEST-api-key-not-real",
            ParameterKind::SecureString,
        ),
        param_of_kind(
            "/app/prod/api/allowed_ips",
            "10.0.0.1,10.0.0.2,10.0.0.3",
            ParameterKind::StringList,
        ),
        param_of_kind(
            "/app/prod/feature_flags",
            "dark_mode,beta_ui",
            ParameterKind::StringList,
        ),
    ]
}

/// The `/app/staging` namespace fixture: overlaps prod on `db/*` and
/// `api/key`, missing the rest.
#[must_use]
pub fn staging_params() -> Vec<Parameter> {
    vec![
        param("/app/staging/db/host", "staging-db.example.com"),
        param("/app/staging/db/port", "5432"),
        param_of_kind(
            "/app/staging/db/password",
            "FAKE-staging-password",
            ParameterKind::SecureString,
        ),
        param_of_kind(
            "/app/staging/api/key",
            "TEST-staging-key-not-real",
            ParameterKind::SecureString,
        ),
    ]
}

/// A `MemoryStore` pre-seeded with both namespace fixtures.
#[must_use]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(prod_params());
    store.seed(staging_params());
    store
}

/// Writer double that fails every put whose path is in the configured set,
/// delegating the rest to an inner [`MemoryStore`].
pub struct FlakyWriter {
    pub inner: MemoryStore,
    fail_paths: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl FlakyWriter {
    #[must_use]
    pub fn failing_on(paths: &[&str]) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_paths: paths.iter().map(|s| (*s).to_string()).collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Paths of every put attempted, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ParameterStoreWriter for FlakyWriter {
    async fn put(
        &self,
        path: &ParamPath,
        value: &str,
        kind: ParameterKind,
        overwrite: bool,
        kms_key_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.calls.lock().push(path.to_string());
        if self.fail_paths.contains(&path.to_string()) {
            return Err(StoreError::Backend(
                "InternalServerError: injected failure".to_string(),
            ));
        }
        self.inner.put(path, value, kind, overwrite, kms_key_id).await
    }
}

/// Writer double that records calls and writes nothing.
///
/// Useful for asserting dry-run purity: plan, then assert zero calls.
#[derive(Default)]
pub struct RecordingWriter {
    calls: Mutex<Vec<String>>,
}

impl RecordingWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ParameterStoreWriter for RecordingWriter {
    async fn put(
        &self,
        path: &ParamPath,
        _value: &str,
        _kind: ParameterKind,
        _overwrite: bool,
        _kms_key_id: Option<&str>,
    ) -> Result<(), StoreError> {
        self.calls.lock().push(path.to_string());
        Ok(())
    }
}
