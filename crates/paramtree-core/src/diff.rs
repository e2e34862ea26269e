//! Namespace diffing
//!
//! Compares two flat parameter snapshots by relative path and classifies
//! every path into exactly one [`DiffRecord`].

use std::collections::{BTreeMap, BTreeSet};

use paramtree_model::{ParamPath, Parameter};
use serde::Serialize;

use crate::error::CoreError;

/// One diff entry, keyed by relative path
///
/// Orientation is source-centric: `Added` means the parameter exists only in
/// the source namespace (it *would be added* to the destination by a copy),
/// `Removed` means it exists only in the destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DiffRecord {
    /// Present only in the source namespace
    Added {
        /// Relative path (shared key)
        path: String,
        /// The source parameter
        new: Parameter,
    },
    /// Present only in the destination namespace
    Removed {
        /// Relative path (shared key)
        path: String,
        /// The destination parameter
        old: Parameter,
    },
    /// Present in both, value and/or kind differ
    Changed {
        /// Relative path (shared key)
        path: String,
        /// Source-side parameter
        old: Parameter,
        /// Destination-side parameter
        new: Parameter,
    },
    /// Present in both with equal value and kind
    Unchanged {
        /// Relative path (shared key)
        path: String,
        /// The (source-side) parameter
        param: Parameter,
    },
}

impl DiffRecord {
    /// Relative path this record is keyed by
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Added { path, .. }
            | Self::Removed { path, .. }
            | Self::Changed { path, .. }
            | Self::Unchanged { path, .. } => path,
        }
    }

    /// Whether this record represents an actual difference
    #[inline]
    #[must_use]
    pub fn is_difference(&self) -> bool {
        !matches!(self, Self::Unchanged { .. })
    }
}

/// Diff two namespaces by relative path
///
/// `/app/prod/db/pass` under root `/app/prod` and `/app/staging/db/pass`
/// under root `/app/staging` compare as the same key `db/pass`. Records are
/// returned sorted ascending by relative path, so output is deterministic
/// and scriptable.
///
/// `SecureString` values are compared on whatever representation the caller
/// supplied (ciphertext or plaintext). The differ is agnostic to decryption
/// state; fetching the two sides in different states produces meaningless
/// false positives, so both sides must be fetched alike.
///
/// # Errors
/// Returns [`CoreError::PathOutsidePrefix`] if any parameter is not rooted
/// under its stated namespace root.
pub fn diff_namespaces(
    source: &[Parameter],
    dest: &[Parameter],
    source_root: &ParamPath,
    dest_root: &ParamPath,
) -> Result<Vec<DiffRecord>, CoreError> {
    let source_map = relative_map(source, source_root)?;
    let dest_map = relative_map(dest, dest_root)?;

    let keys: BTreeSet<&String> = source_map.keys().chain(dest_map.keys()).collect();

    let records = keys
        .into_iter()
        .map(|key| match (source_map.get(key), dest_map.get(key)) {
            (Some(new), None) => DiffRecord::Added {
                path: key.clone(),
                new: (*new).clone(),
            },
            (None, Some(old)) => DiffRecord::Removed {
                path: key.clone(),
                old: (*old).clone(),
            },
            (Some(old), Some(new)) if old.value == new.value && old.kind == new.kind => {
                DiffRecord::Unchanged {
                    path: key.clone(),
                    param: (*old).clone(),
                }
            }
            (Some(old), Some(new)) => DiffRecord::Changed {
                path: key.clone(),
                old: (*old).clone(),
                new: (*new).clone(),
            },
            (None, None) => unreachable!("key came from one of the two maps"),
        })
        .collect();

    Ok(records)
}

fn relative_map<'a>(
    params: &'a [Parameter],
    root: &ParamPath,
) -> Result<BTreeMap<String, &'a Parameter>, CoreError> {
    params
        .iter()
        .map(|p| {
            let rel = p
                .path
                .relative_to(root)
                .map_err(|_| CoreError::outside_prefix(&p.path, root))?;
            Ok((rel, p))
        })
        .collect()
}
