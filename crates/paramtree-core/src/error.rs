//! Error types for the paramtree core
//!
//! Two families, kept deliberately apart:
//! - validation errors ([`CoreError`]) abort a single operation immediately
//!   and never represent partial state;
//! - per-action write failures are *data* (a
//!   [`CopyOutcome`](crate::copy::CopyOutcome) entry) and never raised.

use paramtree_model::PathError;

use crate::store::StoreError;

/// Errors raised by tree building, diffing and copy planning
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Parameter path is not rooted under the stated prefix
    #[error("parameter '{path}' is not under prefix '{prefix}'")]
    PathOutsidePrefix {
        /// Offending parameter path
        path: String,
        /// Prefix the operation was rooted at
        prefix: String,
    },

    /// Malformed path
    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    /// Malformed filter pattern
    #[error("invalid filter pattern '{pattern}': {reason}")]
    InvalidFilter {
        /// The pattern as given
        pattern: String,
        /// What the regex engine objected to
        reason: String,
    },

    /// Store fetch failed
    ///
    /// Fetches are atomic (full list or nothing), so backend errors surface
    /// as-is. Write-side backend errors become `Failed` outcomes instead.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CoreError {
    /// Convert a path error into the prefix-violation variant
    ///
    /// Used where a [`PathError::NotDescendant`] carries the operation's
    /// prefix context.
    #[inline]
    #[must_use]
    pub(crate) fn outside_prefix(path: &paramtree_model::ParamPath, prefix: &paramtree_model::ParamPath) -> Self {
        Self::PathOutsidePrefix {
            path: path.to_string(),
            prefix: prefix.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_both_paths() {
        let err = CoreError::PathOutsidePrefix {
            path: "/other/key".to_string(),
            prefix: "/app".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/other/key"));
        assert!(msg.contains("/app"));
    }

    #[test]
    fn store_error_passes_through_unmodified() {
        let err = CoreError::from(StoreError::Backend("ThrottlingException".to_string()));
        assert_eq!(err.to_string(), "ThrottlingException");
    }
}
