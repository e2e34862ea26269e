//! Copy planning and execution
//!
//! Planning and execution are separate phases: [`plan_copy`] is a pure
//! computation (dry-run is "plan, render, stop"), [`execute_copy`] is the
//! only component with external side effects and applies actions strictly
//! sequentially, one in flight at a time.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use paramtree_model::{ParamPath, Parameter, ParameterKind};
use serde::Serialize;

use crate::error::CoreError;
use crate::store::ParameterStoreWriter;

/// Why a planned action skips its parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Destination already holds this path and overwrite was not requested
    AlreadyExistsNoOverwrite,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyExistsNoOverwrite => f.write_str("already-exists-no-overwrite"),
        }
    }
}

/// One planned copy action, addressed by destination path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CopyAction {
    /// Write a parameter that does not yet exist at the destination
    Create {
        /// Destination path
        path: ParamPath,
        /// Value to write
        value: String,
        /// Value type
        kind: ParameterKind,
    },
    /// Replace an existing destination parameter
    Overwrite {
        /// Destination path
        path: ParamPath,
        /// Existing destination value, when known (display only)
        old_value: Option<String>,
        /// Value to write
        new_value: String,
        /// Value type
        kind: ParameterKind,
    },
    /// Leave the destination untouched
    Skip {
        /// Destination path
        path: ParamPath,
        /// Why the parameter is skipped
        reason: SkipReason,
    },
}

impl CopyAction {
    /// Destination path this action addresses
    #[inline]
    #[must_use]
    pub fn path(&self) -> &ParamPath {
        match self {
            Self::Create { path, .. } | Self::Overwrite { path, .. } | Self::Skip { path, .. } => {
                path
            }
        }
    }

    /// Whether this action would contact the store
    #[inline]
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Skip { .. })
    }
}

/// What the destination namespace currently holds, keyed by relative path
///
/// The value is the destination's current value when known (used for
/// overwrite previews), `None` when only existence is known.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DestinationSnapshot {
    entries: BTreeMap<String, Option<String>>,
}

impl DestinationSnapshot {
    /// Empty snapshot (nothing exists at the destination)
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a fetched destination parameter list
    ///
    /// # Errors
    /// Returns [`CoreError::PathOutsidePrefix`] if any parameter is not
    /// rooted under `root`.
    pub fn from_parameters(params: &[Parameter], root: &ParamPath) -> Result<Self, CoreError> {
        let entries = params
            .iter()
            .map(|p| {
                let rel = p
                    .path
                    .relative_to(root)
                    .map_err(|_| CoreError::outside_prefix(&p.path, root))?;
                Ok((rel, Some(p.value.clone())))
            })
            .collect::<Result<_, CoreError>>()?;
        Ok(Self { entries })
    }

    /// Record a path as existing, with its current value when known
    #[inline]
    pub fn insert(&mut self, relative: impl Into<String>, value: Option<String>) {
        let _ = self.entries.insert(relative.into(), value);
    }

    /// Whether the destination holds this relative path
    #[inline]
    #[must_use]
    pub fn contains(&self, relative: &str) -> bool {
        self.entries.contains_key(relative)
    }

    /// Current destination value for this relative path, when known
    #[inline]
    #[must_use]
    pub fn value_of(&self, relative: &str) -> Option<&str> {
        self.entries.get(relative).and_then(Option::as_deref)
    }

    /// Number of known destination paths
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is known to exist at the destination
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Plan a namespace copy
///
/// Emits exactly one action per source parameter, in source order (stable,
/// not re-sorted) so the plan matches input enumeration for auditability.
/// Each source path is rebased from `source_root` to `dest_root`; whether
/// the action creates, overwrites or skips depends on the destination
/// snapshot and the `overwrite` policy.
///
/// Planning never mutates anything; it is safe to plan and then discard.
///
/// # Errors
/// Returns [`CoreError::PathOutsidePrefix`] if a source parameter is not
/// rooted under `source_root`.
pub fn plan_copy(
    source: &[Parameter],
    source_root: &ParamPath,
    dest_root: &ParamPath,
    dest: &DestinationSnapshot,
    overwrite: bool,
) -> Result<Vec<CopyAction>, CoreError> {
    source
        .iter()
        .map(|param| {
            let relative = param
                .path
                .relative_to(source_root)
                .map_err(|_| CoreError::outside_prefix(&param.path, source_root))?;
            let dest_path = param
                .path
                .rebase(source_root, dest_root)
                .map_err(|_| CoreError::outside_prefix(&param.path, source_root))?;

            let action = if !dest.contains(&relative) {
                CopyAction::Create {
                    path: dest_path,
                    value: param.value.clone(),
                    kind: param.kind,
                }
            } else if overwrite {
                CopyAction::Overwrite {
                    path: dest_path,
                    old_value: dest.value_of(&relative).map(str::to_string),
                    new_value: param.value.clone(),
                    kind: param.kind,
                }
            } else {
                CopyAction::Skip {
                    path: dest_path,
                    reason: SkipReason::AlreadyExistsNoOverwrite,
                }
            };
            Ok(action)
        })
        .collect()
}

/// Terminal state of one executed (or skipped) action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    /// Store write succeeded
    Succeeded,
    /// Store write failed; detail in [`CopyOutcome::error`]
    Failed,
    /// Action was a skip; the store was never contacted
    Skipped,
}

/// Per-action execution result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyOutcome {
    /// Destination path
    pub path: ParamPath,
    /// Terminal status; `Skipped` is distinct from success and failure
    pub status: CopyStatus,
    /// Backend error detail, passed through unmodified
    pub error: Option<String>,
}

/// Aggregate counts over an outcome list
///
/// Computing the summary and deciding the process exit status are the
/// caller's job; the executor only reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopySummary {
    /// Writes that succeeded
    pub succeeded: usize,
    /// Writes that failed
    pub failed: usize,
    /// Actions skipped without contacting the store
    pub skipped: usize,
}

impl CopySummary {
    /// Tally an outcome list
    #[must_use]
    pub fn of(outcomes: &[CopyOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.status {
                CopyStatus::Succeeded => summary.succeeded += 1,
                CopyStatus::Failed => summary.failed += 1,
                CopyStatus::Skipped => summary.skipped += 1,
            }
        }
        summary
    }

    /// Number of actions that contacted the store
    #[inline]
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    /// Whether any write failed
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Execute planned actions against a store writer
///
/// Actions run sequentially, one in flight at a time, in input order. A
/// failed write is recorded and the batch *continues*: no abort, no
/// rollback, no retry. `Skip` actions never contact the store. The returned
/// list holds exactly one outcome per input action, in order, so the set of
/// written paths at any point during execution is exactly the prefix of
/// successful outcomes.
///
/// `kms_key_id` is forwarded to the store for `SecureString` writes only.
pub async fn execute_copy(
    actions: &[CopyAction],
    writer: &dyn ParameterStoreWriter,
    kms_key_id: Option<&str>,
) -> Vec<CopyOutcome> {
    let mut outcomes = Vec::with_capacity(actions.len());

    for action in actions {
        let outcome = match action {
            CopyAction::Skip { path, reason } => {
                tracing::debug!(path = %path, reason = %reason, "skipping");
                CopyOutcome {
                    path: path.clone(),
                    status: CopyStatus::Skipped,
                    error: None,
                }
            }
            CopyAction::Create { path, value, kind } => {
                apply_write(writer, path, value, *kind, false, kms_key_id).await
            }
            CopyAction::Overwrite {
                path, new_value, kind, ..
            } => apply_write(writer, path, new_value, *kind, true, kms_key_id).await,
        };
        outcomes.push(outcome);
    }

    outcomes
}

async fn apply_write(
    writer: &dyn ParameterStoreWriter,
    path: &ParamPath,
    value: &str,
    kind: ParameterKind,
    overwrite: bool,
    kms_key_id: Option<&str>,
) -> CopyOutcome {
    let key = kms_key_id.filter(|_| kind == ParameterKind::SecureString);
    match writer.put(path, value, kind, overwrite, key).await {
        Ok(()) => {
            tracing::info!(path = %path, overwrite, "wrote parameter");
            CopyOutcome {
                path: path.clone(),
                status: CopyStatus::Succeeded,
                error: None,
            }
        }
        Err(e) => {
            tracing::warn!(path = %path, error = %e, "write failed, continuing");
            CopyOutcome {
                path: path.clone(),
                status: CopyStatus::Failed,
                error: Some(e.to_string()),
            }
        }
    }
}
