//! paramtree core
//!
//! The in-memory transformation layer over parameter-store snapshots:
//!
//! - [`tree`]: flat parameter list → hierarchical [`TreeNode`](tree::TreeNode)
//! - [`diff`]: two flat lists → ordered [`DiffRecord`](diff::DiffRecord)s
//! - [`copy`]: copy planning (pure) and sequential execution with
//!   partial-failure reporting
//! - [`store`]: the abstract store collaborator boundary
//!
//! Tree building, diffing and planning are pure, side-effect-free
//! computations over caller-owned inputs; each call returns a fresh,
//! independently owned result. The copy executor is the only component with
//! external side effects.
//!
//! # Example
//!
//! ```rust,ignore
//! use paramtree_core::prelude::*;
//!
//! let params = fetch_all(&store, &prefix, true, false).await?;
//! let tree = build_tree(&params, &prefix)?;
//! println!("{} parameters", tree.parameter_count());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod copy;
pub mod diff;
pub mod error;
pub mod store;
pub mod tree;

pub use copy::{
    execute_copy, plan_copy, CopyAction, CopyOutcome, CopyStatus, CopySummary,
    DestinationSnapshot, SkipReason,
};
pub use diff::{diff_namespaces, DiffRecord};
pub use error::CoreError;
pub use store::{
    fetch_all, MemoryStore, ParameterPage, ParameterStoreReader, ParameterStoreWriter, StoreError,
};
pub use tree::{build_tree, filter_parameters, TreeNode};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the paramtree core
    pub use crate::{
        build_tree, diff_namespaces, execute_copy, fetch_all, filter_parameters, plan_copy,
        CopyAction, CopyOutcome, CopyStatus, CopySummary, CoreError, DestinationSnapshot,
        DiffRecord, MemoryStore, ParameterStoreReader, ParameterStoreWriter, TreeNode,
    };
    pub use paramtree_model::{ParamPath, Parameter, ParameterKind};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
