//! paramtree value objects
//!
//! Immutable building blocks shared by every paramtree crate:
//!
//! - [`ParamPath`]: absolute slash-delimited path, validated segment list
//! - [`ParameterKind`]: closed store value type enumeration
//! - [`Parameter`]: one path/value/kind/version record
//!
//! # Example
//!
//! ```rust
//! use paramtree_model::{ParamPath, Parameter, ParameterKind};
//!
//! let path: ParamPath = "/app/prod/db/host".parse()?;
//! assert_eq!(path.name(), Some("host"));
//! assert_eq!(path.relative_to(&"/app/prod".parse()?)?, "db/host");
//! # Ok::<(), paramtree_model::PathError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod parameter;
mod path;

pub use parameter::{Parameter, ParameterKind, UnknownKind};
pub use path::{ParamPath, PathError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
