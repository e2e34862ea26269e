//! Parameter records
//!
//! [`Parameter`] is the immutable value object a store snapshot is made of;
//! [`ParameterKind`] is the closed set of store value types.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::ParamPath;

/// Store value type
///
/// Closed enumeration; an invalid kind is unrepresentable. Wire names match
/// the SSM parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    /// Plain string value
    String,
    /// Value encrypted at rest; must be explicitly decrypted to view
    SecureString,
    /// Comma-separated list of strings
    StringList,
}

impl Display for ParameterKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "String",
            Self::SecureString => "SecureString",
            Self::StringList => "StringList",
        };
        f.write_str(name)
    }
}

impl FromStr for ParameterKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "String" => Ok(Self::String),
            "SecureString" => Ok(Self::SecureString),
            "StringList" => Ok(Self::StringList),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// Unrecognized parameter kind name
#[derive(Debug, thiserror::Error)]
#[error("unknown parameter kind '{0}' (expected String, SecureString or StringList)")]
pub struct UnknownKind(pub String);

/// One stored parameter record
///
/// `path` uniquely identifies a parameter within a snapshot. `version` and
/// `last_modified` are store-assigned. For `SecureString` parameters,
/// `value` holds whatever representation the fetch produced (ciphertext,
/// plaintext or placeholder); the record itself is agnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Absolute path
    pub path: ParamPath,
    /// Parameter value
    pub value: String,
    /// Value type
    pub kind: ParameterKind,
    /// Store-assigned version, monotonically increasing per path
    pub version: u64,
    /// Store-assigned modification timestamp
    pub last_modified: DateTime<Utc>,
}

impl Parameter {
    /// Create a record with explicit store-assigned fields
    #[inline]
    #[must_use]
    pub fn new(
        path: ParamPath,
        value: impl Into<String>,
        kind: ParameterKind,
        version: u64,
        last_modified: DateTime<Utc>,
    ) -> Self {
        Self {
            path,
            value: value.into(),
            kind,
            version,
            last_modified,
        }
    }

    /// Leaf segment of the path
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.name().unwrap_or_default()
    }

    /// Whether this is a `SecureString` parameter
    #[inline]
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.kind == ParameterKind::SecureString
    }

    /// Whether this is a `StringList` parameter
    #[inline]
    #[must_use]
    pub fn is_string_list(&self) -> bool {
        self.kind == ParameterKind::StringList
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn param(path: &str, kind: ParameterKind) -> Parameter {
        Parameter::new(
            path.parse().unwrap(),
            "v",
            kind,
            1,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    #[test]
    fn kind_display_round_trip() {
        for kind in [
            ParameterKind::String,
            ParameterKind::SecureString,
            ParameterKind::StringList,
        ] {
            let parsed: ParameterKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn kind_from_str_rejects_unknown() {
        let result: Result<ParameterKind, _> = "Binary".parse();
        assert!(result.is_err());
    }

    #[test]
    fn parameter_name_is_leaf_segment() {
        let p = param("/app/prod/db/password", ParameterKind::SecureString);
        assert_eq!(p.name(), "password");
    }

    #[test]
    fn kind_helpers() {
        assert!(param("/a", ParameterKind::SecureString).is_secure());
        assert!(!param("/a", ParameterKind::String).is_secure());
        assert!(param("/a", ParameterKind::StringList).is_string_list());
    }

    #[test]
    fn serde_round_trip() {
        let p = param("/app/key", ParameterKind::String);
        let json = serde_json::to_string(&p).unwrap();
        let back: Parameter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
