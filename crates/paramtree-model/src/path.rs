//! Absolute parameter paths
//!
//! Provides [`ParamPath`] for addressing parameters within a slash-delimited
//! namespace hierarchy.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Absolute path of a parameter or namespace
///
/// Stored as an ordered sequence of validated segments, computed once at
/// parse time and never re-parsed. The root namespace is the empty segment
/// list, displayed as `/`.
///
/// # Examples
/// - `["app", "prod", "db", "host"]` → `/app/prod/db/host`
/// - `[]` → `/`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParamPath(Vec<String>);

impl ParamPath {
    /// The root namespace (`/`)
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Path segments from root to leaf
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root namespace
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this is the root namespace
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Final segment (the parameter's display name), `None` for root
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Parent namespace, `None` for root
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Append a segment, returning the new path
    ///
    /// The segment is trusted; validation happens at parse time.
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Check whether this path is a prefix of another
    ///
    /// Every path is a prefix of itself; the root is a prefix of everything.
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Segments of this path relative to `prefix`
    ///
    /// # Errors
    /// Returns [`PathError::NotDescendant`] if `prefix` is not a prefix of
    /// this path.
    pub fn relative_segments(&self, prefix: &Self) -> Result<&[String], PathError> {
        if !prefix.is_prefix_of(self) {
            return Err(PathError::NotDescendant {
                path: self.to_string(),
                ancestor: prefix.to_string(),
            });
        }
        Ok(&self.0[prefix.0.len()..])
    }

    /// Relative path under `prefix`, joined with `/` (no leading slash)
    ///
    /// A path equal to `prefix` yields the empty string.
    ///
    /// # Errors
    /// Returns [`PathError::NotDescendant`] if `prefix` is not a prefix of
    /// this path.
    pub fn relative_to(&self, prefix: &Self) -> Result<String, PathError> {
        Ok(self.relative_segments(prefix)?.join("/"))
    }

    /// Rewrite this path from one namespace root to another
    ///
    /// Used when copying: the `from` portion is replaced with `to`, the
    /// relative suffix is preserved.
    ///
    /// # Errors
    /// Returns [`PathError::NotDescendant`] if this path is not under `from`.
    pub fn rebase(&self, from: &Self, to: &Self) -> Result<Self, PathError> {
        let suffix = self.relative_segments(from)?;
        let mut segments = to.0.clone();
        segments.extend(suffix.iter().cloned());
        Ok(Self(segments))
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Display for ParamPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "/{}", self.0.join("/"))
        }
    }
}

fn valid_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-'
}

impl FromStr for ParamPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PathError::NotAbsolute(s.to_string()));
        };

        // A single trailing slash is tolerated: "/app/" parses as "/app".
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        if rest.is_empty() {
            return Ok(Self::root());
        }

        let segments: Vec<String> = rest
            .split('/')
            .map(|seg| {
                if seg.is_empty() {
                    Err(PathError::EmptySegment(s.to_string()))
                } else if seg.contains(|c: char| !valid_segment_char(c)) {
                    Err(PathError::InvalidSegment(seg.to_string()))
                } else {
                    Ok(seg.to_string())
                }
            })
            .collect::<Result<_, _>>()?;

        Ok(Self(segments))
    }
}

impl TryFrom<String> for ParamPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ParamPath> for String {
    fn from(path: ParamPath) -> Self {
        path.to_string()
    }
}

/// Errors related to parameter paths
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    /// Empty input
    #[error("path must not be empty")]
    Empty,

    /// Missing leading slash
    #[error("path '{0}' is not absolute (must start with '/')")]
    NotAbsolute(String),

    /// Empty segment (`//`) in path
    #[error("path '{0}' contains an empty segment")]
    EmptySegment(String),

    /// Invalid segment characters
    #[error("invalid path segment '{0}' (allowed: alphanumerics, '.', '_', '-')")]
    InvalidSegment(String),

    /// Not a descendant path
    #[error("path '{path}' is not under '{ancestor}'")]
    NotDescendant { path: String, ancestor: String },
}
