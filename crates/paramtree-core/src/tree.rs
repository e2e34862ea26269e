//! Tree building
//!
//! Converts a flat parameter snapshot into a hierarchical [`TreeNode`]
//! structure for display. Built fresh per invocation, never persisted.

use std::collections::BTreeMap;

use paramtree_model::{ParamPath, Parameter};
use regex::Regex;

use crate::error::CoreError;

/// A node in the parameter path tree
///
/// Children are keyed by segment name (unique among siblings); `BTreeMap`
/// makes iteration deterministic. A node may carry both children and a
/// parameter when a path is simultaneously a namespace prefix and a leaf.
///
/// The root node has an empty `name`; its `path` is the build prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    /// Final path segment (display label); empty for the root
    pub name: String,
    /// Full path up to and including this segment
    pub path: ParamPath,
    /// Child nodes keyed by segment name
    pub children: BTreeMap<String, TreeNode>,
    /// Parameter stored at exactly this path, if any
    pub parameter: Option<Parameter>,
}

impl TreeNode {
    fn new(name: impl Into<String>, path: ParamPath) -> Self {
        Self {
            name: name.into(),
            path,
            children: BTreeMap::new(),
            parameter: None,
        }
    }

    /// True when this node has no children (pure leaf)
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// True when this node has children (acts as a namespace)
    #[inline]
    #[must_use]
    pub fn is_namespace(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of parameters stored in this subtree
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        usize::from(self.parameter.is_some())
            + self.children.values().map(TreeNode::parameter_count).sum::<usize>()
    }
}

/// Build a tree from a flat parameter list rooted at `root`
///
/// Every intermediate path segment becomes a node; the parameter attaches to
/// the terminal node of its path. Walking is idempotent: re-encountering an
/// existing node never clobbers its children. A path exactly equal to `root`
/// attaches to the root node itself. Duplicate paths in the input are a
/// collaborator contract violation; the last record wins silently.
///
/// # Errors
/// Returns [`CoreError::PathOutsidePrefix`] if any parameter is not rooted
/// under `root`. The check is up-front, so a failed build leaves no partial
/// result behind.
pub fn build_tree(parameters: &[Parameter], root: &ParamPath) -> Result<TreeNode, CoreError> {
    let mut tree = TreeNode::new("", root.clone());

    for param in parameters {
        let segments = param
            .path
            .relative_segments(root)
            .map_err(|_| CoreError::outside_prefix(&param.path, root))?;

        let mut current = &mut tree;
        let mut accumulated = root.clone();
        for segment in segments {
            accumulated = accumulated.child(segment.clone());
            current = current
                .children
                .entry(segment.clone())
                .or_insert_with(|| TreeNode::new(segment.clone(), accumulated.clone()));
        }
        current.parameter = Some(param.clone());
    }

    Ok(tree)
}

/// Filter a flat parameter list by a glob pattern on the full path
///
/// Thin pre-pass applied *before* [`build_tree`]; the tree algorithm itself
/// has no notion of filtering. Supports `*` (any run of characters) and `?`
/// (any single character); everything else matches literally.
///
/// # Errors
/// Returns [`CoreError::InvalidFilter`] if the pattern does not compile.
pub fn filter_parameters(parameters: &[Parameter], pattern: &str) -> Result<Vec<Parameter>, CoreError> {
    let matcher = glob_matcher(pattern)?;
    Ok(parameters
        .iter()
        .filter(|p| matcher.is_match(&p.path.to_string()))
        .cloned()
        .collect())
}

fn glob_matcher(pattern: &str) -> Result<Regex, CoreError> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push('^');
    for c in pattern.chars() {
        match c {
            '*' => translated.push_str(".*"),
            '?' => translated.push('.'),
            c => translated.push_str(&regex::escape(&c.to_string())),
        }
    }
    translated.push('$');

    Regex::new(&translated).map_err(|e| CoreError::InvalidFilter {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
