//! Rendering
//!
//! All redaction policy lives here, in the presentation layer: the core
//! hands over raw records and this module decides what a terminal or JSON
//! consumer gets to see.

use comfy_table::{Cell, Color, Table};
use paramtree_core::{CopyAction, CopyOutcome, CopyStatus, DiffRecord, TreeNode};
use paramtree_model::{ParamPath, Parameter, ParameterKind};

/// Placeholder shown instead of an undecrypted or withheld secret value
pub const REDACTED: &str = "[redacted]";

const MAX_VALUE_LEN: usize = 60;

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_VALUE_LEN {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_VALUE_LEN).collect();
        format!("{head}…")
    }
}

/// Value as shown in tree and table views
///
/// `SecureString` values are replaced with [`REDACTED`] unless they were
/// fetched decrypted; everything else is shown truncated.
#[must_use]
pub fn display_value(param: &Parameter, decrypt: bool) -> String {
    if param.is_secure() && !decrypt {
        REDACTED.to_string()
    } else {
        truncate(&param.value)
    }
}

/// Copy of `param` with the value redacted unless secrets were requested
///
/// Used for JSON output, which defaults to withholding secret values even
/// when they were fetched decrypted.
#[must_use]
pub fn redacted_for_json(param: &Parameter, include_secrets: bool) -> Parameter {
    let mut out = param.clone();
    if out.is_secure() && !include_secrets {
        out.value = REDACTED.to_string();
    }
    out
}

/// Flat parameter list as a JSON value, with redaction applied
#[must_use]
pub fn params_to_json(params: &[Parameter], include_secrets: bool) -> serde_json::Value {
    let redacted: Vec<Parameter> = params
        .iter()
        .map(|p| redacted_for_json(p, include_secrets))
        .collect();
    serde_json::to_value(redacted).unwrap_or_default()
}

/// Diff records as a JSON value, with redaction applied
#[must_use]
pub fn diff_to_json(records: &[DiffRecord], include_secrets: bool) -> serde_json::Value {
    let redacted: Vec<DiffRecord> = records
        .iter()
        .map(|record| match record {
            DiffRecord::Added { path, new } => DiffRecord::Added {
                path: path.clone(),
                new: redacted_for_json(new, include_secrets),
            },
            DiffRecord::Removed { path, old } => DiffRecord::Removed {
                path: path.clone(),
                old: redacted_for_json(old, include_secrets),
            },
            DiffRecord::Changed { path, old, new } => DiffRecord::Changed {
                path: path.clone(),
                old: redacted_for_json(old, include_secrets),
                new: redacted_for_json(new, include_secrets),
            },
            DiffRecord::Unchanged { path, param } => DiffRecord::Unchanged {
                path: path.clone(),
                param: redacted_for_json(param, include_secrets),
            },
        })
        .collect();
    serde_json::to_value(redacted).unwrap_or_default()
}

fn node_label(node: &TreeNode, show_values: bool, decrypt: bool) -> String {
    match &node.parameter {
        Some(param) if node.is_namespace() => {
            // Namespace that also carries a parameter at its own path
            if show_values {
                format!("{}  ({})", node.name, display_value(param, decrypt))
            } else {
                format!("{} [{}]", node.name, param.kind)
            }
        }
        Some(param) => {
            let mut label = format!("{} [{}]", node.name, param.kind);
            if show_values {
                label.push_str("  ");
                label.push_str(&display_value(param, decrypt));
            }
            label
        }
        None => node.name.clone(),
    }
}

fn walk(node: &TreeNode, prefix: &str, show_values: bool, decrypt: bool, out: &mut String) {
    let count = node.children.len();
    for (index, child) in node.children.values().enumerate() {
        let last = index + 1 == count;
        let connector = if last { "└── " } else { "├── " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(&node_label(child, show_values, decrypt));
        out.push('\n');

        let child_prefix = format!("{prefix}{}", if last { "    " } else { "│   " });
        walk(child, &child_prefix, show_values, decrypt, out);
    }
}

/// Render a parameter tree with unicode branch glyphs
#[must_use]
pub fn render_tree(root: &TreeNode, show_values: bool, decrypt: bool) -> String {
    let mut out = String::new();
    out.push_str(&root.path.to_string());
    if let Some(param) = &root.parameter {
        out.push_str(&format!(" [{}]", param.kind));
        if show_values {
            out.push_str("  ");
            out.push_str(&display_value(param, decrypt));
        }
    }
    out.push('\n');
    walk(root, "", show_values, decrypt, &mut out);
    out
}

/// Render the differing records as a table
///
/// `Unchanged` records are omitted; callers report identical namespaces
/// separately. Column order is source then destination.
#[must_use]
pub fn render_diff_table(
    records: &[DiffRecord],
    source_root: &ParamPath,
    dest_root: &ParamPath,
    show_values: bool,
    decrypt: bool,
) -> Table {
    let mut table = Table::new();
    let mut header = vec![
        Cell::new("Status").fg(Color::Blue),
        Cell::new("Relative Path").fg(Color::Blue),
    ];
    if show_values {
        header.push(Cell::new(source_root.to_string()).fg(Color::Red));
        header.push(Cell::new(dest_root.to_string()).fg(Color::Green));
    }
    let _ = table.set_header(header);

    for record in records.iter().filter(|r| r.is_difference()) {
        let row = match record {
            DiffRecord::Added { path, new } => {
                let mut row = vec!["added".to_string(), path.clone()];
                if show_values {
                    row.push(display_value(new, decrypt));
                    row.push(String::new());
                }
                row
            }
            DiffRecord::Removed { path, old } => {
                let mut row = vec!["removed".to_string(), path.clone()];
                if show_values {
                    row.push(String::new());
                    row.push(display_value(old, decrypt));
                }
                row
            }
            DiffRecord::Changed { path, old, new } => {
                let mut row = vec!["changed".to_string(), path.clone()];
                if show_values {
                    row.push(display_value(old, decrypt));
                    row.push(display_value(new, decrypt));
                }
                row
            }
            DiffRecord::Unchanged { .. } => continue,
        };
        let _ = table.add_row(row);
    }

    table
}

/// Render a copy plan as a table
#[must_use]
pub fn render_plan_table(actions: &[CopyAction]) -> Table {
    let mut table = Table::new();
    let _ = table.set_header(vec![
        Cell::new("Action").fg(Color::Blue),
        Cell::new("Destination Path").fg(Color::Blue),
        Cell::new("Type").fg(Color::Blue),
        Cell::new("Detail").fg(Color::Blue),
    ]);

    for action in actions {
        let row = match action {
            CopyAction::Create { path, kind, .. } => {
                vec!["create".to_string(), path.to_string(), kind.to_string(), String::new()]
            }
            CopyAction::Overwrite {
                path, old_value, kind, ..
            } => {
                // Existing secure values stay hidden in the preview; only
                // plain values are shown.
                let detail = match old_value {
                    Some(_) if *kind == ParameterKind::SecureString => {
                        format!("replaces '{REDACTED}'")
                    }
                    Some(old) => format!("replaces '{}'", truncate(old)),
                    None => "replaces existing value".to_string(),
                };
                vec!["overwrite".to_string(), path.to_string(), kind.to_string(), detail]
            }
            CopyAction::Skip { path, reason } => {
                vec!["skip".to_string(), path.to_string(), String::new(), reason.to_string()]
            }
        };
        let _ = table.add_row(row);
    }

    table
}

/// One line per non-skipped outcome, for the post-copy report
#[must_use]
pub fn outcome_lines(outcomes: &[CopyOutcome]) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome.status {
            CopyStatus::Succeeded => Some(format!("  ok      {}", outcome.path)),
            CopyStatus::Failed => Some(format!(
                "  failed  {}: {}",
                outcome.path,
                outcome.error.as_deref().unwrap_or("unknown error")
            )),
            CopyStatus::Skipped => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramtree_core::{build_tree, diff_namespaces, plan_copy, DestinationSnapshot};
    use paramtree_test_utils::{param, param_of_kind, prod_params};
    use pretty_assertions::assert_eq;

    fn root(s: &str) -> ParamPath {
        s.parse().unwrap()
    }

    #[test]
    fn tree_rendering_uses_branch_glyphs() {
        let tree = build_tree(&prod_params(), &root("/app/prod")).unwrap();
        let rendered = render_tree(&tree, false, false);

        let expected = "\
/app/prod
├── api
│   ├── allowed_ips [StringList]
│   └── key [SecureString]
├── db
│   ├── host [String]
│   ├── password [SecureString]
│   └── port [String]
└── feature_flags [StringList]
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn tree_values_shown_on_request() {
        let tree = build_tree(&[param("/app/key", "hello")], &root("/app")).unwrap();

        let hidden = render_tree(&tree, false, false);
        assert!(!hidden.contains("hello"));

        let shown = render_tree(&tree, true, false);
        assert!(shown.contains("hello"));
    }

    #[test]
    fn tree_redacts_undecrypted_secrets() {
        let params = [param_of_kind("/app/secret", "s3cr3t", ParameterKind::SecureString)];
        let tree = build_tree(&params, &root("/app")).unwrap();

        let redacted = render_tree(&tree, true, false);
        assert!(redacted.contains(REDACTED));
        assert!(!redacted.contains("s3cr3t"));

        let revealed = render_tree(&tree, true, true);
        assert!(revealed.contains("s3cr3t"));
    }

    #[test]
    fn tree_shows_parameter_on_root_node() {
        let params = [param("/app/prod", "root-value"), param("/app/prod/key", "v")];
        let tree = build_tree(&params, &root("/app/prod")).unwrap();
        let rendered = render_tree(&tree, true, false);
        assert!(rendered.starts_with("/app/prod [String]  root-value\n"));
    }

    #[test]
    fn long_values_truncated() {
        let long = "x".repeat(100);
        let params = [param("/app/key", &long)];
        let tree = build_tree(&params, &root("/app")).unwrap();
        let rendered = render_tree(&tree, true, false);
        assert!(rendered.contains('…'));
        assert!(!rendered.contains(&long));
    }

    #[test]
    fn diff_table_omits_unchanged() {
        let source = [param("/prod/same", "v"), param("/prod/only", "v")];
        let dest = [param("/staging/same", "v")];
        let records =
            diff_namespaces(&source, &dest, &root("/prod"), &root("/staging")).unwrap();

        let table = render_diff_table(&records, &root("/prod"), &root("/staging"), false, false);
        let rendered = table.to_string();
        assert!(rendered.contains("added"));
        assert!(rendered.contains("only"));
        assert!(!rendered.contains("unchanged"));
    }

    #[test]
    fn diff_table_value_columns_follow_orientation() {
        let source = [param("/prod/key", "source-value")];
        let dest = [param("/staging/key", "dest-value")];
        let records =
            diff_namespaces(&source, &dest, &root("/prod"), &root("/staging")).unwrap();

        let table = render_diff_table(&records, &root("/prod"), &root("/staging"), true, false);
        let rendered = table.to_string();
        assert!(rendered.contains("source-value"));
        assert!(rendered.contains("dest-value"));
        assert!(rendered.contains("changed"));
    }

    #[test]
    fn plan_table_lists_every_action() {
        let source = [param("/prod/a", "1"), param("/prod/b", "2")];
        let mut dest = DestinationSnapshot::empty();
        dest.insert("a", Some("old-a".to_string()));

        let actions =
            plan_copy(&source, &root("/prod"), &root("/staging"), &dest, true).unwrap();
        let rendered = render_plan_table(&actions).to_string();

        assert!(rendered.contains("overwrite"));
        assert!(rendered.contains("replaces 'old-a'"));
        assert!(rendered.contains("create"));
        assert!(rendered.contains("/staging/b"));
    }

    #[test]
    fn plan_table_redacts_existing_secure_values() {
        let source = [param_of_kind(
            "/prod/secret",
            "new-secret",
            ParameterKind::SecureString,
        )];
        let mut dest = DestinationSnapshot::empty();
        dest.insert("secret", Some("old-secret-value".to_string()));

        let actions =
            plan_copy(&source, &root("/prod"), &root("/staging"), &dest, true).unwrap();
        let rendered = render_plan_table(&actions).to_string();

        assert!(!rendered.contains("old-secret-value"));
        assert!(rendered.contains(REDACTED));
    }

    #[test]
    fn plan_table_names_skip_reason() {
        let source = [param("/prod/a", "1")];
        let mut dest = DestinationSnapshot::empty();
        dest.insert("a", None);

        let actions =
            plan_copy(&source, &root("/prod"), &root("/staging"), &dest, false).unwrap();
        let rendered = render_plan_table(&actions).to_string();
        assert!(rendered.contains("already-exists-no-overwrite"));
    }

    #[test]
    fn json_redacts_secrets_by_default() {
        let params = [param_of_kind("/app/secret", "s3cr3t", ParameterKind::SecureString)];

        let withheld = params_to_json(&params, false);
        assert_eq!(withheld[0]["value"], REDACTED);

        let included = params_to_json(&params, true);
        assert_eq!(included[0]["value"], "s3cr3t");
    }

    #[test]
    fn json_leaves_plain_values_alone() {
        let params = [param("/app/key", "plain")];
        let value = params_to_json(&params, false);
        assert_eq!(value[0]["value"], "plain");
    }

    #[test]
    fn diff_json_redacts_both_sides() {
        let source = [param_of_kind("/prod/secret", "old-secret", ParameterKind::SecureString)];
        let dest = [param_of_kind("/staging/secret", "new-secret", ParameterKind::SecureString)];
        let records =
            diff_namespaces(&source, &dest, &root("/prod"), &root("/staging")).unwrap();

        let json = diff_to_json(&records, false);
        assert_eq!(json[0]["old"]["value"], REDACTED);
        assert_eq!(json[0]["new"]["value"], REDACTED);
    }

    #[test]
    fn outcome_lines_skip_skips() {
        let outcomes = [
            CopyOutcome {
                path: root("/staging/a"),
                status: CopyStatus::Succeeded,
                error: None,
            },
            CopyOutcome {
                path: root("/staging/b"),
                status: CopyStatus::Skipped,
                error: None,
            },
            CopyOutcome {
                path: root("/staging/c"),
                status: CopyStatus::Failed,
                error: Some("Throttled".to_string()),
            },
        ];

        let lines = outcome_lines(&outcomes);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("/staging/a"));
        assert!(lines[1].contains("Throttled"));
    }
}
