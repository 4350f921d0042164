//! Top-level declaration outline for the line-based change path
//!
//! The structural differ works on export snapshots; the line-based path
//! instead maps git-diff line numbers onto declaration line ranges. This
//! outline covers every top-level function and class (exported or not),
//! since a diff hunk does not care about export status.

use std::path::Path;

use super::builder::SnapshotBuilder;

/// Kind of an outlined declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Function,
    Class,
}

/// One top-level declaration with its 1-based line range
#[derive(Debug, Clone, serde::Serialize)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub line_start: u32,
    pub line_end: u32,
}

impl Declaration {
    /// Line-range overlap check with a tolerance window on both ends.
    /// A changed line within `tolerance` lines of the declaration counts
    /// as touching it.
    pub fn overlaps_line(&self, line: u32, tolerance: u32) -> bool {
        let lo = self.line_start.saturating_sub(tolerance);
        let hi = self.line_end.saturating_add(tolerance);
        line >= lo && line <= hi
    }
}

/// Extract the top-level function/class outline of a module.
///
/// Never fails: unparseable source yields an empty outline.
pub fn outline(builder: &SnapshotBuilder, path: &Path, source: &str) -> Vec<Declaration> {
    let Some(tree) = builder.parse(path, source) else {
        return Vec::new();
    };
    let root = tree.root_node();
    let mut decls = Vec::new();

    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        // Declarations may sit directly at top level or inside an export
        let decl = if node.kind() == "export_statement" {
            match node.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            node
        };

        match decl.kind() {
            "function_declaration" | "generator_function_declaration" => {
                push_decl(&mut decls, decl, source, DeclKind::Function);
            }
            "class_declaration" | "abstract_class_declaration" => {
                push_decl(&mut decls, decl, source, DeclKind::Class);
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut inner = decl.walk();
                for declarator in decl.named_children(&mut inner) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let is_fn = declarator
                        .child_by_field_name("value")
                        .map(|v| matches!(v.kind(), "arrow_function" | "function_expression"))
                        .unwrap_or(false);
                    if is_fn {
                        push_decl(&mut decls, declarator, source, DeclKind::Function);
                    }
                }
            }
            _ => {}
        }
    }

    decls
}

fn push_decl(
    decls: &mut Vec<Declaration>,
    node: tree_sitter::Node<'_>,
    source: &str,
    kind: DeclKind,
) {
    let Some(name) = node
        .child_by_field_name("name")
        .map(|n| source[n.byte_range()].to_string())
    else {
        return;
    };
    decls.push(Declaration {
        name,
        kind,
        line_start: node.start_position().row as u32 + 1,
        line_end: node.end_position().row as u32 + 1,
    });
}
