//! Import statement extraction and module-specifier resolution
//!
//! A file is only a reference candidate if one of its imports actually
//! resolves to the changed module — name collision alone is never enough.
//! Resolution handles relative specifiers with the usual extension and
//! `index.*` candidates; bare package specifiers are out of scope.

use std::ops::Range;
use std::path::{Component, Path, PathBuf};

use tree_sitter::Node;

/// Extensions tried when a specifier omits one
const RESOLVE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// How one binding was imported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingKind {
    /// `import { name } from ...` / `import { name as local } from ...`
    Named { imported: String },
    /// `import local from ...`
    Default,
    /// `import * as ns from ...` — conservative "might use anything"
    Namespace,
}

/// One local binding introduced by an import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    pub local: String,
    pub kind: BindingKind,
}

/// One parsed import statement
#[derive(Debug, Clone)]
pub struct ImportStatement {
    pub specifier: String,
    pub bindings: Vec<ImportBinding>,
    /// Byte range of the whole statement — usage walks exclude it so the
    /// binding's own occurrence is not counted as a usage
    pub byte_range: Range<usize>,
}

/// Extract all import statements from a parsed module
pub fn parse_imports(root: Node<'_>, source: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        if node.kind() != "import_statement" {
            continue;
        }
        let Some(specifier) = node
            .child_by_field_name("source")
            .map(|s| string_literal_text(s, source))
        else {
            continue;
        };
        let mut bindings = Vec::new();
        let mut stmt_cursor = node.walk();
        for child in node.named_children(&mut stmt_cursor) {
            if child.kind() == "import_clause" {
                collect_clause_bindings(child, source, &mut bindings);
            }
        }
        imports.push(ImportStatement {
            specifier,
            bindings,
            byte_range: node.byte_range(),
        });
    }
    imports
}

fn collect_clause_bindings(clause: Node<'_>, source: &str, bindings: &mut Vec<ImportBinding>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            // `import local from ...`
            "identifier" => bindings.push(ImportBinding {
                local: source[child.byte_range()].to_string(),
                kind: BindingKind::Default,
            }),
            // `import * as ns from ...`
            "namespace_import" => {
                let mut ns_cursor = child.walk();
                let ident = child
                    .named_children(&mut ns_cursor)
                    .find(|c| c.kind() == "identifier");
                if let Some(ident) = ident {
                    bindings.push(ImportBinding {
                        local: source[ident.byte_range()].to_string(),
                        kind: BindingKind::Namespace,
                    });
                }
            }
            // `import { a, b as c } from ...`
            "named_imports" => {
                let mut named_cursor = child.walk();
                for spec in child.named_children(&mut named_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let Some(imported) = spec
                        .child_by_field_name("name")
                        .map(|n| source[n.byte_range()].to_string())
                    else {
                        continue;
                    };
                    let local = spec
                        .child_by_field_name("alias")
                        .map(|n| source[n.byte_range()].to_string())
                        .unwrap_or_else(|| imported.clone());
                    bindings.push(ImportBinding {
                        local,
                        kind: BindingKind::Named { imported },
                    });
                }
            }
            _ => {}
        }
    }
}

fn string_literal_text(node: Node<'_>, source: &str) -> String {
    source[node.byte_range()]
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .to_string()
}

/// Whether a relative specifier in `importing_file` resolves to
/// `changed_file`, trying the specifier as-is, with known extensions, and
/// as a directory `index.*`.
pub fn specifier_resolves_to(importing_file: &Path, specifier: &str, changed_file: &Path) -> bool {
    if !specifier.starts_with("./") && !specifier.starts_with("../") {
        return false;
    }
    let Some(dir) = importing_file.parent() else {
        return false;
    };
    let base = normalize(&dir.join(specifier));
    let changed = normalize(dunce::simplified(changed_file));

    if base == changed {
        return true;
    }
    for ext in RESOLVE_EXTENSIONS {
        if with_appended_extension(&base, ext) == changed {
            return true;
        }
        if base.join(format!("index.{ext}")) == changed {
            return true;
        }
    }
    false
}

/// `foo` + `ts` -> `foo.ts` (`Path::set_extension` would clobber `foo.test`)
fn with_appended_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

/// Resolve `.` / `..` components without touching the filesystem, so the
/// same logic works against in-memory hosts
fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::SnapshotBuilder;

    fn imports_of(source: &str) -> Vec<ImportStatement> {
        let builder = SnapshotBuilder::new();
        let tree = builder.parse(Path::new("m.ts"), source).unwrap();
        parse_imports(tree.root_node(), source)
    }

    #[test]
    fn test_named_imports_with_alias() {
        let imports = imports_of("import { calculateDiscount, Cart as Basket } from './cart';\n");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].specifier, "./cart");
        assert_eq!(imports[0].bindings.len(), 2);
        assert_eq!(
            imports[0].bindings[0].kind,
            BindingKind::Named {
                imported: "calculateDiscount".to_string()
            }
        );
        assert_eq!(imports[0].bindings[1].local, "Basket");
        assert_eq!(
            imports[0].bindings[1].kind,
            BindingKind::Named {
                imported: "Cart".to_string()
            }
        );
    }

    #[test]
    fn test_default_and_namespace_imports() {
        let imports = imports_of(
            "import main from './main';\nimport * as util from '../util';\n",
        );
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].bindings[0].kind, BindingKind::Default);
        assert_eq!(imports[0].bindings[0].local, "main");
        assert_eq!(imports[1].bindings[0].kind, BindingKind::Namespace);
        assert_eq!(imports[1].bindings[0].local, "util");
    }

    #[test]
    fn test_type_only_import_still_parsed() {
        let imports = imports_of("import type { Props } from './props';\n");
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].bindings.len(), 1);
        assert_eq!(imports[0].bindings[0].local, "Props");
    }

    #[test]
    fn test_specifier_resolution_extension_candidates() {
        let importing = Path::new("proj/src/checkout.ts");
        let changed = Path::new("proj/src/cart.ts");
        assert!(specifier_resolves_to(importing, "./cart", changed));
        assert!(specifier_resolves_to(importing, "./cart.ts", changed));
        assert!(!specifier_resolves_to(importing, "./other", changed));
    }

    #[test]
    fn test_specifier_resolution_parent_and_index() {
        let importing = Path::new("proj/src/pages/home.tsx");
        assert!(specifier_resolves_to(
            importing,
            "../cart",
            Path::new("proj/src/cart.tsx")
        ));
        assert!(specifier_resolves_to(
            importing,
            "../cart",
            Path::new("proj/src/cart/index.ts")
        ));
    }

    #[test]
    fn test_bare_specifier_never_resolves() {
        assert!(!specifier_resolves_to(
            Path::new("proj/src/a.ts"),
            "react",
            Path::new("proj/node_modules/react/index.js")
        ));
    }

    #[test]
    fn test_normalize_components() {
        assert_eq!(
            normalize(Path::new("a/b/../c/./d")),
            PathBuf::from("a/c/d")
        );
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }
}
