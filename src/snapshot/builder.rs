//! Module snapshot construction from TypeScript/TSX source
//!
//! Parses one module and summarizes its exported surface: functions with
//! call signatures, classes with public members, interfaces/type aliases
//! with flattened member lists, enums, and plain values.
//!
//! The builder never fails: a missing file, non-UTF8 content, or a parse
//! failure yields a snapshot with an empty export list. Callers must treat
//! "no exports" as valid data, not a fault.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Node;

use super::types::{
    Access, ExportKind, ExportSnapshot, Member, MemberKind, ModuleSnapshot, Param, Signature, Span,
    SymbolKind, DEFAULT_EXPORT_NAME,
};

/// Return types that look like a UI element. Matching is textual and
/// deliberately loose — `component` is a heuristic refinement, not a
/// guarantee.
static COMPONENT_RETURN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"JSX\.Element|React\.ReactElement|ReactElement|ReactNode")
        .expect("hardcoded component return regex")
});

/// Files larger than this are not snapshotted (parse cost guard)
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Builds [`ModuleSnapshot`]s from TypeScript/TSX source.
///
/// Holds the two grammars; parsers are created per call so a builder can be
/// shared across concurrent analyses without locking.
pub struct SnapshotBuilder {
    ts: tree_sitter::Language,
    tsx: tree_sitter::Language,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            ts: tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            tsx: tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    fn grammar_for(&self, path: &Path) -> &tree_sitter::Language {
        match path.extension().and_then(|e| e.to_str()) {
            Some("tsx") | Some("jsx") => &self.tsx,
            _ => &self.ts,
        }
    }

    /// Parse a file's source text into a tree. `None` on grammar or parse
    /// failure (both are per-file conditions, logged and absorbed).
    pub fn parse(&self, path: &Path, source: &str) -> Option<tree_sitter::Tree> {
        let mut parser = tree_sitter::Parser::new();
        if let Err(e) = parser.set_language(self.grammar_for(path)) {
            tracing::warn!(error = %e, "Failed to load TypeScript grammar");
            return None;
        }
        parser.parse(source, None)
    }

    /// Snapshot a module from a file on disk. Missing or oversized files
    /// yield an empty snapshot.
    pub fn build_file(&self, path: &Path) -> ModuleSnapshot {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_FILE_SIZE => {
                tracing::warn!(
                    path = %path.display(),
                    size = meta.len(),
                    "Skipping oversized module"
                );
                return ModuleSnapshot::empty(path);
            }
            Ok(_) => {}
            Err(_) => return ModuleSnapshot::empty(path),
        }
        match std::fs::read_to_string(path) {
            Ok(source) => self.build(path, &source),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Unreadable module, empty snapshot");
                ModuleSnapshot::empty(path)
            }
        }
    }

    /// Snapshot a module from source text.
    pub fn build(&self, path: &Path, source: &str) -> ModuleSnapshot {
        let _span = tracing::info_span!("build_snapshot", path = %path.display()).entered();
        let tree = match self.parse(path, source) {
            Some(t) => t,
            None => return ModuleSnapshot::empty(path),
        };

        let root = tree.root_node();
        let decls = collect_declarations(root, source);

        let mut snapshot = ModuleSnapshot {
            file_path: path.to_path_buf(),
            exports: Vec::new(),
        };

        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            if node.kind() != "export_statement" {
                continue;
            }
            collect_exports_from_statement(node, source, &decls, &mut snapshot.exports);
        }

        snapshot
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Top-level declarations by name, in source order. Includes declarations
/// nested directly inside export statements so `export { foo }` clauses and
/// `export default foo` references can resolve them.
fn collect_declarations<'t>(root: Node<'t>, source: &str) -> HashMap<String, Vec<Node<'t>>> {
    let mut decls: HashMap<String, Vec<Node<'t>>> = HashMap::new();
    let mut cursor = root.walk();
    for node in root.named_children(&mut cursor) {
        let decl = if node.kind() == "export_statement" {
            match node.child_by_field_name("declaration") {
                Some(d) => d,
                None => continue,
            }
        } else {
            node
        };
        record_declaration(decl, source, &mut decls);
    }
    decls
}

fn record_declaration<'t>(decl: Node<'t>, source: &str, decls: &mut HashMap<String, Vec<Node<'t>>>) {
    match decl.kind() {
        "function_declaration"
        | "function_signature"
        | "generator_function_declaration"
        | "class_declaration"
        | "abstract_class_declaration"
        | "interface_declaration"
        | "type_alias_declaration"
        | "enum_declaration" => {
            if let Some(name) = decl
                .child_by_field_name("name")
                .map(|n| source[n.byte_range()].to_string())
            {
                decls.entry(name).or_default().push(decl);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            let mut cursor = decl.walk();
            for declarator in decl.named_children(&mut cursor) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                if let Some(name) = declarator
                    .child_by_field_name("name")
                    .filter(|n| n.kind() == "identifier")
                    .map(|n| source[n.byte_range()].to_string())
                {
                    decls.entry(name).or_default().push(declarator);
                }
            }
        }
        _ => {}
    }
}

fn collect_exports_from_statement(
    stmt: Node<'_>,
    source: &str,
    decls: &HashMap<String, Vec<Node<'_>>>,
    exports: &mut Vec<ExportSnapshot>,
) {
    let is_default = {
        let mut cursor = stmt.walk();
        let r = stmt.children(&mut cursor).any(|c| c.kind() == "default");
        r
    };

    // `export default <decl>` / `export <decl>`
    if let Some(decl) = stmt.child_by_field_name("declaration") {
        match decl.kind() {
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = decl.walk();
                for declarator in decl.named_children(&mut cursor) {
                    if declarator.kind() != "variable_declarator" {
                        continue;
                    }
                    let Some(name) = declarator
                        .child_by_field_name("name")
                        .map(|n| source[n.byte_range()].to_string())
                    else {
                        continue;
                    };
                    if let Some(snap) =
                        snapshot_declaration(&name, ExportKind::Named, declarator, source, decls)
                    {
                        push_export(exports, snap);
                    }
                }
            }
            _ => {
                let local_name = decl
                    .child_by_field_name("name")
                    .map(|n| source[n.byte_range()].to_string());
                let (export_name, kind) = if is_default {
                    (DEFAULT_EXPORT_NAME.to_string(), ExportKind::Default)
                } else {
                    match local_name {
                        Some(ref n) => (n.clone(), ExportKind::Named),
                        None => return,
                    }
                };
                if let Some(snap) = snapshot_declaration(&export_name, kind, decl, source, decls) {
                    push_export(exports, snap);
                }
            }
        }
        return;
    }

    // `export default <expr>`
    if let Some(value) = stmt.child_by_field_name("value") {
        let snap = match value.kind() {
            // `export default foo` — resolve the local declaration
            "identifier" => {
                let local = &source[value.byte_range()];
                match decls.get(local).and_then(|d| d.first()) {
                    Some(decl) => snapshot_declaration(
                        DEFAULT_EXPORT_NAME,
                        ExportKind::Default,
                        *decl,
                        source,
                        decls,
                    ),
                    None => Some(value_snapshot(DEFAULT_EXPORT_NAME, ExportKind::Default, value)),
                }
            }
            "arrow_function" | "function_expression" => Some(callable_snapshot(
                DEFAULT_EXPORT_NAME,
                ExportKind::Default,
                value,
                value,
                source,
            )),
            _ => Some(value_snapshot(DEFAULT_EXPORT_NAME, ExportKind::Default, value)),
        };
        if let Some(snap) = snap {
            push_export(exports, snap);
        }
        return;
    }

    // `export { a, b as c }` — with a `from` source this is a re-export whose
    // shape lives in another module; record it as an opaque value.
    let has_source = stmt.child_by_field_name("source").is_some();
    let mut cursor = stmt.walk();
    for clause in stmt.named_children(&mut cursor) {
        if clause.kind() != "export_clause" {
            continue;
        }
        let mut clause_cursor = clause.walk();
        for spec in clause.named_children(&mut clause_cursor) {
            if spec.kind() != "export_specifier" {
                continue;
            }
            let Some(local) = spec
                .child_by_field_name("name")
                .map(|n| source[n.byte_range()].to_string())
            else {
                continue;
            };
            let exported = spec
                .child_by_field_name("alias")
                .map(|n| source[n.byte_range()].to_string())
                .unwrap_or_else(|| local.clone());
            let (export_name, kind) = if exported == DEFAULT_EXPORT_NAME {
                (DEFAULT_EXPORT_NAME.to_string(), ExportKind::Default)
            } else {
                (exported, ExportKind::Named)
            };
            let snap = if has_source {
                Some(value_snapshot(&export_name, kind, spec))
            } else {
                match decls.get(&local).and_then(|d| d.first()) {
                    Some(decl) => snapshot_declaration(&export_name, kind, *decl, source, decls),
                    // Local name not resolvable — keep the export visible
                    None => Some(value_snapshot(&export_name, kind, spec)),
                }
            };
            if let Some(snap) = snap {
                push_export(exports, snap);
            }
        }
    }
}

/// Append an export, merging overload signatures when the same callable name
/// is exported more than once (`export function f(a: string): void;` ...).
fn push_export(exports: &mut Vec<ExportSnapshot>, snap: ExportSnapshot) {
    if let Some(existing) = exports.iter_mut().find(|e| e.export_name == snap.export_name) {
        if existing.symbol_kind.is_callable() && snap.symbol_kind.is_callable() {
            existing.signatures.extend(snap.signatures);
        }
        // First declaration stays canonical otherwise
        return;
    }
    exports.push(snap);
}

/// Snapshot one declaration node. Returns `None` only for shapes that cannot
/// be exports at all (zero-declaration symbols are skipped, not fatal).
fn snapshot_declaration(
    export_name: &str,
    export_kind: ExportKind,
    decl: Node<'_>,
    source: &str,
    decls: &HashMap<String, Vec<Node<'_>>>,
) -> Option<ExportSnapshot> {
    let span = span_of(decl);
    let snap = match decl.kind() {
        "function_declaration" | "function_signature" | "generator_function_declaration" => {
            callable_snapshot(export_name, export_kind, decl, decl, source)
        }
        "class_declaration" | "abstract_class_declaration" => ExportSnapshot {
            export_name: export_name.to_string(),
            export_kind,
            symbol_kind: SymbolKind::Class,
            span,
            signatures: Vec::new(),
            class_members: Some(class_members(decl, source)),
            type_members: None,
            type_text: None,
        },
        "interface_declaration" => ExportSnapshot {
            export_name: export_name.to_string(),
            export_kind,
            symbol_kind: SymbolKind::Type,
            span,
            signatures: Vec::new(),
            class_members: None,
            type_members: Some(interface_members(decl, source, decls, &mut HashSet::new())),
            type_text: None,
        },
        "type_alias_declaration" => {
            let value = decl.child_by_field_name("value");
            let type_text = value.map(|v| normalize_text(&source[v.byte_range()]));
            let type_members = value
                .filter(|v| v.kind() == "object_type")
                .map(|v| object_type_members(v, source));
            ExportSnapshot {
                export_name: export_name.to_string(),
                export_kind,
                symbol_kind: SymbolKind::Type,
                span,
                signatures: Vec::new(),
                class_members: None,
                type_members,
                type_text,
            }
        }
        "enum_declaration" => ExportSnapshot {
            export_name: export_name.to_string(),
            export_kind,
            symbol_kind: SymbolKind::Enum,
            span,
            signatures: Vec::new(),
            class_members: None,
            type_members: None,
            type_text: decl
                .child_by_field_name("body")
                .map(|b| normalize_text(&source[b.byte_range()])),
        },
        "variable_declarator" => {
            // A variable whose initializer is a function/arrow expression is
            // reclassified as a function
            match decl.child_by_field_name("value") {
                Some(value)
                    if matches!(value.kind(), "arrow_function" | "function_expression") =>
                {
                    callable_snapshot(export_name, export_kind, decl, value, source)
                }
                _ => ExportSnapshot {
                    export_name: export_name.to_string(),
                    export_kind,
                    symbol_kind: SymbolKind::Value,
                    span,
                    signatures: Vec::new(),
                    class_members: None,
                    type_members: None,
                    type_text: decl
                        .child_by_field_name("type")
                        .map(|t| annotation_text(t, source)),
                },
            }
        }
        _ => return None,
    };
    Some(snap)
}

/// Opaque export with no structural detail (re-exports, non-literal default
/// expressions, unresolvable locals)
fn value_snapshot(export_name: &str, export_kind: ExportKind, node: Node<'_>) -> ExportSnapshot {
    ExportSnapshot {
        export_name: export_name.to_string(),
        export_kind,
        symbol_kind: SymbolKind::Value,
        span: span_of(node),
        signatures: Vec::new(),
        class_members: None,
        type_members: None,
        type_text: None,
    }
}

/// Snapshot a callable: `span_node` is the declaration, `fn_node` carries the
/// parameters/return type (they differ for `const f = () => ...`).
fn callable_snapshot(
    export_name: &str,
    export_kind: ExportKind,
    span_node: Node<'_>,
    fn_node: Node<'_>,
    source: &str,
) -> ExportSnapshot {
    let sig = signature_of(fn_node, source);
    let symbol_kind = match &sig.return_type {
        Some(ret) if COMPONENT_RETURN_RE.is_match(ret) => SymbolKind::Component,
        _ => SymbolKind::Function,
    };
    ExportSnapshot {
        export_name: export_name.to_string(),
        export_kind,
        symbol_kind,
        span: span_of(span_node),
        signatures: vec![sig],
        class_members: None,
        type_members: None,
        type_text: None,
    }
}

fn signature_of(fn_node: Node<'_>, source: &str) -> Signature {
    let mut params = Vec::new();
    if let Some(formal) = fn_node.child_by_field_name("parameters") {
        let mut cursor = formal.walk();
        for p in formal.named_children(&mut cursor) {
            match p.kind() {
                "required_parameter" | "optional_parameter" => {
                    let optional = p.kind() == "optional_parameter";
                    let pattern = p.child_by_field_name("pattern");
                    let rest = pattern.map(|n| n.kind() == "rest_pattern").unwrap_or(false);
                    // Degenerate parameter without a pattern: fall back to the
                    // node's own text rather than failing
                    let name = pattern
                        .map(|n| source[n.byte_range()].trim_start_matches("...").to_string())
                        .unwrap_or_else(|| normalize_text(&source[p.byte_range()]));
                    let type_text = p
                        .child_by_field_name("type")
                        .map(|t| annotation_text(t, source));
                    params.push(Param {
                        name,
                        optional,
                        rest,
                        type_text,
                    });
                }
                // Bare JS-style identifier parameter
                "identifier" => params.push(Param {
                    name: source[p.byte_range()].to_string(),
                    optional: false,
                    rest: false,
                    type_text: None,
                }),
                _ => {}
            }
        }
    } else if let Some(single) = fn_node.child_by_field_name("parameter") {
        // `x => x + 1` arrow shorthand
        params.push(Param {
            name: source[single.byte_range()].to_string(),
            optional: false,
            rest: false,
            type_text: None,
        });
    }

    let return_type = fn_node
        .child_by_field_name("return_type")
        .map(|t| annotation_text(t, source));

    Signature {
        params,
        return_type,
    }
}

/// Public/protected members of a class body, in declaration order.
/// Private members (`private` modifier or `#name`) are excluded entirely —
/// the differ reads their disappearance as a removal, which is exactly how
/// privatization is detected.
fn class_members(class_node: Node<'_>, source: &str) -> Vec<Member> {
    let mut members = Vec::new();
    let Some(body) = class_node.child_by_field_name("body") else {
        return members;
    };
    let mut cursor = body.walk();
    for m in body.named_children(&mut cursor) {
        let member_kind = match m.kind() {
            "method_definition" | "method_signature" | "abstract_method_signature" => {
                MemberKind::Method
            }
            "public_field_definition" | "field_definition" | "property_signature" => {
                MemberKind::Property
            }
            _ => continue,
        };
        let Some(name_node) = m.child_by_field_name("name") else {
            continue;
        };
        if name_node.kind() == "private_property_identifier" {
            continue;
        }
        let name = source[name_node.byte_range()].to_string();
        if name == "constructor" {
            continue;
        }
        let access = match accessibility(m, source) {
            Some("private") => continue,
            Some("protected") => Access::Protected,
            _ => Access::Public,
        };
        let type_text = match member_kind {
            MemberKind::Method => Some(render_member_signature(m, source)),
            MemberKind::Property => m
                .child_by_field_name("type")
                .map(|t| annotation_text(t, source)),
        };
        members.push(Member {
            name,
            member_kind,
            optional: has_question_mark(m),
            type_text,
            access,
        });
    }
    members
}

/// Interface members with inherited members flattened in (same-module
/// `extends` chains only; `visited` guards cycles). Own members override
/// inherited ones by name.
fn interface_members(
    iface: Node<'_>,
    source: &str,
    decls: &HashMap<String, Vec<Node<'_>>>,
    visited: &mut HashSet<String>,
) -> Vec<Member> {
    let mut members: Vec<Member> = Vec::new();

    let mut cursor = iface.walk();
    for child in iface.named_children(&mut cursor) {
        if child.kind() != "extends_type_clause" {
            continue;
        }
        let mut ext_cursor = child.walk();
        for base in child.named_children(&mut ext_cursor) {
            if base.kind() != "type_identifier" {
                continue;
            }
            let base_name = source[base.byte_range()].to_string();
            if !visited.insert(base_name.clone()) {
                continue;
            }
            let base_decl = decls
                .get(&base_name)
                .and_then(|d| d.iter().find(|n| n.kind() == "interface_declaration"));
            if let Some(base_decl) = base_decl {
                for inherited in interface_members(*base_decl, source, decls, visited) {
                    if !members.iter().any(|m| m.name == inherited.name) {
                        members.push(inherited);
                    }
                }
            }
        }
    }

    if let Some(body) = iface.child_by_field_name("body") {
        for own in object_type_members(body, source) {
            if let Some(slot) = members.iter_mut().find(|m| m.name == own.name) {
                *slot = own;
            } else {
                members.push(own);
            }
        }
    }

    members
}

/// Members of an interface body / object type literal
fn object_type_members(body: Node<'_>, source: &str) -> Vec<Member> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for m in body.named_children(&mut cursor) {
        let member_kind = match m.kind() {
            "property_signature" => MemberKind::Property,
            "method_signature" => MemberKind::Method,
            _ => continue,
        };
        let Some(name_node) = m.child_by_field_name("name") else {
            continue;
        };
        let type_text = match member_kind {
            MemberKind::Method => Some(render_member_signature(m, source)),
            MemberKind::Property => m
                .child_by_field_name("type")
                .map(|t| annotation_text(t, source)),
        };
        members.push(Member {
            name: source[name_node.byte_range()].to_string(),
            member_kind,
            optional: has_question_mark(m),
            type_text,
            access: Access::Public,
        });
    }
    members
}

/// Render a method's first call signature as text: `(a: string, b?: number): void`
fn render_member_signature(method: Node<'_>, source: &str) -> String {
    let sig = signature_of(method, source);
    let params: Vec<String> = sig.params.iter().map(Param::render).collect();
    match sig.return_type {
        Some(ret) => format!("({}): {}", params.join(", "), ret),
        None => format!("({})", params.join(", ")),
    }
}

fn accessibility<'s>(member: Node<'_>, source: &'s str) -> Option<&'s str> {
    let mut cursor = member.walk();
    let r = member
        .children(&mut cursor)
        .find(|c| c.kind() == "accessibility_modifier")
        .map(|c| &source[c.byte_range()]);
    r
}

fn has_question_mark(node: Node<'_>) -> bool {
    let mut cursor = node.walk();
    let r = node.children(&mut cursor).any(|c| c.kind() == "?");
    r
}

/// Text of a `type_annotation` node without the leading `:`
fn annotation_text(annotation: Node<'_>, source: &str) -> String {
    let text = &source[annotation.byte_range()];
    normalize_text(text.trim_start_matches(':').trim())
}

/// Collapse whitespace runs so the rendered type text is stable across
/// formatting-only edits within a single annotation
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn span_of(node: Node<'_>) -> Span {
    Span {
        start: node.start_byte(),
        end: node.end_byte(),
    }
}

/// 1-based line number of a byte offset
pub fn line_of_offset(source: &str, offset: usize) -> u32 {
    let clamped = offset.min(source.len());
    source[..clamped].bytes().filter(|b| *b == b'\n').count() as u32 + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn build(source: &str) -> ModuleSnapshot {
        SnapshotBuilder::new().build(&PathBuf::from("src/mod.ts"), source)
    }

    #[test]
    fn test_named_function_export() {
        let snap = build("export function calculateDiscount(price: number): number { return price; }\n");
        assert_eq!(snap.exports.len(), 1);
        let exp = &snap.exports[0];
        assert_eq!(exp.export_name, "calculateDiscount");
        assert_eq!(exp.export_kind, ExportKind::Named);
        assert_eq!(exp.symbol_kind, SymbolKind::Function);
        let sig = &exp.signatures[0];
        assert_eq!(sig.params.len(), 1);
        assert_eq!(sig.params[0].name, "price");
        assert_eq!(sig.params[0].type_text.as_deref(), Some("number"));
        assert!(!sig.params[0].optional);
        assert_eq!(sig.return_type.as_deref(), Some("number"));
    }

    #[test]
    fn test_optional_and_rest_params() {
        let snap = build("export function f(a: string, b?: number, ...rest: string[]): void {}\n");
        let sig = &snap.exports[0].signatures[0];
        assert_eq!(sig.params.len(), 3);
        assert!(!sig.params[0].optional);
        assert!(sig.params[1].optional);
        assert!(sig.params[2].rest);
        assert_eq!(sig.params[2].name, "rest");
    }

    #[test]
    fn test_default_export_function() {
        let snap = build("export default function main(): void {}\n");
        assert_eq!(snap.exports.len(), 1);
        assert_eq!(snap.exports[0].export_name, "default");
        assert_eq!(snap.exports[0].export_kind, ExportKind::Default);
        assert!(snap.has_default());
    }

    #[test]
    fn test_default_export_identifier_resolves_declaration() {
        let snap = build("function helper(x: number): number { return x; }\nexport default helper;\n");
        assert_eq!(snap.exports.len(), 1);
        let exp = &snap.exports[0];
        assert_eq!(exp.export_name, "default");
        assert_eq!(exp.symbol_kind, SymbolKind::Function);
        assert_eq!(exp.signatures[0].params[0].name, "x");
    }

    #[test]
    fn test_arrow_function_const_reclassified() {
        let snap = build("export const add = (a: number, b: number): number => a + b;\n");
        let exp = &snap.exports[0];
        assert_eq!(exp.export_name, "add");
        assert_eq!(exp.symbol_kind, SymbolKind::Function);
        assert_eq!(exp.signatures[0].params.len(), 2);
    }

    #[test]
    fn test_plain_value_export() {
        let snap = build("export const LIMIT: number = 10;\n");
        let exp = &snap.exports[0];
        assert_eq!(exp.symbol_kind, SymbolKind::Value);
        assert_eq!(exp.type_text.as_deref(), Some("number"));
        assert!(exp.signatures.is_empty());
    }

    #[test]
    fn test_export_clause_with_alias() {
        let snap = build("function inner(): void {}\nexport { inner as outer };\n");
        assert_eq!(snap.exports.len(), 1);
        let exp = &snap.exports[0];
        assert_eq!(exp.export_name, "outer");
        assert_eq!(exp.symbol_kind, SymbolKind::Function);
    }

    #[test]
    fn test_class_members_exclude_private() {
        let snap = build(
            "export class Cart {\n  total: number = 0;\n  private secret: string = \"\";\n  protected audit(): void {}\n  #hidden(): void {}\n  checkout(code?: string): boolean { return true; }\n}\n",
        );
        let exp = &snap.exports[0];
        assert_eq!(exp.symbol_kind, SymbolKind::Class);
        let members = exp.class_members.as_ref().unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["total", "audit", "checkout"]);
        let audit = members.iter().find(|m| m.name == "audit").unwrap();
        assert_eq!(audit.access, Access::Protected);
        assert_eq!(audit.member_kind, MemberKind::Method);
        let total = members.iter().find(|m| m.name == "total").unwrap();
        assert_eq!(total.member_kind, MemberKind::Property);
        assert_eq!(total.type_text.as_deref(), Some("number"));
    }

    #[test]
    fn test_interface_members_and_optionality() {
        let snap = build(
            "export interface Props {\n  id: string;\n  label?: string;\n  onClick(e: Event): void;\n}\n",
        );
        let exp = &snap.exports[0];
        assert_eq!(exp.symbol_kind, SymbolKind::Type);
        let members = exp.type_members.as_ref().unwrap();
        assert_eq!(members.len(), 3);
        assert!(!members[0].optional);
        assert!(members[1].optional);
        assert_eq!(members[2].member_kind, MemberKind::Method);
    }

    #[test]
    fn test_interface_extends_flattens_inherited() {
        let snap = build(
            "interface Base { id: string; }\nexport interface Derived extends Base { name: string; }\n",
        );
        let exp = snap.get("Derived").unwrap();
        let members = exp.type_members.as_ref().unwrap();
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"id"), "inherited member flattened in: {names:?}");
        assert!(names.contains(&"name"));
    }

    #[test]
    fn test_type_alias_object_members() {
        let snap = build("export type Options = { retries: number; verbose?: boolean };\n");
        let exp = &snap.exports[0];
        assert_eq!(exp.symbol_kind, SymbolKind::Type);
        assert!(exp.type_text.is_some());
        let members = exp.type_members.as_ref().unwrap();
        assert_eq!(members.len(), 2);
        assert!(members[1].optional);
    }

    #[test]
    fn test_component_heuristic_on_return_type() {
        let snap = build("export function Button(props: ButtonProps): JSX.Element { return null as any; }\n");
        assert_eq!(snap.exports[0].symbol_kind, SymbolKind::Component);
    }

    #[test]
    fn test_overload_signatures_merged() {
        let snap = build(
            "export function parse(input: string): number;\nexport function parse(input: number): number;\nexport function parse(input: any): number { return 0; }\n",
        );
        assert_eq!(snap.exports.len(), 1);
        assert_eq!(snap.exports[0].signatures.len(), 3);
    }

    #[test]
    fn test_unparseable_source_yields_empty_snapshot() {
        // Tree-sitter recovers from almost anything; a snapshot of garbage
        // must simply contain no exports rather than error
        let snap = build("@@@ not typescript @@@");
        assert!(snap.exports.is_empty());
    }

    #[test]
    fn test_missing_file_yields_empty_snapshot() {
        let snap = SnapshotBuilder::new().build_file(Path::new("/does/not/exist.ts"));
        assert!(snap.exports.is_empty());
    }

    #[test]
    fn test_enum_export() {
        let snap = build("export enum Color { Red, Green }\n");
        assert_eq!(snap.exports[0].symbol_kind, SymbolKind::Enum);
        assert!(snap.exports[0].type_text.is_some());
    }

    #[test]
    fn test_line_of_offset() {
        let src = "a\nbb\nccc\n";
        assert_eq!(line_of_offset(src, 0), 1);
        assert_eq!(line_of_offset(src, 2), 2);
        assert_eq!(line_of_offset(src, 5), 3);
    }
}
