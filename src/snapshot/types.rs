//! Data types for module API snapshots

use std::path::PathBuf;

use serde::Serialize;

/// Byte span of a declaration in its source file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// How a symbol is exported from its module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    Named,
    Default,
}

/// Classification of an exported symbol by its declaration shape.
///
/// `Component` is a heuristic refinement of `Function`: a callable whose
/// return-type text looks like a UI element (see `builder::is_component_return`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Function,
    Class,
    Type,
    Enum,
    Value,
    Component,
}

impl SymbolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SymbolKind::Function => "function",
            SymbolKind::Class => "class",
            SymbolKind::Type => "type",
            SymbolKind::Enum => "enum",
            SymbolKind::Value => "value",
            SymbolKind::Component => "component",
        }
    }

    /// True for kinds that carry call signatures
    pub fn is_callable(&self) -> bool {
        matches!(self, SymbolKind::Function | SymbolKind::Component)
    }
}

impl std::fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a class/interface member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
}

impl std::fmt::Display for MemberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberKind::Method => f.write_str("method"),
            MemberKind::Property => f.write_str("property"),
        }
    }
}

/// Member visibility. Private members never appear in snapshots at all,
/// so there is no `Private` variant — a member going private shows up as
/// a removal when two snapshots are diffed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Public,
    Protected,
}

/// One parameter of a call signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Param {
    pub name: String,
    pub optional: bool,
    pub rest: bool,
    /// Rendered type annotation text, e.g. `string | number`
    pub type_text: Option<String>,
}

impl Param {
    /// Render as it would appear in a signature: `...rest: T[]`, `x?: T`, `x: T`
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.rest {
            out.push_str("...");
        }
        out.push_str(&self.name);
        if self.optional {
            out.push('?');
        }
        if let Some(ty) = &self.type_text {
            out.push_str(": ");
            out.push_str(ty);
        }
        out
    }
}

/// One call signature of a callable export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    pub params: Vec<Param>,
    pub return_type: Option<String>,
}

impl Signature {
    /// Render as `name(a: string, b?: number): void`
    pub fn render(&self, name: &str) -> String {
        let params: Vec<String> = self.params.iter().map(Param::render).collect();
        match &self.return_type {
            Some(ret) => format!("{}({}): {}", name, params.join(", "), ret),
            None => format!("{}({})", name, params.join(", ")),
        }
    }
}

/// A public or protected member of a class, interface, or object type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub member_kind: MemberKind,
    pub optional: bool,
    /// Declared type for properties, rendered first call signature for methods
    pub type_text: Option<String>,
    pub access: Access,
}

impl Member {
    /// Render as `name?: T` / `name(a: string): void`
    pub fn render(&self) -> String {
        let mut out = self.name.clone();
        if self.optional {
            out.push('?');
        }
        match self.member_kind {
            MemberKind::Method => {
                if let Some(sig) = &self.type_text {
                    out.push_str(sig);
                }
            }
            MemberKind::Property => {
                if let Some(ty) = &self.type_text {
                    out.push_str(": ");
                    out.push_str(ty);
                }
            }
        }
        out
    }
}

/// Name used for the default export in the export map.
///
/// `ExportKind` is the authoritative discriminator; the sentinel is only a
/// display/lookup convention, so a namespace member a user happens to call
/// `default` cannot collide (namespace members are never flattened into the
/// top-level export list).
pub const DEFAULT_EXPORT_NAME: &str = "default";

/// Structural summary of one exported symbol
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSnapshot {
    pub export_name: String,
    pub export_kind: ExportKind,
    pub symbol_kind: SymbolKind,
    pub span: Span,
    /// Ordered call signatures; empty for non-callables
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<Signature>,
    /// Public/protected class members, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_members: Option<Vec<Member>>,
    /// Interface / object-type members, inherited members flattened in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_members: Option<Vec<Member>>,
    /// Full textual rendering of a type alias target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_text: Option<String>,
}

impl ExportSnapshot {
    /// Human-readable one-line summary used in breaking-change records
    pub fn describe(&self) -> String {
        match self.symbol_kind {
            SymbolKind::Function | SymbolKind::Component => match self.signatures.first() {
                Some(sig) => format!("function {}", sig.render(&self.export_name)),
                None => format!("function {}", self.export_name),
            },
            SymbolKind::Class => format!("class {}", self.export_name),
            SymbolKind::Type => match &self.type_text {
                Some(ty) => format!("type {} = {}", self.export_name, ty),
                None => format!("interface {}", self.export_name),
            },
            SymbolKind::Enum => format!("enum {}", self.export_name),
            SymbolKind::Value => format!("const {}", self.export_name),
        }
    }
}

/// Structural summary of one module's exported API at one point in time.
///
/// Exports are kept in source order (the order the parser reports export
/// sites), which makes diff emission deterministic. Built fresh per analysis
/// call and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    pub file_path: PathBuf,
    pub exports: Vec<ExportSnapshot>,
}

impl ModuleSnapshot {
    /// Empty snapshot for a missing or unparseable module — valid data, not a fault
    pub fn empty(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            exports: Vec::new(),
        }
    }

    /// Look up an export by name (names are unique per module)
    pub fn get(&self, name: &str) -> Option<&ExportSnapshot> {
        self.exports.iter().find(|e| e.export_name == name)
    }

    /// Whether the module has a default export
    pub fn has_default(&self) -> bool {
        self.exports
            .iter()
            .any(|e| e.export_kind == ExportKind::Default)
    }
}
