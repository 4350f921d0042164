//! Structural API snapshots of TypeScript modules
//!
//! Split into submodules:
//! - `types` — snapshot data structures
//! - `builder` — tree-sitter based snapshot construction
//! - `outline` — top-level declaration outline for the line-based path

mod builder;
mod outline;
pub mod types;

pub use builder::{line_of_offset, SnapshotBuilder};
pub use outline::{outline, DeclKind, Declaration};
pub use types::{
    Access, ExportKind, ExportSnapshot, Member, MemberKind, ModuleSnapshot, Param, Signature, Span,
    SymbolKind, DEFAULT_EXPORT_NAME,
};
