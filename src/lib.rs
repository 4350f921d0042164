//! # tsblast - Breaking-change and blast-radius analysis
//!
//! Estimates the blast radius of a TypeScript source edit: which exported
//! symbols changed, whether the change is API-breaking, which files in the
//! workspace actually depend on the changed symbols, and which test files
//! are likely affected.
//!
//! ## Pipeline
//!
//! - **Snapshots**: structural summaries of a module's exported surface,
//!   built with tree-sitter (functions with call signatures, classes with
//!   public members, interfaces/type aliases, enums, values)
//! - **Differ**: a fixed, ordered rule set classifying breaking changes
//!   with stable rule IDs (`TSAPI-EXP-001`, ...)
//! - **Resolver**: import-then-use reference finding across the workspace
//!   (name collision is never enough), with a textual fallback that trades
//!   precision for availability
//! - **Test mapper**: structural reference data plus content heuristics
//! - **Report**: risk level, confidence, and test-time estimates per edit
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! let before = "export function f(a: string): void {}";
//! let after = "export function f(a: string, b: number): void {}";
//!
//! let changes = tsblast::analyze_breaking_changes(
//!     Path::new("src/util.ts"),
//!     before,
//!     after,
//!     Path::new("."),
//!     None,
//! );
//! for change in &changes {
//!     println!("{} {}: {}", change.rule_id, change.symbol_name, change.before);
//! }
//! ```

pub mod analyzer;
pub mod breaking;
pub mod cache;
pub mod config;
pub mod diff_parse;
pub mod host;
pub mod report;
pub mod resolve;
pub mod snapshot;
pub mod testmap;
pub mod workspace;

pub use analyzer::{analyze_breaking_changes, Analyzer};
pub use breaking::{diff_snapshots, BreakingChange, ChangeKind, RuleId, Severity};
pub use config::AnalyzerConfig;
pub use host::{FsHost, Host, MemHost};
pub use report::{ImpactAnalysisResult, RiskLevel};
pub use resolve::{AnalysisOrigin, ImpactAnnotation, ReferenceResolver};
pub use snapshot::{ModuleSnapshot, SnapshotBuilder};
