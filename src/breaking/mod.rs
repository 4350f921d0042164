//! Breaking-change detection
//!
//! Split into submodules:
//! - `types` — change records and the fixed rule-ID taxonomy
//! - `diff` — the snapshot differ (rules 1-8)

mod diff;
mod types;

pub use diff::diff_snapshots;
pub use types::{BreakingChange, ChangeKind, RuleId, Severity, SourceLocation};
