//! Property tests for parser-facing invariants

use std::path::Path;

use proptest::prelude::*;
use tsblast::diff_parse::changed_lines;
use tsblast::{diff_snapshots, SnapshotBuilder};

proptest! {
    /// changed_lines output is always sorted, deduplicated, and positive,
    /// no matter how malformed the input diff is
    #[test]
    fn changed_lines_sorted_dedup_positive(input in ".{0,400}") {
        let lines = changed_lines(&input);
        let mut normalized = lines.clone();
        normalized.sort_unstable();
        normalized.dedup();
        prop_assert_eq!(&lines, &normalized);
        prop_assert!(lines.iter().all(|l| *l >= 1));
    }

    /// Diffing a module snapshot against itself never yields changes
    #[test]
    fn self_diff_is_empty(
        name in "[a-z][a-zA-Z0-9]{0,8}",
        param in "[a-z][a-zA-Z0-9]{0,8}",
        optional in any::<bool>(),
    ) {
        let marker = if optional { "?" } else { "" };
        let source = format!(
            "export function {name}({param}{marker}: string): void {{}}\n"
        );
        let builder = SnapshotBuilder::new();
        let snap = builder.build(Path::new("src/mod.ts"), &source);
        prop_assert!(diff_snapshots(&snap, &snap).is_empty());
    }

    /// A module gaining exports (supersets) emits no changes for the new names
    #[test]
    fn added_exports_never_breaking(
        base in "[a-z][a-zA-Z0-9]{0,6}",
        extra in "[A-Z][a-zA-Z0-9]{0,6}",
    ) {
        prop_assume!(base.to_ascii_lowercase() != extra.to_ascii_lowercase());
        let before_src = format!("export function {base}(x: number): void {{}}\n");
        let after_src = format!(
            "export function {base}(x: number): void {{}}\nexport function {extra}(y: string): void {{}}\n"
        );
        let builder = SnapshotBuilder::new();
        let before = builder.build(Path::new("src/mod.ts"), &before_src);
        let after = builder.build(Path::new("src/mod.ts"), &after_src);
        prop_assert!(diff_snapshots(&before, &after).is_empty());
    }
}
