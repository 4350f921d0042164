//! Test discovery for the line-based change path
//!
//! Layered strategy, applied in order with results unioned and
//! deduplicated:
//!   (a) same-directory test files whose base name relates to the source
//!   (b) test files under conventional test directories
//!   (c) test files whose content imports the source by relative path or
//!       base name
//!   (d) test files whose content mentions a changed function/class name
//!
//! A candidate only survives the final filter if it imports the source,
//! references a changed name, or satisfies the naming heuristic —
//! coincidental directory placement alone is never enough.

use std::path::{Path, PathBuf};

use crate::host::Host;
use crate::workspace::WorkspaceIndex;

/// Find test files affected by changes to `source_file`
pub fn affected_tests<'w>(
    source_file: &Path,
    changed_names: &[String],
    workspace: &'w WorkspaceIndex,
    host: &dyn Host,
) -> Vec<PathBuf> {
    let _span = tracing::info_span!(
        "affected_tests",
        source = %source_file.display(),
        changed = changed_names.len()
    )
    .entered();

    let stem = source_stem(source_file);
    let source_dir = source_file.parent();

    let mut candidates: Vec<&'w PathBuf> = Vec::new();
    let push_unique = |list: &mut Vec<&'w PathBuf>, path: &'w PathBuf| {
        if !list.contains(&path) {
            list.push(path);
        }
    };

    // (a) same-directory, related base name
    for test in &workspace.test_files {
        if test.parent() == source_dir && related_names(&stem, &test_stem(test)) {
            push_unique(&mut candidates, test);
        }
    }

    // (b) conventional test directories
    for test in &workspace.test_files {
        if under_test_dir(test) {
            push_unique(&mut candidates, test);
        }
    }

    // (c) + (d) need content; scan every remaining test file
    for test in &workspace.test_files {
        push_unique(&mut candidates, test);
    }

    candidates
        .into_iter()
        .filter(|test| {
            let naming = test.parent() == source_dir && related_names(&stem, &test_stem(test));
            if naming {
                return true;
            }
            let Some(content) = host.read_file(test) else {
                return false;
            };
            imports_source(&content, &stem) || mentions_changed_name(&content, changed_names)
        })
        .cloned()
        .collect()
}

/// Base name with test markers stripped, lowercased:
/// `cart.test` -> `cart`, `test_cart` -> `cart`
fn strip_test_markers(stem: &str) -> String {
    let lower = stem.to_ascii_lowercase();
    let lower = lower.strip_prefix("test_").unwrap_or(&lower);
    let lower = lower.strip_suffix("_test").unwrap_or(lower);
    let lower = lower.strip_suffix(".test").unwrap_or(lower);
    let lower = lower.strip_suffix(".spec").unwrap_or(lower);
    lower.to_string()
}

fn source_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default()
}

fn test_stem(path: &Path) -> String {
    strip_test_markers(&source_stem(path))
}

/// Case-insensitive substring relation in either direction
fn related_names(source_stem: &str, test_stem: &str) -> bool {
    if source_stem.is_empty() || test_stem.is_empty() {
        return false;
    }
    source_stem.contains(test_stem) || test_stem.contains(source_stem)
}

fn under_test_dir(path: &Path) -> bool {
    path.components().any(|c| {
        matches!(
            c.as_os_str().to_string_lossy().as_ref(),
            "__tests__" | "__test__" | "tests" | "test" | "spec"
        )
    })
}

fn imports_source(content: &str, stem: &str) -> bool {
    if stem.is_empty() {
        return false;
    }
    content.lines().any(|line| {
        (line.contains("import") || line.contains("require("))
            && line.to_ascii_lowercase().contains(stem)
    })
}

fn mentions_changed_name(content: &str, changed_names: &[String]) -> bool {
    changed_names.iter().any(|name| content.contains(name))
}
