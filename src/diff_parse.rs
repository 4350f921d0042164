//! Unified diff parsing: changed-line extraction
//!
//! Parses `git diff` style unified diffs into the set of 1-based line
//! numbers touched on the *after* side of each file. These line numbers
//! feed the line-based change path, which maps them onto declaration
//! ranges with a tolerance window (see `snapshot::Declaration`).

use std::sync::LazyLock;

use regex::Regex;

/// Compiled once, reused across all calls
static HUNK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@@ [^@]* \+(\d+)(?:,(\d+))? @@").expect("hardcoded hunk regex"));

/// A single hunk from a unified diff — one changed region in one file
#[derive(Debug, Clone)]
pub struct DiffHunk {
    /// Relative file path (from `+++ b/...`)
    pub file: String,
    /// Start line in the new version (1-based)
    pub start: u32,
    /// Number of lines in the new version (half-open: covers `start..start+count`)
    pub count: u32,
}

/// Parse unified diff output into hunks.
///
/// Handles standard `git diff` output:
/// - Extracts file path from `+++ b/...`
/// - Extracts line ranges from `@@ ... +start,count @@`
/// - Skips binary files and deleted files (`+++ /dev/null`)
/// - Defaults count to 1 when omitted (`@@ +start @@`)
pub fn parse_unified_diff(input: &str) -> Vec<DiffHunk> {
    if input.is_empty() {
        return Vec::new();
    }

    let input = normalize_line_endings(input);

    let mut hunks = Vec::new();
    let mut current_file: Option<String> = None;

    for line in input.lines() {
        if let Some(path) = line.strip_prefix("+++ ") {
            current_file = new_side_path(path);
            continue;
        }
        if line.starts_with("Binary files ") {
            current_file = None;
            continue;
        }
        if let Some(file) = &current_file {
            if let Some(caps) = HUNK_RE.captures(line) {
                let start: u32 = match caps[1].parse() {
                    Ok(v) => v,
                    Err(_) => {
                        tracing::warn!(
                            line = line,
                            file = file.as_str(),
                            "Could not parse hunk start line number, defaulting to 1"
                        );
                        1
                    }
                };
                let count: u32 = caps
                    .get(2)
                    .and_then(|m| m.as_str().parse().ok())
                    .unwrap_or(1);
                hunks.push(DiffHunk {
                    file: file.clone(),
                    start,
                    count,
                });
            }
        }
    }

    hunks
}

/// Extract the after-side line numbers touched by a unified diff.
///
/// Returns a sorted, deduplicated sequence of positive 1-based line numbers:
/// each `+` line contributes its own position, each `-` line contributes the
/// after-side position where the removal happened (the deletion point),
/// context lines contribute nothing.
pub fn changed_lines(input: &str) -> Vec<u32> {
    if input.is_empty() {
        return Vec::new();
    }

    let input = normalize_line_endings(input);

    let mut lines: Vec<u32> = Vec::new();
    let mut in_hunk = false;
    let mut new_line: u32 = 0;

    for line in input.lines() {
        if line.starts_with("diff --git")
            || line.starts_with("index ")
            || line.starts_with("--- ")
            || line.starts_with("+++ ")
        {
            in_hunk = false;
            continue;
        }
        if let Some(caps) = HUNK_RE.captures(line) {
            new_line = caps[1].parse().unwrap_or(1);
            in_hunk = true;
            continue;
        }
        if !in_hunk {
            continue;
        }
        match line.as_bytes().first() {
            Some(b'+') => {
                lines.push(new_line.max(1));
                new_line = new_line.saturating_add(1);
            }
            Some(b'-') => {
                // A deletion touches the after file at the deletion point
                lines.push(new_line.max(1));
            }
            Some(b' ') => {
                new_line = new_line.saturating_add(1);
            }
            // `\ No newline at end of file` and blank separators
            _ => {}
        }
    }

    lines.sort_unstable();
    lines.dedup();
    lines
}

/// Render a unified diff between two raw contents (for callers that hold
/// before/after text rather than `git diff` output)
pub fn unified_diff(before: &str, after: &str, path: &str) -> String {
    similar::TextDiff::from_lines(before, after)
        .unified_diff()
        .header(&format!("a/{path}"), &format!("b/{path}"))
        .to_string()
}

fn normalize_line_endings(input: &str) -> std::borrow::Cow<'_, str> {
    // CRLF from Windows git output (bare \r from classic Mac too)
    if input.contains('\r') {
        std::borrow::Cow::Owned(input.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        std::borrow::Cow::Borrowed(input)
    }
}

fn new_side_path(path: &str) -> Option<String> {
    if path == "/dev/null" {
        // Deleted file — no new-side lines
        None
    } else if let Some(rel) = path.strip_prefix("b/") {
        Some(rel.to_string())
    } else {
        // Non-standard format, use as-is
        Some(path.to_string())
    }
}
