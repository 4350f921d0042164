//! Repository index: one walk per analysis call
//!
//! Classifies workspace files into source and test sets and locates the
//! project configuration (`tsconfig.json`) by walking upward from the
//! analyzed file.

use std::path::{Path, PathBuf};

use crate::host::Host;

/// Directories excluded from every walk
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".hg",
    ".svn",
    "dist",
    "build",
    "out",
    "coverage",
    ".next",
    "target",
];

/// Extensions classified as source
const SOURCE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx"];

/// Index of a repository's source and test files.
///
/// Built fresh per analysis call; test files are a subset of source files.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceIndex {
    pub root: PathBuf,
    pub source_files: Vec<PathBuf>,
    pub test_files: Vec<PathBuf>,
}

impl WorkspaceIndex {
    /// Walk the workspace through the host and classify what it finds
    pub fn scan(host: &dyn Host, root: &Path, skip_dirs: &[String]) -> Self {
        let _span = tracing::info_span!("workspace_scan", root = %root.display()).entered();

        let mut source_files = Vec::new();
        let mut test_files = Vec::new();

        for path in host.list_workspace_files("**/*.{ts,tsx,js,jsx}") {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            if is_skipped(rel, skip_dirs) {
                continue;
            }
            if !is_source_path(&path) {
                continue;
            }
            if is_test_path(&path) {
                test_files.push(path.clone());
            }
            source_files.push(path);
        }

        tracing::debug!(
            sources = source_files.len(),
            tests = test_files.len(),
            "Workspace indexed"
        );

        Self {
            root: root.to_path_buf(),
            source_files,
            test_files,
        }
    }

    /// Source files eligible for reference scanning: not tests, not
    /// declaration files, not the changed file itself
    pub fn scan_candidates<'a>(&'a self, changed_file: &'a Path) -> impl Iterator<Item = &'a PathBuf> {
        self.source_files.iter().filter(move |p| {
            p.as_path() != changed_file && !is_test_path(p) && !is_declaration_file(p)
        })
    }

    pub fn is_test_file(&self, path: &Path) -> bool {
        self.test_files.iter().any(|t| t == path)
    }
}

fn is_skipped(path: &Path, skip_dirs: &[String]) -> bool {
    path.components().any(|c| {
        let name = c.as_os_str().to_string_lossy();
        skip_dirs.iter().any(|s| s == name.as_ref())
            || DEFAULT_SKIP_DIRS.contains(&name.as_ref())
    })
}

/// Whether a path has a source extension
pub fn is_source_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

/// Test classification by filename pattern: `.test.` / `.spec.` infixes or a
/// `__tests__`-style ancestor directory
pub fn is_test_path(path: &Path) -> bool {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if file_name.contains(".test.") || file_name.contains(".spec.") {
        return true;
    }
    path.components().any(|c| {
        matches!(
            c.as_os_str().to_string_lossy().as_ref(),
            "__tests__" | "__test__" | "tests" | "test"
        )
    })
}

/// TypeScript declaration files carry no runtime references
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().ends_with(".d.ts"))
        .unwrap_or(false)
}

/// Find the nearest `tsconfig.json` walking upward from `start` (a file or
/// directory). Returns `None` when no project configuration exists — callers
/// degrade to an empty result, they do not error.
pub fn find_tsconfig(start: &Path) -> Option<PathBuf> {
    let mut dir = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };
    loop {
        let candidate = dir.join("tsconfig.json");
        if candidate.is_file() {
            return Some(candidate);
        }
        if !dir.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemHost;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_classifies_source_and_test() {
        let host = MemHost::new()
            .with_file("proj/src/cart.ts", "export const x = 1;")
            .with_file("proj/src/cart.test.ts", "import { x } from './cart';")
            .with_file("proj/__tests__/checkout.spec.tsx", "test stuff")
            .with_file("proj/readme.md", "docs");

        let index = WorkspaceIndex::scan(&host, Path::new("proj"), &[]);
        assert_eq!(index.source_files.len(), 3);
        assert_eq!(index.test_files.len(), 2);
    }

    #[test]
    fn test_scan_candidates_exclude_tests_decls_and_self() {
        let host = MemHost::new()
            .with_file("p/src/cart.ts", "")
            .with_file("p/src/api.ts", "")
            .with_file("p/src/api.d.ts", "")
            .with_file("p/src/cart.test.ts", "");

        let index = WorkspaceIndex::scan(&host, Path::new("p"), &[]);
        let candidates: Vec<_> = index
            .scan_candidates(Path::new("p/src/cart.ts"))
            .collect();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].ends_with("api.ts"));
    }

    #[test]
    fn test_skip_dirs_respected() {
        let host = MemHost::new()
            .with_file("p/node_modules/dep/index.ts", "")
            .with_file("p/dist/bundle.js", "")
            .with_file("p/generated/api.ts", "")
            .with_file("p/src/main.ts", "");

        let index =
            WorkspaceIndex::scan(&host, Path::new("p"), &["generated".to_string()]);
        assert_eq!(index.source_files.len(), 1);
        assert!(index.source_files[0].ends_with("src/main.ts"));
    }

    #[test]
    fn test_is_test_path_patterns() {
        assert!(is_test_path(Path::new("src/cart.test.ts")));
        assert!(is_test_path(Path::new("src/cart.spec.tsx")));
        assert!(is_test_path(Path::new("src/__tests__/cart.ts")));
        assert!(!is_test_path(Path::new("src/cart.ts")));
    }

    #[test]
    fn test_find_tsconfig_walks_upward() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/deep")).unwrap();
        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        fs::write(root.join("src/deep/mod.ts"), "").unwrap();

        let found = find_tsconfig(&root.join("src/deep/mod.ts")).unwrap();
        assert_eq!(found, root.join("tsconfig.json"));
    }

    #[test]
    fn test_find_tsconfig_nearest_wins() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("pkg/src")).unwrap();
        fs::write(root.join("tsconfig.json"), "{}").unwrap();
        fs::write(root.join("pkg/tsconfig.json"), "{}").unwrap();
        fs::write(root.join("pkg/src/a.ts"), "").unwrap();

        let found = find_tsconfig(&root.join("pkg/src/a.ts")).unwrap();
        assert_eq!(found, root.join("pkg/tsconfig.json"));
    }
}
