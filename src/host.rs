//! Host capability interface
//!
//! The analysis pipeline never talks to a concrete editor/workspace runtime;
//! it goes through this narrow trait so the whole pipeline can run against
//! an in-memory fake in tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use globset::Glob;
use ignore::WalkBuilder;

/// Files larger than this are not read through the host (parse cost guard)
const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Narrow host surface the core depends on
pub trait Host: Send + Sync {
    /// Workspace files matching a glob pattern (relative to the host root),
    /// in a stable order
    fn list_workspace_files(&self, pattern: &str) -> Vec<PathBuf>;
    /// File content, or `None` if the file is missing/unreadable — callers
    /// skip and continue, they never fail on a single unreadable file
    fn read_file(&self, path: &Path) -> Option<String>;
    /// Surface a message to the user (editor toast, console line)
    fn show_message(&self, text: &str);
}

/// Filesystem-backed host rooted at a workspace directory
pub struct FsHost {
    root: PathBuf,
    skip_dirs: Vec<String>,
    max_file_size: u64,
}

impl FsHost {
    pub fn new(root: impl Into<PathBuf>, skip_dirs: Vec<String>) -> Self {
        Self {
            root: root.into(),
            skip_dirs,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, size: u64) -> Self {
        self.max_file_size = size;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_skipped(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let name = c.as_os_str().to_string_lossy();
            self.skip_dirs.iter().any(|s| s == name.as_ref())
        })
    }
}

impl Host for FsHost {
    fn list_workspace_files(&self, pattern: &str) -> Vec<PathBuf> {
        let matcher = match Glob::new(pattern) {
            Ok(g) => g.compile_matcher(),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Invalid workspace glob");
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(true)
            .git_global(false)
            .git_exclude(true)
            .build();

        for entry in walker.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let rel = path.strip_prefix(&self.root).unwrap_or(path);
            if self.is_skipped(rel) {
                continue;
            }
            if matcher.is_match(rel) {
                files.push(path.to_path_buf());
            }
        }

        // Walk order is platform-dependent; sort for stable downstream order
        files.sort();
        files
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        match path.metadata() {
            Ok(meta) if meta.len() > self.max_file_size => {
                tracing::debug!(path = %path.display(), size = meta.len(), "Skipping large file");
                return None;
            }
            Ok(_) => {}
            Err(_) => return None,
        }
        match std::fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Skipping unreadable file");
                None
            }
        }
    }

    fn show_message(&self, text: &str) {
        tracing::info!(message = text, "host message");
    }
}

/// In-memory host for tests: a path -> content map plus captured messages
#[derive(Default)]
pub struct MemHost {
    files: BTreeMap<PathBuf, String>,
    messages: Mutex<Vec<String>>,
}

impl MemHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl Host for MemHost {
    fn list_workspace_files(&self, pattern: &str) -> Vec<PathBuf> {
        let matcher = match Glob::new(pattern) {
            Ok(g) => g.compile_matcher(),
            Err(_) => return Vec::new(),
        };
        self.files
            .keys()
            .filter(|p| matcher.is_match(p))
            .cloned()
            .collect()
    }

    fn read_file(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn show_message(&self, text: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(text.to_string());
        }
    }
}
