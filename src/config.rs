//! Configuration file support
//!
//! Project-level options live in `.tsblast.toml` at the workspace root.
//! CLI flags override config file values.

use std::path::Path;

use serde::Deserialize;

/// Options loaded from `.tsblast.toml`
///
/// # Example
///
/// ```toml
/// # .tsblast.toml
/// skip_dirs = ["generated", "vendor"]   # walked in addition to the built-in skip list
/// max_file_size = 10485760              # bytes; larger files are not analyzed
/// test_time_per_test_secs = 30          # per-test estimate for report totals
/// textual_fallback = true               # allow the text-containment fallback resolver
/// content_cache_capacity = 256          # entries in the content LRU
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Extra directory names to skip during workspace walks
    pub skip_dirs: Vec<String>,
    /// Maximum file size considered for analysis (bytes)
    pub max_file_size: u64,
    /// Per-test seconds used for `estimated_test_time`
    pub test_time_per_test_secs: u32,
    /// Whether the textual containment fallback is allowed when checker-based
    /// resolution fails
    pub textual_fallback: bool,
    /// Capacity of the process-wide content cache
    pub content_cache_capacity: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            skip_dirs: Vec::new(),
            max_file_size: 10 * 1024 * 1024,
            test_time_per_test_secs: 30,
            textual_fallback: true,
            content_cache_capacity: 256,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from the project root, falling back to defaults
    /// when no config file exists or it fails to parse
    pub fn load(project_root: &Path) -> Self {
        let path = project_root.join(".tsblast.toml");
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str::<Self>(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "Loaded project config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Invalid config file, using defaults");
                Self::default()
            }
        }
    }
}
