//! Analysis orchestration
//!
//! Wires the pipeline together: snapshot both sides, diff, resolve each
//! change's blast radius, map tests, assemble the report. Every public
//! entrypoint has a documented failure value (empty sequence or empty
//! report) instead of an error — a single bad input must never take the
//! host down.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::breaking::{diff_snapshots, BreakingChange};
use crate::cache::{BaselineStore, CachingHost, ContentCache};
use crate::config::AnalyzerConfig;
use crate::diff_parse::{changed_lines, unified_diff};
use crate::host::{FsHost, Host};
use crate::report::{self, ImpactAnalysisResult};
use crate::resolve::{apply_annotation, ImpactAnnotation, ReferenceResolver};
use crate::snapshot::{outline, DeclKind, Declaration, ModuleSnapshot, SnapshotBuilder};
use crate::testmap;
use crate::workspace::{find_tsconfig, is_test_path, WorkspaceIndex};

/// Lines of tolerance when mapping a changed line onto a declaration range
const LINE_TOLERANCE: u32 = 2;

/// Internal errors absorbed at the public boundary
#[derive(Error, Debug)]
pub enum AnalyzeError {
    /// Scratch-side materialization failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Isolated scratch copies of the before/after module sides.
///
/// The `TempDir` guard removes the directory when this value drops — on the
/// success path and on every error path alike.
struct ScratchSides {
    _dir: tempfile::TempDir,
    before_path: PathBuf,
    after_path: PathBuf,
}

impl ScratchSides {
    fn materialize(file_name: &str, before: &str, after: &str) -> Result<Self, AnalyzeError> {
        let dir = tempfile::TempDir::new()?;
        let before_dir = dir.path().join("before");
        let after_dir = dir.path().join("after");
        std::fs::create_dir_all(&before_dir)?;
        std::fs::create_dir_all(&after_dir)?;
        let before_path = before_dir.join(file_name);
        let after_path = after_dir.join(file_name);
        std::fs::write(&before_path, before)?;
        std::fs::write(&after_path, after)?;
        Ok(Self {
            _dir: dir,
            before_path,
            after_path,
        })
    }
}

/// The analysis pipeline with its host, config, and process-wide caches.
pub struct Analyzer {
    builder: SnapshotBuilder,
    host: Arc<dyn Host>,
    config: AnalyzerConfig,
    content_cache: ContentCache,
    baselines: BaselineStore,
}

impl Analyzer {
    pub fn new(host: Arc<dyn Host>, config: AnalyzerConfig) -> Self {
        let content_cache = ContentCache::new(config.content_cache_capacity);
        Self {
            builder: SnapshotBuilder::new(),
            host,
            config,
            content_cache,
            baselines: BaselineStore::new(),
        }
    }

    /// Filesystem-backed analyzer for a workspace root, loading
    /// `.tsblast.toml` when present
    pub fn for_root(root: &Path) -> Self {
        let config = AnalyzerConfig::load(root);
        let host = FsHost::new(root, config.skip_dirs.clone())
            .with_max_file_size(config.max_file_size);
        Self::new(Arc::new(host), config)
    }

    pub fn baselines(&self) -> &BaselineStore {
        &self.baselines
    }

    /// Detect breaking changes between two versions of one module, with
    /// each change annotated with its blast radius.
    ///
    /// Degrades rather than fails: no discoverable project configuration,
    /// byte-identical content, or any internal error all yield an empty
    /// sequence.
    pub fn analyze_breaking_changes(
        &self,
        file_path: &Path,
        before: &str,
        after: &str,
        project_root: &Path,
        tsconfig_path: Option<&Path>,
    ) -> Vec<BreakingChange> {
        let _span = tracing::info_span!("analyze_breaking_changes", file = %file_path.display())
            .entered();
        match self.breaking_changes_inner(file_path, before, after, project_root, tsconfig_path) {
            Ok(changes) => changes,
            Err(e) => {
                tracing::warn!(file = %file_path.display(), error = %e, "Breaking-change analysis failed, returning empty");
                Vec::new()
            }
        }
    }

    fn breaking_changes_inner(
        &self,
        file_path: &Path,
        before: &str,
        after: &str,
        project_root: &Path,
        tsconfig_path: Option<&Path>,
    ) -> Result<Vec<BreakingChange>, AnalyzeError> {
        let tsconfig = tsconfig_path
            .map(Path::to_path_buf)
            .or_else(|| find_tsconfig(file_path))
            .or_else(|| find_tsconfig(project_root));
        if tsconfig.is_none() {
            tracing::debug!(file = %file_path.display(), "No tsconfig.json found, skipping structural analysis");
            return Ok(Vec::new());
        }

        if blake3::hash(before.as_bytes()) == blake3::hash(after.as_bytes()) {
            return Ok(Vec::new());
        }

        let (before_snap, after_snap) = self.snapshot_sides(file_path, before, after);
        let changes = diff_snapshots(&before_snap, &after_snap);
        if changes.is_empty() {
            return Ok(Vec::new());
        }

        let caching_host = CachingHost::new(self.host.as_ref(), &self.content_cache);
        let workspace = WorkspaceIndex::scan(&caching_host, project_root, &self.config.skip_dirs);
        let resolver =
            ReferenceResolver::new(&self.builder, &caching_host, &workspace, &self.config);

        Ok(changes
            .iter()
            .map(|change| {
                let annotation = resolver.resolve_change(change, &after_snap);
                apply_annotation(change, annotation)
            })
            .collect())
    }

    /// Build both snapshot sides through isolated scratch files. Falls back
    /// to in-memory parsing when the scratch directory cannot be set up —
    /// analysis quality is identical, only the isolation differs.
    fn snapshot_sides(
        &self,
        file_path: &Path,
        before: &str,
        after: &str,
    ) -> (ModuleSnapshot, ModuleSnapshot) {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "module.ts".to_string());

        match ScratchSides::materialize(&file_name, before, after) {
            Ok(scratch) => {
                let mut before_snap = self.builder.build_file(&scratch.before_path);
                let mut after_snap = self.builder.build_file(&scratch.after_path);
                // Re-key to the real module path so downstream resolution
                // works against the workspace
                before_snap.file_path = file_path.to_path_buf();
                after_snap.file_path = file_path.to_path_buf();
                (before_snap, after_snap)
                // scratch drops here; the temp directory is removed
            }
            Err(e) => {
                tracing::warn!(error = %e, "Scratch side setup failed, parsing in memory");
                (
                    self.builder.build(file_path, before),
                    self.builder.build(file_path, after),
                )
            }
        }
    }

    /// Full impact analysis for one edit: structural breaking changes plus
    /// the line-based changed-symbol path, merged into a single report.
    ///
    /// Never fails; a byte-identical pair short-circuits to the empty
    /// report with `has_actual_changes = false`, and any internal error
    /// produces the same empty report.
    pub fn analyze(
        &self,
        file_path: &Path,
        before: &str,
        after: &str,
        project_root: &Path,
        tsconfig_path: Option<&Path>,
    ) -> ImpactAnalysisResult {
        let _span = tracing::info_span!("analyze", file = %file_path.display()).entered();

        if blake3::hash(before.as_bytes()) == blake3::hash(after.as_bytes()) {
            return ImpactAnalysisResult::empty(file_path);
        }

        self.analyze_inner(file_path, before, after, project_root, tsconfig_path)
            .unwrap_or_else(|e| {
                tracing::warn!(file = %file_path.display(), error = %e, "Analysis failed, returning empty report");
                ImpactAnalysisResult::empty(file_path)
            })
    }

    fn analyze_inner(
        &self,
        file_path: &Path,
        before: &str,
        after: &str,
        project_root: &Path,
        tsconfig_path: Option<&Path>,
    ) -> Result<ImpactAnalysisResult, AnalyzeError> {
        let breaking =
            self.analyze_breaking_changes(file_path, before, after, project_root, tsconfig_path);

        // Line-based path: diff lines mapped onto declaration ranges
        let rel = file_path
            .strip_prefix(project_root)
            .unwrap_or(file_path)
            .to_string_lossy()
            .to_string();
        let diff_text = unified_diff(before, after, &rel);
        let touched = changed_lines(&diff_text);

        let before_outline = outline(&self.builder, file_path, before);
        let after_outline = outline(&self.builder, file_path, after);
        let (changed_functions, changed_classes) =
            changed_declarations(&before_outline, &after_outline, &touched);

        // Blast radius per changed symbol, structural or textual
        let caching_host = CachingHost::new(self.host.as_ref(), &self.content_cache);
        let workspace = WorkspaceIndex::scan(&caching_host, project_root, &self.config.skip_dirs);
        let resolver =
            ReferenceResolver::new(&self.builder, &caching_host, &workspace, &self.config);
        let after_snap = self.builder.build(file_path, after);

        let changed_names: Vec<String> = changed_functions
            .iter()
            .chain(changed_classes.iter())
            .cloned()
            .collect();
        let symbol_annotations: Vec<ImpactAnnotation> = changed_names
            .iter()
            .map(|name| resolver.resolve_symbol(name, &after_snap))
            .collect();

        let mut downstream: Vec<PathBuf> = Vec::new();
        let mut affected_tests: Vec<PathBuf> = Vec::new();
        for files in breaking
            .iter()
            .map(|c| &c.impacted_files)
            .chain(symbol_annotations.iter().map(|a| &a.impacted_files))
        {
            for file in files {
                if !is_test_path(file) && !downstream.contains(file) {
                    downstream.push(file.clone());
                }
            }
        }
        for tests in breaking
            .iter()
            .map(|c| &c.impacted_tests)
            .chain(symbol_annotations.iter().map(|a| &a.impacted_tests))
        {
            for test in tests {
                if !affected_tests.contains(test) {
                    affected_tests.push(test.clone());
                }
            }
        }
        for test in testmap::affected_tests(file_path, &changed_names, &workspace, &caching_host) {
            if !affected_tests.contains(&test) {
                affected_tests.push(test);
            }
        }

        Ok(report::assemble(
            file_path,
            changed_functions,
            changed_classes,
            affected_tests,
            downstream,
            breaking,
            self.config.test_time_per_test_secs,
        ))
    }

    /// Analyze the file on disk against its stored baseline. With no
    /// baseline recorded the current content is its own baseline (empty
    /// report), which establishes one for next time.
    pub fn analyze_against_baseline(
        &self,
        file_path: &Path,
        project_root: &Path,
    ) -> ImpactAnalysisResult {
        let Some(after) = self
            .content_cache
            .get_or_load(file_path, self.host.as_ref())
        else {
            return ImpactAnalysisResult::empty(file_path);
        };
        let before = self
            .baselines
            .get(file_path)
            .unwrap_or_else(|| after.to_string());
        let result = self.analyze(file_path, &before, &after, project_root, None);
        self.baselines.set(file_path, after.to_string());
        result
    }

    /// Replace the stored baseline for a file with its current content
    /// (called on save by host integrations)
    pub fn update_baseline(&self, file_path: &Path) {
        self.content_cache.invalidate(file_path);
        if let Some(content) = self.host.read_file(file_path) {
            self.baselines.set(file_path, content);
        } else {
            self.baselines.invalidate(file_path);
        }
    }
}

/// Map touched lines onto declarations. A declaration counts as changed if
/// a touched line falls within its range (± tolerance), or if it existed
/// before and its name is gone from the after outline (the removal path).
fn changed_declarations(
    before_outline: &[Declaration],
    after_outline: &[Declaration],
    touched: &[u32],
) -> (Vec<String>, Vec<String>) {
    let mut functions: Vec<String> = Vec::new();
    let mut classes: Vec<String> = Vec::new();
    let push = |decl: &Declaration, functions: &mut Vec<String>, classes: &mut Vec<String>| {
        let bucket = match decl.kind {
            DeclKind::Function => functions,
            DeclKind::Class => classes,
        };
        if !bucket.contains(&decl.name) {
            bucket.push(decl.name.clone());
        }
    };

    for decl in after_outline {
        if touched
            .iter()
            .any(|line| decl.overlaps_line(*line, LINE_TOLERANCE))
        {
            push(decl, &mut functions, &mut classes);
        }
    }
    for decl in before_outline {
        if !after_outline.iter().any(|a| a.name == decl.name) {
            push(decl, &mut functions, &mut classes);
        }
    }

    (functions, classes)
}

/// Convenience entrypoint mirroring the host-facing API: builds a
/// filesystem analyzer for the project root and runs one breaking-change
/// analysis.
pub fn analyze_breaking_changes(
    file_path: &Path,
    before: &str,
    after: &str,
    project_root: &Path,
    tsconfig_path: Option<&Path>,
) -> Vec<BreakingChange> {
    Analyzer::for_root(project_root).analyze_breaking_changes(
        file_path,
        before,
        after,
        project_root,
        tsconfig_path,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemHost;

    fn mem_analyzer(host: MemHost) -> Analyzer {
        Analyzer::new(Arc::new(host), AnalyzerConfig::default())
    }

    #[test]
    fn test_identical_content_short_circuits() {
        let analyzer = mem_analyzer(MemHost::new());
        let content = "export function f(): void {}\n";
        let report = analyzer.analyze(
            Path::new("proj/src/a.ts"),
            content,
            content,
            Path::new("proj"),
            None,
        );
        assert!(!report.has_actual_changes);
        assert!(report.breaking_changes.is_empty());
        assert!(report.changed_functions.is_empty());
    }

    #[test]
    fn test_no_tsconfig_degrades_to_empty_changes() {
        // MemHost worlds have no tsconfig on disk: structural path degrades,
        // line-based path still works
        let analyzer = mem_analyzer(MemHost::new());
        let changes = analyzer.analyze_breaking_changes(
            Path::new("/memproj/src/a.ts"),
            "export function f(): void {}\n",
            "export function g(): void {}\n",
            Path::new("/memproj"),
            None,
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_changed_declarations_overlap_and_removal() {
        let before = vec![
            Declaration {
                name: "gone".to_string(),
                kind: DeclKind::Function,
                line_start: 1,
                line_end: 3,
            },
            Declaration {
                name: "kept".to_string(),
                kind: DeclKind::Function,
                line_start: 5,
                line_end: 9,
            },
        ];
        let after = vec![Declaration {
            name: "kept".to_string(),
            kind: DeclKind::Function,
            line_start: 1,
            line_end: 5,
        }];
        let (functions, classes) = changed_declarations(&before, &after, &[3]);
        assert!(functions.contains(&"kept".to_string()), "touched line overlap");
        assert!(functions.contains(&"gone".to_string()), "removal path");
        assert!(classes.is_empty());
    }

    #[test]
    fn test_changed_declarations_tolerance_window() {
        let after = vec![Declaration {
            name: "f".to_string(),
            kind: DeclKind::Function,
            line_start: 10,
            line_end: 12,
        }];
        let (functions, _) = changed_declarations(&[], &after, &[14]);
        assert_eq!(functions, vec!["f".to_string()], "within the ±2 window");
        let (functions, _) = changed_declarations(&[], &after, &[15]);
        assert!(functions.is_empty(), "outside the window");
    }

    #[test]
    fn test_baseline_roundtrip() {
        let host = MemHost::new().with_file("proj/src/a.ts", "export const x = 1;\n");
        let analyzer = mem_analyzer(host);
        // First run: no baseline, current content compared to itself
        let report = analyzer.analyze_against_baseline(Path::new("proj/src/a.ts"), Path::new("proj"));
        assert!(!report.has_actual_changes);
        // Baseline is now recorded
        assert!(analyzer.baselines().get(Path::new("proj/src/a.ts")).is_some());
    }
}
