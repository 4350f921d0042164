//! Reference resolution: from a breaking change to its blast radius
//!
//! Split into submodules:
//! - `imports` — import extraction and module-specifier resolution
//!
//! Resolution is two-phase: the differ's change records stay immutable, the
//! resolver produces a parallel [`ImpactAnnotation`] per change, and
//! [`apply_annotation`] merges them into final records. The primary path is
//! parser-verified (import-then-use chains, exact usage positions); when the
//! changed symbol cannot be re-located in the after-module the textual
//! containment fallback takes over — less precise, but it never fails.

mod imports;

pub use imports::{parse_imports, specifier_resolves_to, BindingKind, ImportBinding, ImportStatement};

use std::path::{Path, PathBuf};

use aho_corasick::AhoCorasick;
use rayon::prelude::*;
use serde::Serialize;

use crate::breaking::{BreakingChange, SourceLocation};
use crate::config::AnalyzerConfig;
use crate::host::Host;
use crate::snapshot::{ExportKind, ModuleSnapshot, SnapshotBuilder};
use crate::workspace::WorkspaceIndex;

/// Whether a finding came from the parser-verified path or from
/// pattern-matched text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisOrigin {
    Structural,
    Heuristic,
}

/// Impact data for one change, produced separately from the change record
/// and merged in functionally
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnnotation {
    pub impacted_files: Vec<PathBuf>,
    pub impacted_file_locations: Vec<SourceLocation>,
    pub impacted_tests: Vec<PathBuf>,
    pub origin: AnalysisOrigin,
}

impl ImpactAnnotation {
    fn empty(origin: AnalysisOrigin) -> Self {
        Self {
            impacted_files: Vec::new(),
            impacted_file_locations: Vec::new(),
            impacted_tests: Vec::new(),
            origin,
        }
    }
}

/// Merge an annotation into a change, producing the final record
pub fn apply_annotation(change: &BreakingChange, annotation: ImpactAnnotation) -> BreakingChange {
    let mut merged = change.clone();
    merged.impacted_files = annotation.impacted_files;
    merged.impacted_file_locations = annotation.impacted_file_locations;
    merged.impacted_tests = annotation.impacted_tests;
    merged
}

/// What the resolver searches for once a change's symbol has been re-located
struct ResolveTarget {
    /// Export name candidates must import
    export_name: String,
    export_kind: ExportKind,
    /// When set, usages are property accesses of this member rather than
    /// identifier references of the export itself
    member_name: Option<String>,
}

/// Resolves breaking changes (or plain changed symbols) to impacted files,
/// usage locations, and impacted tests.
pub struct ReferenceResolver<'a> {
    builder: &'a SnapshotBuilder,
    host: &'a dyn Host,
    workspace: &'a WorkspaceIndex,
    config: &'a AnalyzerConfig,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(
        builder: &'a SnapshotBuilder,
        host: &'a dyn Host,
        workspace: &'a WorkspaceIndex,
        config: &'a AnalyzerConfig,
    ) -> Self {
        Self {
            builder,
            host,
            workspace,
            config,
        }
    }

    /// Resolve one breaking change against the after-module snapshot.
    pub fn resolve_change(
        &self,
        change: &BreakingChange,
        after: &ModuleSnapshot,
    ) -> ImpactAnnotation {
        let _span = tracing::info_span!(
            "resolve_change",
            symbol = %change.symbol_name,
            rule = change.rule_id.as_str()
        )
        .entered();

        let changed_file = after.file_path.clone();
        let target = relocate(change, after);

        let mut annotation = match target {
            Some(target) => self.scan_structural(&target, &changed_file),
            // Symbol no longer re-locatable (removed export, privatized
            // member) — textual containment keeps availability
            None => self.scan_textual(&change.symbol_name, &changed_file),
        };

        annotation.impacted_tests =
            self.impacted_tests(&change.symbol_name, &changed_file, &annotation.impacted_files);
        annotation
    }

    /// Resolve a plain symbol name from the line-based path (no breaking
    /// change record). Structural when the symbol is an export of the
    /// after-module, textual otherwise.
    pub fn resolve_symbol(&self, symbol: &str, after: &ModuleSnapshot) -> ImpactAnnotation {
        let changed_file = after.file_path.clone();
        let mut annotation = match after.get(symbol) {
            Some(export) => self.scan_structural(
                &ResolveTarget {
                    export_name: export.export_name.clone(),
                    export_kind: export.export_kind,
                    member_name: None,
                },
                &changed_file,
            ),
            None => self.scan_textual(symbol, &changed_file),
        };
        annotation.impacted_tests =
            self.impacted_tests(symbol, &changed_file, &annotation.impacted_files);
        annotation
    }

    /// Parser-verified scan: a file counts only if it imports the changed
    /// module with a matching binding AND contains at least one real usage
    /// node. Import-without-use is not impact.
    fn scan_structural(&self, target: &ResolveTarget, changed_file: &Path) -> ImpactAnnotation {
        let candidates: Vec<&PathBuf> = self.workspace.scan_candidates(changed_file).collect();

        let per_file: Vec<(PathBuf, Vec<SourceLocation>)> = candidates
            .par_iter()
            .filter_map(|path| {
                let locations = self.scan_file(path, target, changed_file)?;
                if locations.is_empty() {
                    return None;
                }
                Some(((*path).clone(), locations))
            })
            .collect();

        let mut annotation = ImpactAnnotation::empty(AnalysisOrigin::Structural);
        for (file, locations) in per_file {
            annotation.impacted_files.push(file);
            annotation.impacted_file_locations.extend(locations);
        }
        annotation
    }

    /// Usage locations of the target in one candidate file. `None` when the
    /// file does not import the changed module (or cannot be read/parsed —
    /// per-file failures contribute nothing and never abort the scan).
    fn scan_file(
        &self,
        path: &Path,
        target: &ResolveTarget,
        changed_file: &Path,
    ) -> Option<Vec<SourceLocation>> {
        let source = self.host.read_file(path)?;
        let tree = self.builder.parse(path, &source)?;
        let root = tree.root_node();

        let imports = parse_imports(root, &source);
        let mut direct_locals: Vec<String> = Vec::new();
        let mut namespace_locals: Vec<String> = Vec::new();
        let mut import_ranges: Vec<std::ops::Range<usize>> = Vec::new();

        for stmt in &imports {
            if !specifier_resolves_to(path, &stmt.specifier, changed_file) {
                continue;
            }
            import_ranges.push(stmt.byte_range.clone());
            for binding in &stmt.bindings {
                match &binding.kind {
                    BindingKind::Named { imported } if *imported == target.export_name => {
                        direct_locals.push(binding.local.clone());
                    }
                    BindingKind::Default if target.export_kind == ExportKind::Default => {
                        direct_locals.push(binding.local.clone());
                    }
                    BindingKind::Namespace => namespace_locals.push(binding.local.clone()),
                    _ => {}
                }
            }
        }

        if direct_locals.is_empty() && namespace_locals.is_empty() {
            return None;
        }

        let mut locations = Vec::new();
        collect_usages(
            root,
            &source,
            path,
            target,
            &direct_locals,
            &namespace_locals,
            &import_ranges,
            &mut locations,
        );
        Some(locations)
    }

    /// Textual containment fallback: trades precision for availability.
    /// Reads raw content only; per-file read failures are skipped.
    fn scan_textual(&self, symbol: &str, changed_file: &Path) -> ImpactAnnotation {
        if !self.config.textual_fallback {
            return ImpactAnnotation::empty(AnalysisOrigin::Heuristic);
        }

        let stem = changed_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut needles: Vec<String> = vec![symbol.to_string()];
        if !stem.is_empty() {
            needles.push(stem);
        }
        needles.push(changed_file.to_string_lossy().to_string());

        let matcher = match AhoCorasick::new(&needles) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "Fallback matcher construction failed");
                return ImpactAnnotation::empty(AnalysisOrigin::Heuristic);
            }
        };

        let candidates: Vec<&PathBuf> = self.workspace.scan_candidates(changed_file).collect();
        let per_file: Vec<(PathBuf, SourceLocation)> = candidates
            .par_iter()
            .filter_map(|path| {
                let content = self.host.read_file(path)?;
                let m = matcher.find(content.as_str())?;
                let (line, column) = position_of_offset(&content, m.start());
                Some((
                    (*path).clone(),
                    SourceLocation {
                        file_path: (*path).clone(),
                        line,
                        column,
                    },
                ))
            })
            .collect();

        let mut annotation = ImpactAnnotation::empty(AnalysisOrigin::Heuristic);
        for (file, location) in per_file {
            annotation.impacted_files.push(file);
            annotation.impacted_file_locations.push(location);
        }
        annotation
    }

    /// Test-file mapping for the structural path: a test is impacted if it
    /// is among the resolved impacted files, mentions the symbol, or imports
    /// the changed module by relative-path/base-name heuristics.
    fn impacted_tests(
        &self,
        symbol: &str,
        changed_file: &Path,
        impacted_files: &[PathBuf],
    ) -> Vec<PathBuf> {
        let stem = changed_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        self.workspace
            .test_files
            .iter()
            .filter(|test| {
                if impacted_files.iter().any(|f| f == *test) {
                    return true;
                }
                let Some(content) = self.host.read_file(test) else {
                    return false;
                };
                content.contains(symbol) || (!stem.is_empty() && imports_by_name(&content, &stem))
            })
            .cloned()
            .collect()
    }
}

/// Re-locate the changed symbol inside the after-module's exports. For
/// member-level changes the member itself must still exist; a vanished
/// member (removed or privatized) cannot be re-located and falls back.
fn relocate(change: &BreakingChange, after: &ModuleSnapshot) -> Option<ResolveTarget> {
    let export = after.get(&change.symbol_name)?;
    if let Some(member_name) = &change.member_name {
        let members = export
            .class_members
            .as_deref()
            .or(export.type_members.as_deref())?;
        members.iter().find(|m| m.name == *member_name)?;
        return Some(ResolveTarget {
            export_name: export.export_name.clone(),
            export_kind: export.export_kind,
            member_name: Some(member_name.clone()),
        });
    }
    Some(ResolveTarget {
        export_name: export.export_name.clone(),
        export_kind: export.export_kind,
        member_name: None,
    })
}

/// Walk the AST collecting usage nodes. Nodes inside matched import
/// statements are never usages (that's the binding, not a use).
#[allow(clippy::too_many_arguments)]
fn collect_usages(
    node: tree_sitter::Node<'_>,
    source: &str,
    file: &Path,
    target: &ResolveTarget,
    direct_locals: &[String],
    namespace_locals: &[String],
    import_ranges: &[std::ops::Range<usize>],
    out: &mut Vec<SourceLocation>,
) {
    let start = node.start_byte();
    if import_ranges.iter().any(|r| r.contains(&start)) {
        return;
    }

    match node.kind() {
        "identifier" | "type_identifier" => {
            let text = &source[node.byte_range()];
            let hit = match &target.member_name {
                // Member targets are matched on property accesses below
                Some(_) => false,
                None => direct_locals.iter().any(|l| l == text),
            };
            if hit {
                out.push(location_of(node, file));
            }
        }
        "property_identifier" => {
            if let Some(member) = &target.member_name {
                if &source[node.byte_range()] == member {
                    out.push(location_of(node, file));
                }
            }
        }
        "member_expression" => {
            // `ns.symbol` through a namespace import
            if target.member_name.is_none() {
                let object = node.child_by_field_name("object");
                let property = node.child_by_field_name("property");
                if let (Some(object), Some(property)) = (object, property) {
                    if object.kind() == "identifier"
                        && namespace_locals
                            .iter()
                            .any(|ns| ns == &source[object.byte_range()])
                        && &source[property.byte_range()] == target.export_name.as_str()
                    {
                        out.push(location_of(node, file));
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        collect_usages(
            child,
            source,
            file,
            target,
            direct_locals,
            namespace_locals,
            import_ranges,
            out,
        );
    }
}

fn location_of(node: tree_sitter::Node<'_>, file: &Path) -> SourceLocation {
    let pos = node.start_position();
    SourceLocation {
        file_path: file.to_path_buf(),
        line: pos.row as u32 + 1,
        column: pos.column as u32 + 1,
    }
}

/// 1-based (line, column) of a byte offset
fn position_of_offset(source: &str, offset: usize) -> (u32, u32) {
    let clamped = offset.min(source.len());
    let before = &source[..clamped];
    let line = before.bytes().filter(|b| *b == b'\n').count() as u32 + 1;
    let column = match before.rfind('\n') {
        Some(nl) => (clamped - nl) as u32,
        None => clamped as u32 + 1,
    };
    (line, column)
}

/// Whether content references a module by base name in an import-like line
fn imports_by_name(content: &str, stem: &str) -> bool {
    content.lines().any(|line| {
        (line.contains("import") || line.contains("require(")) && line.contains(stem)
    })
}
