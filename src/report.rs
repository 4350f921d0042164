//! Impact report assembly
//!
//! Pure aggregation over snapshots, breaking changes, and resolved impact:
//! risk from the fixed severity table, capped confidence, and linear
//! test-time/coverage estimates. A byte-identical before/after pair
//! short-circuits the whole pipeline into an empty report.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::breaking::{BreakingChange, Severity};

/// Seconds assumed per affected test when no config overrides it
pub const DEFAULT_TEST_TIME_SECS: u32 = 30;

/// Estimated coverage impact per changed symbol, percent
const COVERAGE_PER_SYMBOL: f32 = 5.0;

/// Risk classification of a whole report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// Final report for one analyzed file. Built once, never mutated, consumed
/// read-only downstream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysisResult {
    pub file_path: PathBuf,
    /// Names from the line-based path (diff lines mapped onto declarations),
    /// independent of the structural breaking-change path
    pub changed_functions: Vec<String>,
    pub changed_classes: Vec<String>,
    pub affected_tests: Vec<PathBuf>,
    /// Impacted source files, tests excluded
    pub downstream_components: Vec<PathBuf>,
    pub confidence: f32,
    pub estimated_test_time_secs: u32,
    /// Percent, capped at 100
    pub coverage_impact: f32,
    pub risk_level: RiskLevel,
    pub breaking_changes: Vec<BreakingChange>,
    /// False when before/after were byte-identical and nothing ran
    pub has_actual_changes: bool,
}

impl ImpactAnalysisResult {
    /// The no-op report: all collections empty, gate closed
    pub fn empty(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            changed_functions: Vec::new(),
            changed_classes: Vec::new(),
            affected_tests: Vec::new(),
            downstream_components: Vec::new(),
            confidence: 0.0,
            estimated_test_time_secs: 0,
            coverage_impact: 0.0,
            risk_level: RiskLevel::Low,
            breaking_changes: Vec::new(),
            has_actual_changes: false,
        }
    }
}

/// Risk from the severity table: any critical rule forces high, any medium
/// rule (without critical) forces medium, everything else is low.
pub fn risk_level(changes: &[BreakingChange]) -> RiskLevel {
    let mut risk = RiskLevel::Low;
    for change in changes {
        match change.severity() {
            Severity::Critical => return RiskLevel::High,
            Severity::Medium => risk = RiskLevel::Medium,
            Severity::Low => {}
        }
    }
    risk
}

/// Bounded confidence heuristic: grows with detected changes and affected
/// tests, never exceeds 1.0
pub fn confidence(change_count: usize, affected_test_count: usize) -> f32 {
    let base = 0.5_f32;
    let score = base + 0.08 * change_count as f32 + 0.04 * affected_test_count as f32;
    score.min(1.0)
}

/// Linear test-time estimate
pub fn estimated_test_time(affected_test_count: usize, per_test_secs: u32) -> u32 {
    (affected_test_count as u32).saturating_mul(per_test_secs)
}

/// Linear, capped coverage estimate from the changed-symbol count
pub fn coverage_impact(changed_symbol_count: usize) -> f32 {
    (changed_symbol_count as f32 * COVERAGE_PER_SYMBOL).min(100.0)
}

/// Assemble the final report from the pipeline's pieces
#[allow(clippy::too_many_arguments)]
pub fn assemble(
    file_path: &Path,
    changed_functions: Vec<String>,
    changed_classes: Vec<String>,
    affected_tests: Vec<PathBuf>,
    downstream_components: Vec<PathBuf>,
    breaking_changes: Vec<BreakingChange>,
    per_test_secs: u32,
) -> ImpactAnalysisResult {
    let changed_symbols = changed_functions.len() + changed_classes.len();
    ImpactAnalysisResult {
        file_path: file_path.to_path_buf(),
        confidence: confidence(breaking_changes.len(), affected_tests.len()),
        estimated_test_time_secs: estimated_test_time(affected_tests.len(), per_test_secs),
        coverage_impact: coverage_impact(changed_symbols),
        risk_level: risk_level(&breaking_changes),
        changed_functions,
        changed_classes,
        affected_tests,
        downstream_components,
        breaking_changes,
        has_actual_changes: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breaking::{ChangeKind, RuleId};
    use crate::snapshot::{Span, SymbolKind};

    fn change(rule_id: RuleId) -> BreakingChange {
        BreakingChange::new(
            rule_id,
            ChangeKind::ExportRemoved,
            "sym",
            SymbolKind::Function,
            "m.ts",
            Span::default(),
            "before",
            None,
        )
    }

    #[test]
    fn test_risk_critical_forces_high() {
        let changes = vec![change(RuleId::SignatureStricter), change(RuleId::ExportRemoved)];
        assert_eq!(risk_level(&changes), RiskLevel::High);
    }

    #[test]
    fn test_risk_medium_without_critical() {
        let changes = vec![change(RuleId::ParamTypeNarrowed)];
        assert_eq!(risk_level(&changes), RiskLevel::Medium);
    }

    #[test]
    fn test_risk_low_when_empty() {
        assert_eq!(risk_level(&[]), RiskLevel::Low);
    }

    #[test]
    fn test_confidence_monotonic_and_capped() {
        assert!(confidence(0, 0) < confidence(1, 0));
        assert!(confidence(1, 0) < confidence(1, 3));
        assert_eq!(confidence(100, 100), 1.0);
        assert!(confidence(1000, 1000) <= 1.0, "never exceeds the cap");
    }

    #[test]
    fn test_estimated_test_time_linear() {
        assert_eq!(estimated_test_time(0, 30), 0);
        assert_eq!(estimated_test_time(4, 30), 120);
    }

    #[test]
    fn test_coverage_capped() {
        assert_eq!(coverage_impact(2), 10.0);
        assert_eq!(coverage_impact(50), 100.0);
    }

    #[test]
    fn test_empty_report_gate() {
        let report = ImpactAnalysisResult::empty("src/a.ts");
        assert!(!report.has_actual_changes);
        assert!(report.breaking_changes.is_empty());
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.estimated_test_time_secs, 0);
    }

    #[test]
    fn test_assemble_wires_metrics() {
        let report = assemble(
            Path::new("src/a.ts"),
            vec!["f".to_string()],
            vec![],
            vec![PathBuf::from("a.test.ts"), PathBuf::from("b.test.ts")],
            vec![PathBuf::from("user.ts")],
            vec![change(RuleId::ExportRemoved)],
            30,
        );
        assert!(report.has_actual_changes);
        assert_eq!(report.risk_level, RiskLevel::High);
        assert_eq!(report.estimated_test_time_secs, 60);
        assert_eq!(report.coverage_impact, 5.0);
        assert!(report.confidence > 0.5 && report.confidence <= 1.0);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let report = ImpactAnalysisResult::empty("src/a.ts");
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("hasActualChanges").is_some());
        assert!(json.get("riskLevel").is_some());
        assert!(json.get("downstreamComponents").is_some());
    }
}
