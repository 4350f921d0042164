//! Breaking-change records and the fixed rule-ID taxonomy

use std::path::PathBuf;

use serde::Serialize;

use crate::snapshot::{MemberKind, Span, SymbolKind};

/// Stable rule identifiers. The string forms are a compatibility surface for
/// severity-based consumers and must not change; `RuleId` serializes as the
/// string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleId {
    /// TSAPI-EXP-001 — export removed
    ExportRemoved,
    /// TSAPI-EXP-002 — default/named export kind changed
    ExportKindChanged,
    /// TSAPI-FN-001 — signature became stricter (required param added or
    /// param became required)
    SignatureStricter,
    /// TSAPI-FN-002 — parameter type narrowed
    ParamTypeNarrowed,
    /// TSAPI-CLS-001 — class member removed/privatized
    ClassMemberRemoved,
    /// TSAPI-TYP-001 — required property added/made required
    RequiredPropAdded,
    /// TSAPI-TYP-002 — property removed/narrowed
    PropRemovedOrNarrowed,
    /// TSX-CMP-001 — component props became stricter
    ComponentPropsStricter,
    /// TSX-CMP-002 — UI component removed
    ComponentRemoved,
}

impl RuleId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleId::ExportRemoved => "TSAPI-EXP-001",
            RuleId::ExportKindChanged => "TSAPI-EXP-002",
            RuleId::SignatureStricter => "TSAPI-FN-001",
            RuleId::ParamTypeNarrowed => "TSAPI-FN-002",
            RuleId::ClassMemberRemoved => "TSAPI-CLS-001",
            RuleId::RequiredPropAdded => "TSAPI-TYP-001",
            RuleId::PropRemovedOrNarrowed => "TSAPI-TYP-002",
            RuleId::ComponentPropsStricter => "TSX-CMP-001",
            RuleId::ComponentRemoved => "TSX-CMP-002",
        }
    }

    /// Fixed severity partition (spec'd table; anything not listed is low)
    pub fn severity(&self) -> Severity {
        match self {
            RuleId::ExportRemoved | RuleId::ClassMemberRemoved | RuleId::ComponentRemoved => {
                Severity::Critical
            }
            RuleId::ExportKindChanged
            | RuleId::SignatureStricter
            | RuleId::ParamTypeNarrowed
            | RuleId::RequiredPropAdded
            | RuleId::PropRemovedOrNarrowed
            | RuleId::ComponentPropsStricter => Severity::Medium,
        }
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Severity tier of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    Critical,
}

/// What structurally changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    ExportRemoved,
    ExportKindChanged,
    RequiredParamAdded,
    ParamBecameRequired,
    ParamTypeNarrowed,
    MemberRemoved,
    MemberKindChanged,
    RequiredPropAdded,
    PropRemoved,
    PropTypeNarrowed,
}

/// A concrete usage site of a changed symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_path: PathBuf,
    /// 1-based
    pub line: u32,
    /// 1-based
    pub column: u32,
}

/// One detected API incompatibility.
///
/// Created by the differ with empty impact fields; the resolver/test mapper
/// produce a parallel [`crate::resolve::ImpactAnnotation`] that is merged in
/// functionally via [`crate::resolve::apply_annotation`] — the record itself
/// is never mutated in place, and is immutable once it reaches the report
/// assembler.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    pub rule_id: RuleId,
    pub change_kind: ChangeKind,
    pub symbol_name: String,
    pub symbol_kind: SymbolKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member_kind: Option<MemberKind>,
    pub file_path: PathBuf,
    pub span: Span,
    /// Human-readable summary of the before shape
    pub before: String,
    /// Summary of the after shape; `None` when the symbol was removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    pub impacted_files: Vec<PathBuf>,
    pub impacted_file_locations: Vec<SourceLocation>,
    pub impacted_tests: Vec<PathBuf>,
}

impl BreakingChange {
    pub(crate) fn new(
        rule_id: RuleId,
        change_kind: ChangeKind,
        symbol_name: impl Into<String>,
        symbol_kind: SymbolKind,
        file_path: impl Into<PathBuf>,
        span: Span,
        before: impl Into<String>,
        after: Option<String>,
    ) -> Self {
        Self {
            rule_id,
            change_kind,
            symbol_name: symbol_name.into(),
            symbol_kind,
            member_name: None,
            member_kind: None,
            file_path: file_path.into(),
            span,
            before: before.into(),
            after,
            impacted_files: Vec::new(),
            impacted_file_locations: Vec::new(),
            impacted_tests: Vec::new(),
        }
    }

    pub(crate) fn with_member(mut self, name: impl Into<String>, kind: MemberKind) -> Self {
        self.member_name = Some(name.into());
        self.member_kind = Some(kind);
        self
    }

    pub fn severity(&self) -> Severity {
        self.rule_id.severity()
    }
}
