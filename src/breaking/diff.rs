//! Snapshot differ: classifies API-breaking changes between two snapshots
//!
//! Pure function over a (before, after) snapshot pair. Emission order is
//! fixed: export removals first (before-snapshot order), then the single
//! default/named export-kind check, then per-export diffs in after-snapshot
//! order. Only symbols present on both sides are diffed for signature,
//! member, and type rules — a newly added export is never breaking.

use crate::snapshot::{ExportSnapshot, Member, ModuleSnapshot, Signature, SymbolKind};

use super::types::{BreakingChange, ChangeKind, RuleId};

/// Diff two snapshots of the same module and return classified breaking
/// changes. Deterministic given the two snapshots; no I/O.
pub fn diff_snapshots(before: &ModuleSnapshot, after: &ModuleSnapshot) -> Vec<BreakingChange> {
    let mut changes = Vec::new();

    // Rule 1: export removed (before order)
    for exp in &before.exports {
        if after.get(&exp.export_name).is_none() {
            let rule_id = if exp.symbol_kind == SymbolKind::Component {
                RuleId::ComponentRemoved
            } else {
                RuleId::ExportRemoved
            };
            changes.push(BreakingChange::new(
                rule_id,
                ChangeKind::ExportRemoved,
                &exp.export_name,
                exp.symbol_kind,
                &before.file_path,
                exp.span,
                exp.describe(),
                None,
            ));
        }
    }

    // Rule 2: default/named export kind changed — at most one emission
    if before.has_default() != after.has_default() {
        // Anchor the change on whichever side still carries the default
        let anchor = before
            .exports
            .iter()
            .chain(after.exports.iter())
            .find(|e| e.export_kind == crate::snapshot::ExportKind::Default);
        if let Some(anchor) = anchor {
            let (before_text, after_text) = if before.has_default() {
                ("default export".to_string(), Some("named export".to_string()))
            } else {
                ("named export".to_string(), Some("default export".to_string()))
            };
            changes.push(BreakingChange::new(
                RuleId::ExportKindChanged,
                ChangeKind::ExportKindChanged,
                &anchor.export_name,
                anchor.symbol_kind,
                &after.file_path,
                anchor.span,
                before_text,
                after_text,
            ));
        }
    }

    // Rules 3-8: shared exports only, after order
    for after_exp in &after.exports {
        let Some(before_exp) = before.get(&after_exp.export_name) else {
            continue;
        };
        diff_export(before_exp, after_exp, after, &mut changes);
    }

    changes
}

fn diff_export(
    before: &ExportSnapshot,
    after: &ExportSnapshot,
    after_module: &ModuleSnapshot,
    changes: &mut Vec<BreakingChange>,
) {
    // Signatures (rules 3-5)
    if let (Some(before_sig), Some(after_sig)) =
        (before.signatures.first(), after.signatures.first())
    {
        diff_signature(before, after, before_sig, after_sig, after_module, changes);
    }

    // Class members (rule 6)
    if let (Some(before_members), Some(after_members)) =
        (before.class_members.as_deref(), after.class_members.as_deref())
    {
        diff_class_members(before, after, before_members, after_members, after_module, changes);
    }

    // Type/interface members (rules 7-8)
    if let (Some(before_members), Some(after_members)) =
        (before.type_members.as_deref(), after.type_members.as_deref())
    {
        diff_type_members(before, after, before_members, after_members, after_module, changes);
    }
}

fn diff_signature(
    before: &ExportSnapshot,
    after: &ExportSnapshot,
    before_sig: &Signature,
    after_sig: &Signature,
    module: &ModuleSnapshot,
    changes: &mut Vec<BreakingChange>,
) {
    let is_component =
        before.symbol_kind == SymbolKind::Component || after.symbol_kind == SymbolKind::Component;
    let stricter_rule = if is_component {
        RuleId::ComponentPropsStricter
    } else {
        RuleId::SignatureStricter
    };
    let name = &after.export_name;

    // Rule 3: required parameter added. Only the first surplus required
    // parameter triggers — never one emission per extra parameter.
    if after_sig.params.len() > before_sig.params.len() {
        let added = &after_sig.params[before_sig.params.len()..];
        if added.iter().any(|p| !p.optional && !p.rest) {
            changes.push(BreakingChange::new(
                stricter_rule,
                ChangeKind::RequiredParamAdded,
                name,
                after.symbol_kind,
                &module.file_path,
                after.span,
                before_sig.render(name),
                Some(after_sig.render(name)),
            ));
        }
    }

    let paired = before_sig.params.len().min(after_sig.params.len());

    // Rule 4: first paired parameter that went optional -> required
    for i in 0..paired {
        if before_sig.params[i].optional && !after_sig.params[i].optional {
            changes.push(BreakingChange::new(
                stricter_rule,
                ChangeKind::ParamBecameRequired,
                name,
                after.symbol_kind,
                &module.file_path,
                after.span,
                before_sig.render(name),
                Some(after_sig.render(name)),
            ));
            break;
        }
    }

    // Rule 5: first paired parameter whose rendered type text differs.
    // Textual equality is a deliberate proxy for narrowing — it over-triggers
    // on widening and formatting differences rather than missing real breaks.
    for i in 0..paired {
        if before_sig.params[i].type_text != after_sig.params[i].type_text {
            changes.push(BreakingChange::new(
                RuleId::ParamTypeNarrowed,
                ChangeKind::ParamTypeNarrowed,
                name,
                after.symbol_kind,
                &module.file_path,
                after.span,
                before_sig.render(name),
                Some(after_sig.render(name)),
            ));
            break;
        }
    }
}

fn diff_class_members(
    _before: &ExportSnapshot,
    after: &ExportSnapshot,
    before_members: &[Member],
    after_members: &[Member],
    module: &ModuleSnapshot,
    changes: &mut Vec<BreakingChange>,
) {
    for bm in before_members {
        match after_members.iter().find(|am| am.name == bm.name) {
            // Covers true removal and privatization alike: private members
            // never enter the snapshot, so both look like a disappearance
            None => changes.push(
                BreakingChange::new(
                    RuleId::ClassMemberRemoved,
                    ChangeKind::MemberRemoved,
                    &after.export_name,
                    after.symbol_kind,
                    &module.file_path,
                    after.span,
                    bm.render(),
                    None,
                )
                .with_member(&bm.name, bm.member_kind),
            ),
            Some(am) if am.member_kind != bm.member_kind => changes.push(
                BreakingChange::new(
                    RuleId::ClassMemberRemoved,
                    ChangeKind::MemberKindChanged,
                    &after.export_name,
                    after.symbol_kind,
                    &module.file_path,
                    after.span,
                    bm.render(),
                    Some(am.render()),
                )
                .with_member(&bm.name, bm.member_kind),
            ),
            Some(_) => {}
        }
    }
}

fn diff_type_members(
    _before: &ExportSnapshot,
    after: &ExportSnapshot,
    before_members: &[Member],
    after_members: &[Member],
    module: &ModuleSnapshot,
    changes: &mut Vec<BreakingChange>,
) {
    // Rule 7: property required in after, absent-or-optional in before
    for am in after_members {
        if am.optional {
            continue;
        }
        let newly_required = match before_members.iter().find(|bm| bm.name == am.name) {
            None => true,
            Some(bm) => bm.optional,
        };
        if newly_required {
            changes.push(
                BreakingChange::new(
                    RuleId::RequiredPropAdded,
                    ChangeKind::RequiredPropAdded,
                    &after.export_name,
                    after.symbol_kind,
                    &module.file_path,
                    after.span,
                    describe_prop(before_members, &am.name),
                    Some(am.render()),
                )
                .with_member(&am.name, am.member_kind),
            );
        }
    }

    // Rule 8: property removed, or rendered type text differs
    for bm in before_members {
        match after_members.iter().find(|am| am.name == bm.name) {
            None => changes.push(
                BreakingChange::new(
                    RuleId::PropRemovedOrNarrowed,
                    ChangeKind::PropRemoved,
                    &after.export_name,
                    after.symbol_kind,
                    &module.file_path,
                    after.span,
                    bm.render(),
                    None,
                )
                .with_member(&bm.name, bm.member_kind),
            ),
            Some(am) if am.type_text != bm.type_text => changes.push(
                BreakingChange::new(
                    RuleId::PropRemovedOrNarrowed,
                    ChangeKind::PropTypeNarrowed,
                    &after.export_name,
                    after.symbol_kind,
                    &module.file_path,
                    after.span,
                    bm.render(),
                    Some(am.render()),
                )
                .with_member(&bm.name, bm.member_kind),
            ),
            Some(_) => {}
        }
    }
}

fn describe_prop(members: &[Member], name: &str) -> String {
    members
        .iter()
        .find(|m| m.name == name)
        .map(Member::render)
        .unwrap_or_else(|| format!("{} (absent)", name))
}
