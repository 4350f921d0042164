//! End-to-end analysis scenarios over a real workspace on disk

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use tsblast::{analyze_breaking_changes, Analyzer, RiskLevel};

const DISCOUNT_BEFORE: &str = "\
export function calculateDiscount(price: number): number {
  return price * 0.9;
}
";

/// Workspace with a consumer of `calculateDiscount` and a related test file.
/// The changed file's on-disk content is the after side, the way an editor
/// host hands over a dirty buffer already written to disk.
fn workspace(after_discount: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("tsconfig.json"), "{}\n").unwrap();
    fs::write(root.join("src/discount.ts"), after_discount).unwrap();
    fs::write(
        root.join("src/checkout.ts"),
        "import { calculateDiscount } from './discount';\n\n\
         export function checkout(price: number): number {\n\
           return calculateDiscount(price);\n\
         }\n",
    )
    .unwrap();
    // Imports the module but never uses the changed symbol
    fs::write(
        root.join("src/banner.ts"),
        "import { calculateDiscount } from './discount';\n\nexport const banner = 'sale';\n",
    )
    .unwrap();
    fs::write(
        root.join("src/checkout.test.ts"),
        "import { checkout } from './checkout';\n\n\
         test('checkout applies calculateDiscount', () => {\n\
           expect(checkout(100)).toBe(90);\n\
         });\n",
    )
    .unwrap();
    (dir, root)
}

#[test]
fn no_op_analysis_is_idempotent() {
    let (_dir, root) = workspace(DISCOUNT_BEFORE);
    let file = root.join("src/discount.ts");
    let changes =
        analyze_breaking_changes(&file, DISCOUNT_BEFORE, DISCOUNT_BEFORE, &root, None);
    assert!(changes.is_empty());

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&file, DISCOUNT_BEFORE, DISCOUNT_BEFORE, &root, None);
    assert!(!report.has_actual_changes);
    assert!(report.affected_tests.is_empty());
    assert!(report.downstream_components.is_empty());
}

#[test]
fn optional_param_added_is_not_breaking_but_still_impacts() {
    let after = "\
export function calculateDiscount(price: number, coupon?: string): number {
  return price * 0.9;
}
";
    let (_dir, root) = workspace(after);
    let file = root.join("src/discount.ts");

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&file, DISCOUNT_BEFORE, after, &root, None);

    assert!(report.has_actual_changes);
    assert!(
        report.breaking_changes.is_empty(),
        "optional tail param triggers no rule: {:?}",
        report.breaking_changes
    );
    assert!(report
        .changed_functions
        .contains(&"calculateDiscount".to_string()));
    assert!(
        report
            .downstream_components
            .iter()
            .any(|f| f.ends_with("checkout.ts")),
        "caller appears in downstream components"
    );
    assert!(
        !report
            .downstream_components
            .iter()
            .any(|f| f.ends_with("banner.ts")),
        "import-without-use is not impact"
    );
    assert_eq!(report.risk_level, RiskLevel::Low);
}

#[test]
fn required_param_added_is_one_fn_001() {
    let after = "\
export function calculateDiscount(price: number, coupon: string): number {
  return price * 0.9;
}
";
    let (_dir, root) = workspace(after);
    let file = root.join("src/discount.ts");

    let changes = analyze_breaking_changes(&file, DISCOUNT_BEFORE, after, &root, None);
    assert_eq!(changes.len(), 1);
    let change = &changes[0];
    assert_eq!(change.rule_id.as_str(), "TSAPI-FN-001");
    assert_eq!(change.symbol_name, "calculateDiscount");
    let after_text = change.after.as_ref().expect("after text present");
    assert_ne!(&change.before, after_text);
    assert!(change.before.contains("calculateDiscount(price: number)"));
    assert!(after_text.contains("coupon: string"));

    // Call site resolved to the real line in checkout.ts
    assert!(change.impacted_files.iter().any(|f| f.ends_with("checkout.ts")));
    let loc = change
        .impacted_file_locations
        .iter()
        .find(|l| l.file_path.ends_with("checkout.ts"))
        .expect("usage location");
    assert_eq!(loc.line, 4);

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&file, DISCOUNT_BEFORE, after, &root, None);
    assert_eq!(report.risk_level, RiskLevel::Medium);
    assert!(report
        .affected_tests
        .iter()
        .any(|t| t.ends_with("checkout.test.ts")));
}

#[test]
fn deleted_export_is_one_exp_001_with_fallback_impact() {
    let after = "export const placeholder = 0;\n";
    let (_dir, root) = workspace(after);
    let file = root.join("src/discount.ts");

    let changes = analyze_breaking_changes(&file, DISCOUNT_BEFORE, after, &root, None);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].rule_id.as_str(), "TSAPI-EXP-001");
    assert!(changes[0].after.is_none());
    // Symbol is gone from the after-program: the textual fallback still
    // finds the consumer instead of throwing
    assert!(
        changes[0]
            .impacted_files
            .iter()
            .any(|f| f.ends_with("checkout.ts")),
        "fallback impact populated: {:?}",
        changes[0].impacted_files
    );

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&file, DISCOUNT_BEFORE, after, &root, None);
    assert!(
        report
            .changed_functions
            .contains(&"calculateDiscount".to_string()),
        "line-based removal path still reports the function"
    );
    assert_eq!(report.risk_level, RiskLevel::High);
    assert!(!report.affected_tests.is_empty());
}

#[test]
fn no_tsconfig_yields_empty_changes_not_error() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("src/a.ts"), "export const b = 2;\n").unwrap();

    let changes = analyze_breaking_changes(
        &root.join("src/a.ts"),
        "export const a = 1;\n",
        "export const b = 2;\n",
        &root,
        None,
    );
    assert!(changes.is_empty());
}

#[test]
fn class_privatization_end_to_end() {
    let before = "\
export class Cart {
  total(): number { return 0; }
  audit(): void {}
}
";
    let after = "\
export class Cart {
  total(): number { return 0; }
  private audit(): void {}
}
";
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_path_buf();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("tsconfig.json"), "{}\n").unwrap();
    fs::write(root.join("src/cart.ts"), after).unwrap();
    fs::write(
        root.join("src/store.ts"),
        "import { Cart } from './cart';\n\nconst cart = new Cart();\ncart.audit();\n",
    )
    .unwrap();

    let changes = analyze_breaking_changes(&root.join("src/cart.ts"), before, after, &root, None);
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].rule_id.as_str(), "TSAPI-CLS-001");
    assert_eq!(changes[0].member_name.as_deref(), Some("audit"));
    // Privatized member cannot be re-located; fallback still finds the user
    assert!(changes[0].impacted_files.iter().any(|f| f.ends_with("store.ts")));

    let analyzer = Analyzer::for_root(&root);
    let report = analyzer.analyze(&root.join("src/cart.ts"), before, after, &root, None);
    assert_eq!(report.risk_level, RiskLevel::High);
}
