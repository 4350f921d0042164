//! CLI smoke tests

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tsblast() -> Command {
    Command::cargo_bin("tsblast").expect("binary builds")
}

#[test]
fn test_diff_lines_from_stdin() {
    let diff = "\
--- a/src/a.ts
+++ b/src/a.ts
@@ -1,2 +1,3 @@
 context
+added
";
    tsblast()
        .arg("diff-lines")
        .write_stdin(diff)
        .assert()
        .success()
        .stdout("2\n");
}

#[test]
fn test_snapshot_prints_export_json() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("util.ts");
    fs::write(&file, "export function greet(name: string): string { return name; }\n").unwrap();

    tsblast()
        .arg("snapshot")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exportName\": \"greet\""))
        .stdout(predicate::str::contains("\"symbolKind\": \"function\""));
}

#[test]
fn test_analyze_json_reports_breaking_change() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("tsconfig.json"), "{}\n").unwrap();
    fs::write(
        root.join("src/util.ts"),
        "export function greet(name: string, formal: boolean): string { return name; }\n",
    )
    .unwrap();
    let before = root.join("util.before.ts");
    fs::write(
        &before,
        "export function greet(name: string): string { return name; }\n",
    )
    .unwrap();

    tsblast()
        .arg("analyze")
        .arg(root.join("src/util.ts"))
        .arg("--before")
        .arg(&before)
        .arg("--root")
        .arg(root)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::contains("TSAPI-FN-001"))
        .stdout(predicate::str::contains("\"riskLevel\": \"medium\""));
}

#[test]
fn test_analyze_missing_before_file_fails_with_context() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.ts");
    fs::write(&file, "export const a = 1;\n").unwrap();

    tsblast()
        .arg("analyze")
        .arg(&file)
        .arg("--before")
        .arg(dir.path().join("missing.ts"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}
