//! CLI integration tests
//!
//! These tests run the built binary against small projects in temporary
//! directories.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SHAPES: &str = r#"package shapes;

class Shape {
    void draw() {}
    int sides() { return 0; }
}

class Blob extends Shape {
    void draw() { super.draw(); }
    int sides() { return 0; }
    void extra() {}
}
"#;

fn project_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (relative, contents) in files {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
    dir
}

fn cli(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("redundantoverride").unwrap();
    cmd.arg(root);
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    Command::cargo_bin("redundantoverride")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--ignore-delegates"))
        .stdout(predicate::str::contains("--check-library-methods"));
}

#[test]
fn test_terminal_report() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);

    cli(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 redundant overrides"))
        .stdout(predicate::str::contains("RO001"))
        .stdout(predicate::str::contains("RO002"));
}

#[test]
fn test_no_findings() {
    let dir = project_with(&[("A.java", "class A { void m() {} }\n")]);

    cli(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No redundant overrides found"));
}

#[test]
fn test_json_report() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);

    let output = cli(dir.path()).args(["--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 2);
    assert_eq!(json["issues"][0]["method"], "draw");
    assert_eq!(json["issues"][0]["delegates_to_super"], true);
    assert_eq!(json["issues"][1]["method"], "sides");
    assert_eq!(json["issues"][1]["delegates_to_super"], false);
}

#[test]
fn test_sarif_output_file() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);
    let report = dir.path().join("report.sarif");

    cli(dir.path())
        .args(["--format", "sarif", "--output"])
        .arg(&report)
        .assert()
        .success();

    let sarif: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(sarif["version"], "2.1.0");
    assert_eq!(sarif["runs"][0]["results"].as_array().unwrap().len(), 2);
}

#[test]
fn test_ignore_delegates_flag() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);

    let output = cli(dir.path())
        .args(["--format", "json", "--ignore-delegates"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 1);
    assert_eq!(json["issues"][0]["method"], "sides");
}

#[test]
fn test_fail_on_findings() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);
    cli(dir.path()).arg("--fail-on-findings").assert().code(1);

    let clean = project_with(&[("A.java", "class A {}\n")]);
    cli(clean.path()).arg("--fail-on-findings").assert().success();
}

#[test]
fn test_config_file_disables_inspection() {
    let dir = project_with(&[
        ("src/shapes/Shapes.java", SHAPES),
        (
            ".redundantoverride.yml",
            "inspections:\n  redundant_override:\n    ignore_delegates: true\n",
        ),
    ]);

    let output = cli(dir.path()).args(["--format", "json"]).output().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 1);
}

#[test]
fn test_library_sources_resolve_super_methods() {
    let dir = project_with(&[
        ("libsrc/lib/Widget.java", "package lib; public class Widget { public int size() { return 4; } }"),
        (
            "src/app/Button.java",
            "package app; import lib.Widget; class Button extends Widget { public int size() { return 4; } }",
        ),
    ]);

    let output = cli(dir.path())
        .args(["--format", "json", "--target", "src", "--library", "libsrc", "--check-library-methods"])
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 1);
    assert_eq!(json["issues"][0]["owner"], "app.Button");
}

// ============================================================================
// Fix and baseline workflows
// ============================================================================

#[test]
fn test_fix_with_yes() {
    let dir = project_with(&[("A.java", "class A { void m() {} }\nclass B extends A { void m() { super.m(); } }\n")]);

    cli(dir.path())
        .args(["--fix", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Applied 1 fixes"));

    assert_eq!(
        fs::read_to_string(dir.path().join("A.java")).unwrap(),
        "class A { void m() {} }\nclass B extends A {}\n"
    );
}

#[test]
fn test_dry_run_changes_nothing() {
    let source = "class A { void m() {} }\nclass B extends A { void m() { super.m(); } }\n";
    let dir = project_with(&[("A.java", source)]);

    cli(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert_eq!(fs::read_to_string(dir.path().join("A.java")).unwrap(), source);
}

#[test]
fn test_baseline_roundtrip() {
    let dir = project_with(&[("src/shapes/Shapes.java", SHAPES)]);
    let baseline = dir.path().join("baseline.json");

    cli(dir.path()).arg("--generate-baseline").arg(&baseline).assert().success();
    assert!(baseline.exists());

    let output = cli(dir.path())
        .args(["--format", "json", "--baseline"])
        .arg(&baseline)
        .output()
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["total_issues"], 0);
}
