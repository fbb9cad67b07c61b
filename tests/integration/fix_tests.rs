//! Quick fixes applied to files on disk

use redundantoverride::config::Config;
use redundantoverride::refactor::apply_edits;
use redundantoverride::{
    FileFinder, Finding, FixApplier, FixSummary, Inspector, Project, ProjectBuilder, ProblemKind, QuickFix,
    SourceOrigin,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn analyze(root: &Path) -> (Project, Vec<Finding>) {
    let config = Config::default();
    let files = FileFinder::new(&config).find_files(root).unwrap();
    let mut builder = ProjectBuilder::new();
    builder.add_files(&files, SourceOrigin::Project);
    let project = builder.build().unwrap();
    let findings = Inspector::default().run(&project).findings;
    (project, findings)
}

#[test]
fn test_delete_several_overrides_in_one_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Shapes.java");
    fs::write(
        &path,
        r#"class Shape {
    void draw() {}
    void erase() {}
    int sides() { return 0; }
}

class Blob extends Shape {
    void draw() { super.draw(); }
    void erase() { super.erase(); }
    int sides() { return 0; }
}
"#,
    )
    .unwrap();

    let (project, findings) = analyze(dir.path());
    assert_eq!(findings.len(), 3);

    let summary = FixApplier::new(false, false, None)
        .with_assume_yes(true)
        .apply(&project, &findings)
        .unwrap();

    assert_eq!(summary, FixSummary { applied: 3, failed: 0 });
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        r#"class Shape {
    void draw() {}
    void erase() {}
    int sides() { return 0; }
}

class Blob extends Shape {
}
"#
    );
}

#[test]
fn test_replace_with_super_keeps_method() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Counter.java");
    fs::write(
        &path,
        r#"class Counter {
    int next(int step) {
        return step + 1;
    }
}

class Fast extends Counter {
    @Override
    int next(int n) {
        return n + 1;
    }
}
"#,
    )
    .unwrap();

    let (project, findings) = analyze(dir.path());
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, ProblemKind::EquivalentOverride);

    FixApplier::new(false, false, None)
        .with_preferred(QuickFix::ReplaceWithSuperDelegation)
        .with_assume_yes(true)
        .apply(&project, &findings)
        .unwrap();

    let fixed = fs::read_to_string(&path).unwrap();
    assert!(fixed.contains("    @Override\n    int next(int n) {\n        return super.next(n);\n    }\n"));
}

#[test]
fn test_delegation_preferred_falls_back_to_delete() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("A.java");
    fs::write(&path, "class A { void m() {} }\nclass B extends A {\n    void m() { super.m(); }\n    int x;\n}\n").unwrap();

    let (project, findings) = analyze(dir.path());
    assert_eq!(findings[0].fixes, vec![QuickFix::DeleteOverride]);

    FixApplier::new(false, false, None)
        .with_preferred(QuickFix::ReplaceWithSuperDelegation)
        .with_assume_yes(true)
        .apply(&project, &findings)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "class A { void m() {} }\nclass B extends A {\n    int x;\n}\n"
    );
}

#[test]
fn test_undo_script_restores_every_file() {
    let dir = TempDir::new().unwrap();
    let first = "class A { void m() {} }\nclass B extends A { void m() { super.m(); } }\n";
    let second = "class C extends A {\n    void m() { super.m(); }\n    void n() {}\n}\n";
    fs::write(dir.path().join("A.java"), first).unwrap();
    fs::write(dir.path().join("C.java"), second).unwrap();
    let undo = dir.path().join("undo.sh");

    let (project, findings) = analyze(dir.path());
    assert_eq!(findings.len(), 2);

    FixApplier::new(false, false, Some(undo.clone()))
        .with_assume_yes(true)
        .apply(&project, &findings)
        .unwrap();

    assert_ne!(fs::read_to_string(dir.path().join("A.java")).unwrap(), first);
    let script = fs::read_to_string(&undo).unwrap();
    assert!(script.contains(first));
    assert!(script.contains(second));
    assert_eq!(script.matches("\nREDUNDANTOVERRIDE_EOF\n").count(), 2);
}

#[test]
fn test_edits_are_pure() {
    let source = "class A { void m() {} }\nclass B extends A { void m() { super.m(); } }\n";
    let project = Project::from_sources(&[("A.java", source)]).unwrap();
    let findings = Inspector::default().run(&project).findings;

    let first = QuickFix::DeleteOverride.edits(&project, &findings[0]).unwrap();
    let second = QuickFix::DeleteOverride.edits(&project, &findings[0]).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        apply_edits(source, &first).unwrap(),
        "class A { void m() {} }\nclass B extends A {}\n"
    );
}
