//! Inspector runs over small projects
//!
//! These tests drive the configured inspections end to end and check which
//! methods are reported, and why.

use redundantoverride::config::{Config, RedundantOverrideConfig};
use redundantoverride::{Finding, Inspector, Project, ProjectBuilder, ProblemKind, SourceOrigin};

fn run(sources: &[(&str, &str)]) -> Vec<Finding> {
    let project = Project::from_sources(sources).unwrap();
    Inspector::default().run(&project).findings
}

fn run_with(config: &Config, project: &Project) -> Vec<Finding> {
    Inspector::from_config(config).run(project).findings
}

fn names(findings: &[Finding]) -> Vec<String> {
    findings
        .iter()
        .map(|f| format!("{}.{}", f.owner_name, f.method_name))
        .collect()
}

// ============================================================================
// Redundant overrides
// ============================================================================

#[test]
fn test_delegating_and_equivalent_overrides() {
    let findings = run(&[(
        "shapes/Shapes.java",
        r#"package shapes;

class Shape {
    double area() { return 0; }
    String label(String prefix) { return prefix + ":" + area(); }
    void draw() {}
}

class Square extends Shape {
    double side;

    @Override
    double area() { return side * side; }

    @Override
    String label(String p) { return p + ":" + area(); }

    @Override
    void draw() { super.draw(); }
}
"#,
    )]);

    assert_eq!(names(&findings), vec!["shapes.Square.label", "shapes.Square.draw"]);
    assert_eq!(findings[0].kind, ProblemKind::EquivalentOverride);
    assert!(!findings[0].delegates_to_super);
    assert_eq!(findings[1].kind, ProblemKind::DelegatingOverride);
    assert!(findings[1].delegates_to_super);
    assert_eq!(findings[1].super_owner_name, "shapes.Shape");
}

#[test]
fn test_finding_points_at_method_name() {
    let findings = run(&[("A.java", "class A { void m() {} }\nclass B extends A {\n    void m() { super.m(); }\n}\n")]);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location.line, 3);
    assert_eq!(findings[0].location.column, 10);
}

#[test]
fn test_changed_signature_parts_are_not_reported() {
    let findings = run(&[(
        "A.java",
        r#"
class Base {
    protected void widen() {}
    void sync() {}
    void risky() {}
    void many(String... xs) {}
}

class Child extends Base {
    public void widen() { super.widen(); }
    synchronized void sync() { super.sync(); }
    void risky() throws Exception { super.risky(); }
    void many(String[] xs) { super.many(xs); }
}
"#,
    )]);

    assert!(findings.is_empty(), "{:?}", names(&findings));
}

#[test]
fn test_mixed_default_ness_is_never_reported() {
    let findings = run(&[(
        "A.java",
        r#"
interface Walker { default void move() {} }
interface Runner { void move(); }
class Legs implements Walker, Runner {
    public void move() { Walker.super.move(); }
}
"#,
    )]);

    assert!(findings.is_empty());
}

#[test]
fn test_unrelated_interface_defaults_are_never_reported() {
    let findings = run(&[(
        "A.java",
        r#"
interface Walker { default void move() {} }
interface Swimmer { default void move() {} }
class Duck implements Walker, Swimmer {
    public void move() { Walker.super.move(); }
}
"#,
    )]);

    assert!(findings.is_empty(), "{:?}", names(&findings));
}

#[test]
fn test_delegation_to_native_object_methods() {
    let findings = run(&[(
        "A.java",
        r#"
class Point {
    public int hashCode() { return super.hashCode(); }
    protected Object clone() throws CloneNotSupportedException { return super.clone(); }
}
"#,
    )]);

    assert_eq!(names(&findings), vec!["Point.hashCode", "Point.clone"]);
    assert!(findings.iter().all(|f| f.kind == ProblemKind::DelegatingOverride));
}

#[test]
fn test_diamond_prefers_class_super_method() {
    let findings = run(&[(
        "A.java",
        r#"
interface Named { default String name() { return "x"; } }
class Base { public String name() { return "x"; } }
class Leaf extends Base implements Named {
    public String name() { return super.name(); }
}
"#,
    )]);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].super_owner_name, "Base");
}

#[test]
fn test_ignore_delegates() {
    let project = Project::from_sources(&[(
        "A.java",
        "class A { int m(int a) { return a; } void n() {} }\nclass B extends A { int m(int a) { return a; } void n() { super.n(); } }\n",
    )])
    .unwrap();

    let mut config = Config::default();
    config.inspections.redundant_override = RedundantOverrideConfig {
        ignore_delegates: true,
        ..RedundantOverrideConfig::default()
    };

    let findings = run_with(&config, &project);
    assert_eq!(names(&findings), vec!["B.m"]);
    assert_eq!(findings[0].kind, ProblemKind::EquivalentOverride);
}

#[test]
fn test_library_super_method_needs_opt_in() {
    let build = || {
        let mut builder = ProjectBuilder::new();
        builder.add_source(
            "lib/src/lib/Widget.java",
            "package lib; public class Widget { public int size() { return 4; } }",
            SourceOrigin::LibrarySource,
        );
        builder.add_source(
            "app/Button.java",
            "package app; import lib.Widget; class Button extends Widget { public int size() { return 4; } }",
            SourceOrigin::Project,
        );
        builder.build().unwrap()
    };

    let project = build();
    assert!(run_with(&Config::default(), &project).is_empty());

    let mut config = Config::default();
    config.inspections.redundant_override.check_library_methods = true;
    let findings = run_with(&config, &project);
    assert_eq!(names(&findings), vec!["app.Button.size"]);
}

#[test]
fn test_javadoc_checked_only_when_enabled() {
    let project = Project::from_sources(&[(
        "A.java",
        r#"
class A {
    /** Returns one. */
    int one() { return 1; }
}
class B extends A {
    /** Something else. */
    int one() { return 1; }
}
"#,
    )])
    .unwrap();

    assert_eq!(run_with(&Config::default(), &project).len(), 1);

    let mut config = Config::default();
    config.inspections.redundant_override.check_javadoc = true;
    assert!(run_with(&config, &project).is_empty());
}

#[test]
fn test_library_sources_are_not_inspected() {
    let mut builder = ProjectBuilder::new();
    builder.add_source(
        "lib/Lib.java",
        "package lib; public class Base { public void m() {} } class Sub extends Base { public void m() { super.m(); } }",
        SourceOrigin::LibrarySource,
    );
    let project = builder.build().unwrap();

    assert!(run_with(&Config::default(), &project).is_empty());
}

// ============================================================================
// Abstract overrides abstract
// ============================================================================

#[test]
fn test_abstract_redeclaration() {
    let findings = run(&[(
        "A.java",
        r#"
interface Source { String read() throws java.io.IOException; }
interface Buffered extends Source { String read() throws java.io.IOException; }
abstract class Reader implements Source { public abstract String read() throws java.io.IOException; }
"#,
    )]);

    assert_eq!(names(&findings), vec!["Buffered.read", "Reader.read"]);
    assert!(findings.iter().all(|f| f.kind == ProblemKind::AbstractOverridesAbstract));
}

#[test]
fn test_abstract_redeclaration_with_narrower_return_is_kept() {
    let findings = run(&[(
        "A.java",
        "interface Source { Object read(); }\ninterface Strings extends Source { String read(); }\n",
    )]);

    assert!(findings.is_empty());
}

#[test]
fn test_abstract_javadoc_presence_must_match() {
    let project = Project::from_sources(&[(
        "A.java",
        "interface Source { void close(); }\ninterface Closer extends Source { /** Releases it. */ void close(); }\n",
    )])
    .unwrap();

    // Doc comments are ignored by default
    assert_eq!(run_with(&Config::default(), &project).len(), 1);

    let mut config = Config::default();
    config.inspections.abstract_override.ignore_javadoc = false;
    assert!(run_with(&config, &project).is_empty());
}

#[test]
fn test_abstract_inspection_can_be_disabled() {
    let project = Project::from_sources(&[(
        "A.java",
        "interface Source { void close(); }\ninterface Closer extends Source { void close(); }\n",
    )])
    .unwrap();

    let mut config = Config::default();
    config.inspections.abstract_override.enabled = false;
    assert!(run_with(&config, &project).is_empty());
}
