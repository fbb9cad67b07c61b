//! Behavioral properties of the override checks
//!
//! Each test pins one property of delegation detection, full-body
//! equivalence or signature compatibility across several inputs.

use redundantoverride::analysis::{
    DelegationDetector, FullBodyEquivalence, ReferenceSearch, SearchMode, SignatureCompatibility,
};
use redundantoverride::model::MethodDecl;
use redundantoverride::{Inspector, Project, QuickFix};

fn project(sources: &[(&str, &str)]) -> Project {
    Project::from_sources(sources).unwrap()
}

fn method<'p>(project: &'p Project, owner: &str, name: &str) -> &'p MethodDecl {
    let decl = project.type_by_fqn(owner).unwrap();
    decl.methods
        .iter()
        .filter_map(|id| project.method(id))
        .find(|m| m.name == name)
        .unwrap()
}

fn super_of<'p>(project: &'p Project, method: &MethodDecl) -> &'p MethodDecl {
    let supers = project.find_super_methods(method);
    project.representative_super_method(&supers).unwrap()
}

fn delegates(sources: &[(&str, &str)], owner: &str, name: &str, mode: SearchMode) -> bool {
    let project = project(sources);
    let m = method(&project, owner, name);
    let s = super_of(&project, m);
    let search = ReferenceSearch::new(&project);
    DelegationDetector::new(&project, &search, mode)
        .is_super_delegation(m, s)
        .unwrap()
}

fn equivalent(source: &str, owner: &str, name: &str) -> bool {
    let project = project(&[("A.java", source)]);
    let m = method(&project, owner, name);
    let s = super_of(&project, m);
    FullBodyEquivalence::new(&project).is_equivalent(m, s)
}

#[test]
fn identical_argument_delegation_is_detected() {
    let cases = [
        "class A { int m(int a, int b) { return a + b; } } class B extends A { int m(int a, int b) { return super.m(a, b); } }",
        "class A { void m(int a, int b) {} } class B extends A { void m(int a, int b) { super.m(a, b); } }",
        "class A { String m(String a, Object b) { return a; } } class B extends A { String m(String a, Object b) { return super.m((a), b); } }",
        "class A { void m() {} } class B extends A { void m() { super.m(); } }",
    ];

    for source in cases {
        assert!(delegates(&[("A.java", source)], "B", "m", SearchMode::Batch), "{}", source);
        assert!(delegates(&[("A.java", source)], "B", "m", SearchMode::OnTheFly), "{}", source);
    }
}

#[test]
fn substituted_argument_is_not_delegation() {
    let cases = [
        ("class A { void foo(int x) {} } class B extends A { void foo(int x) { super.foo(42); } }", "foo"),
        ("class A { int m(int a, int b) { return a; } } class B extends A { int m(int a, int b) { return super.m(a, 0); } }", "m"),
        ("class A { int m(int a, int b) { return a; } } class B extends A { int m(int a, int b) { return super.m(a, b + 1); } }", "m"),
        ("class A { int m(int a, int b) { return a; } } class B extends A { int m(int a, int b) { return super.m(a, a); } }", "m"),
    ];

    for (source, name) in cases {
        assert!(!delegates(&[("A.java", source)], "B", name, SearchMode::Batch), "{}", source);
    }
}

#[test]
fn structurally_identical_bodies_are_equivalent() {
    let cases = [
        // Renamed parameters and locals
        "class A { int m(int a) { int t = a * 2; return t + 1; } } class B extends A { int m(int x) { int u = x * 2; return u + 1; } }",
        // Explicit this of either class
        "class A { int f; int m() { return this.f; } } class B extends A { int m() { return this.f; } }",
        // Comments of the override are a subset of the inherited ones
        "class A { void m() { // one\n // two\n run(); } void run() {} } class B extends A { void m() { // one\n run(); } }",
        // Recursion maps onto the super method
        "class A { int m(int n) { return n <= 0 ? 0 : m(n - 1); } } class B extends A { int m(int k) { return k <= 0 ? 0 : m(k - 1); } }",
    ];

    for source in cases {
        assert!(equivalent(source, "B", "m"), "{}", source);
    }
}

#[test]
fn extra_comment_or_changed_token_breaks_equivalence() {
    let cases = [
        "class A { void m() { run(); } void run() {} } class B extends A { void m() { // mine\n run(); } }",
        "class A { int m(int a) { return a + 1; } } class B extends A { int m(int a) { return a + 2; } }",
        "class A { int m(int a, int b) { return a - b; } } class B extends A { int m(int a, int b) { return b - a; } }",
    ];

    for source in cases {
        assert!(!equivalent(source, "B", "m"), "{}", source);
    }
}

#[test]
fn type_variable_return_never_matches_concrete() {
    let generic = project(&[(
        "A.java",
        "class A<T> { T get() { return null; } } class B<U> extends A<U> { U get() { return null; } }",
    )]);
    let m = method(&generic, "B", "get");
    let s = super_of(&generic, m);
    assert!(!SignatureCompatibility::new(&generic).methods_have_same_return_types(m, s));

    let concrete = project(&[(
        "A.java",
        "class A<T> { T get() { return null; } } class B extends A<String> { String get() { return null; } }",
    )]);
    let m = method(&concrete, "B", "get");
    let s = super_of(&concrete, m);
    assert!(SignatureCompatibility::new(&concrete).methods_have_same_return_types(m, s));
}

#[test]
fn protected_override_used_from_package_is_kept() {
    let sources = [
        ("a/A.java", "package a; public class A { protected void m() {} }"),
        ("b/B.java", "package b; public class B extends a.A { protected void m() { super.m(); } }"),
        ("b/User.java", "package b; class User { void go(B b) { b.m(); } }"),
    ];

    assert!(!delegates(&sources, "b.B", "m", SearchMode::Batch));
    assert!(!delegates(&sources, "b.B", "m", SearchMode::OnTheFly));
}

#[test]
fn repeated_runs_agree() {
    let project = project(&[(
        "A.java",
        "class A { int m(int a) { return a; } void n() {} }\nclass B extends A { int m(int a) { return a; } void n() { super.n(); } }\n",
    )]);

    let inspector = Inspector::default();
    let first = inspector.run(&project).findings;
    let second = inspector.run(&project).findings;
    let parallel = Inspector::default().with_parallel(true).run(&project).findings;

    assert_eq!(first.len(), 2);
    assert_eq!(first, second);
    assert_eq!(first, parallel);
}

#[test]
fn object_delegation_is_reported_and_deleted() {
    let source = "class A { public String toString() { return super.toString(); } }";
    let project = project(&[("A.java", source)]);

    let findings = Inspector::default().run(&project).findings;
    assert_eq!(findings.len(), 1);
    assert!(findings[0].delegates_to_super);
    assert_eq!(findings[0].super_owner_name, "java.lang.Object");

    let edits = QuickFix::DeleteOverride.edits(&project, &findings[0]).unwrap();
    let fixed = redundantoverride::refactor::apply_edits(source, &edits).unwrap();
    assert_eq!(fixed, "class A {}");
}
