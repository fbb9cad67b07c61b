//! Signature compatibility between an override and its super method

use crate::model::{MethodDecl, Project, Substitutor};
use crate::parser::normalize_whitespace;
use std::collections::BTreeSet;

/// Keyword modifiers that must agree between an override and its super method
const COMPARED_MODIFIERS: &[&str] = &["static", "final", "synchronized", "strictfp"];

/// How doc comments take part in signature compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JavadocRule {
    /// Doc comments are not compared
    Ignore,
    /// A doc comment on the override must equal the super method's; none is fine
    OverrideMayOmit,
    /// Presence and text must both match
    PresenceMustMatch,
}

/// Decides whether an override may be treated as equivalent to its super method
pub struct SignatureCompatibility<'p> {
    project: &'p Project,
    javadoc: JavadocRule,
    ignore_annotations: bool,
}

impl<'p> SignatureCompatibility<'p> {
    pub fn new(project: &'p Project) -> Self {
        Self {
            project,
            javadoc: JavadocRule::Ignore,
            ignore_annotations: false,
        }
    }

    pub fn with_javadoc(mut self, rule: JavadocRule) -> Self {
        self.javadoc = rule;
        self
    }

    pub fn with_ignore_annotations(mut self, ignore: bool) -> Self {
        self.ignore_annotations = ignore;
        self
    }

    pub fn check(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        self.have_equivalent_modifiers(method, super_method)
            && self.methods_have_same_return_types(method, super_method)
            && self.have_same_exceptions(method, super_method)
            && method.is_varargs() == super_method.is_varargs()
            && self.javadoc_equivalent(method, super_method)
    }

    /// Same visibility and keyword modifiers (ignoring `abstract`, `default` and `native`),
    /// same annotations apart from `@Override`, same parameter annotations
    pub fn have_equivalent_modifiers(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        if self.project.visibility(method) != self.project.visibility(super_method) {
            return false;
        }

        if keyword_set(method) != keyword_set(super_method) {
            return false;
        }

        if self.ignore_annotations {
            return true;
        }

        if annotation_set(&method.annotations) != annotation_set(&super_method.annotations) {
            return false;
        }

        method.params.len() == super_method.params.len()
            && method
                .params
                .iter()
                .zip(&super_method.params)
                .all(|(p, s)| annotation_set(&p.annotations) == annotation_set(&s.annotations))
    }

    /// Exact equality, or equality after substituting the super method's type
    /// variables, as long as the override's type is not itself a type variable
    pub fn methods_have_same_return_types(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        let own = self.project.return_type(method);
        let inherited = self.project.return_type(super_method);
        if own == inherited {
            return true;
        }

        if !own.is_class_type() || !inherited.is_class_type() || own.is_type_var() {
            return false;
        }

        own == self.substitutor(method, super_method).substitute(&inherited)
    }

    /// Equal checked-exception sets
    pub fn have_same_exceptions(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        if method.throws.len() != super_method.throws.len() {
            return false;
        }

        let substitutor = self.substitutor(method, super_method);
        let own: BTreeSet<String> = self
            .project
            .thrown_types(method)
            .iter()
            .map(|t| t.erasure().to_string())
            .collect();
        let inherited: BTreeSet<String> = self
            .project
            .thrown_types(super_method)
            .iter()
            .map(|t| substitutor.substitute(t).erasure().to_string())
            .collect();

        own == inherited
    }

    pub fn javadoc_equivalent(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        let inherited = self.super_doc(super_method);
        match self.javadoc {
            JavadocRule::Ignore => true,
            JavadocRule::OverrideMayOmit => match method.doc_comment.as_deref() {
                None => true,
                Some(own) => inherited == Some(own.trim()),
            },
            JavadocRule::PresenceMustMatch => method.doc_comment.as_deref().map(str::trim) == inherited,
        }
    }

    /// Doc comment of the super method, falling back to its attached source
    fn super_doc<'a>(&'a self, super_method: &'a MethodDecl) -> Option<&'a str> {
        super_method
            .doc_comment
            .as_deref()
            .or_else(|| {
                self.project
                    .source_method(super_method)
                    .and_then(|m| m.doc_comment.as_deref())
            })
            .map(str::trim)
    }

    fn substitutor(&self, method: &MethodDecl, super_method: &MethodDecl) -> Substitutor {
        self.project
            .super_class_substitutor(&super_method.owner, &method.owner)
            .unwrap_or_default()
    }
}

/// True when the overridden set mixes a `default` interface method with an abstract one
pub fn has_mixed_default_ness(project: &Project, super_methods: &[&MethodDecl]) -> bool {
    let has_default = super_methods.iter().any(|m| m.is_default());
    let has_abstract = super_methods.iter().any(|m| project.is_abstract(m));
    has_default && has_abstract
}

/// Several unrelated interface defaults and no class method: the override
/// picks between them, so it cannot be removed
pub fn has_unrelated_defaults(project: &Project, super_methods: &[&MethodDecl]) -> bool {
    let from_class = super_methods.iter().any(|m| {
        project
            .type_decl(&m.owner)
            .map(|t| !t.is_interface())
            .unwrap_or(false)
    });
    if from_class {
        return false;
    }

    let defaults: Vec<&MethodDecl> = super_methods.iter().copied().filter(|m| m.is_default()).collect();
    defaults.iter().enumerate().any(|(i, a)| {
        defaults[i + 1..].iter().any(|b| {
            !project.is_same_or_inheritor(&a.owner, &b.owner) && !project.is_same_or_inheritor(&b.owner, &a.owner)
        })
    })
}

fn keyword_set(method: &MethodDecl) -> BTreeSet<&str> {
    method
        .modifiers
        .iter()
        .map(String::as_str)
        .filter(|m| COMPARED_MODIFIERS.contains(m))
        .collect()
}

fn annotation_set(annotations: &[String]) -> BTreeSet<String> {
    annotations
        .iter()
        .map(|a| normalize_whitespace(a))
        .filter(|a| a != "@Override" && a != "@java.lang.Override")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair<'a>(project: &'a Project, sub: &str, sup: &str, name: &str) -> (&'a MethodDecl, &'a MethodDecl) {
        let find = |owner: &str| {
            let owner = project.type_by_fqn(owner).unwrap();
            owner
                .methods
                .iter()
                .filter_map(|m| project.method(m))
                .find(|m| m.name == name)
                .unwrap()
        };
        (find(sub), find(sup))
    }

    #[test]
    fn test_identical_signatures_are_compatible() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A { public int m(int x) throws Exception { return x; } } \
             class B extends A { @Override public int m(int x) throws Exception { return x; } }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "m");

        assert!(SignatureCompatibility::new(&project).check(m, s));
    }

    #[test]
    fn test_native_super_method_is_compatible() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A { public native int m(); } class B extends A { public int m() { return super.m(); } }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "m");

        assert!(SignatureCompatibility::new(&project).have_equivalent_modifiers(m, s));
    }

    #[test]
    fn test_unrelated_defaults() {
        let project = Project::from_sources(&[(
            "A.java",
            "interface I { default void m() {} } interface J { default void m() {} } \
             interface K extends I { default void m() {} } class C implements I, J { public void m() {} }",
        )])
        .unwrap();
        let c = pair(&project, "C", "I", "m").0;
        let supers = project.find_super_methods(c);
        assert!(has_unrelated_defaults(&project, &supers));

        let (i, k) = (pair(&project, "I", "I", "m").0, pair(&project, "K", "K", "m").0);
        assert!(!has_unrelated_defaults(&project, &[k, i]));
    }

    #[test]
    fn test_widened_visibility_is_incompatible() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A { protected void m() {} } class B extends A { public void m() { super.m(); } }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "m");

        assert!(!SignatureCompatibility::new(&project).have_equivalent_modifiers(m, s));
    }

    #[test]
    fn test_interface_members_are_public() {
        let project = Project::from_sources(&[(
            "A.java",
            "interface I { void m(); } abstract class B implements I { public abstract void m(); }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "I", "m");

        assert!(SignatureCompatibility::new(&project).have_equivalent_modifiers(m, s));
    }

    #[test]
    fn test_parameter_annotations_compare_by_position() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A { void m(@Nullable String a, String b) {} } \
             class B extends A { void m(String a, @Nullable String b) {} }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "m");

        let check = SignatureCompatibility::new(&project);
        assert!(!check.have_equivalent_modifiers(m, s));
        assert!(check.with_ignore_annotations(true).have_equivalent_modifiers(m, s));
    }

    #[test]
    fn test_return_type_after_substitution() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A<T> { T get() { return null; } } class B extends A<String> { String get() { return null; } }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "get");

        assert!(SignatureCompatibility::new(&project).methods_have_same_return_types(m, s));
    }

    #[test]
    fn test_type_variable_return_is_never_substituted() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A<T> { T get() { return null; } } class B<U> extends A<U> { U get() { return null; } }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "get");

        assert!(!SignatureCompatibility::new(&project).methods_have_same_return_types(m, s));
    }

    #[test]
    fn test_exception_sets_are_unordered() {
        let project = Project::from_sources(&[(
            "A.java",
            "import java.io.IOException; \
             class A { void m() throws IOException, InterruptedException {} } \
             class B extends A { void m() throws InterruptedException, IOException {} }",
        )])
        .unwrap();
        let (m, s) = pair(&project, "B", "A", "m");

        assert!(SignatureCompatibility::new(&project).have_same_exceptions(m, s));
    }

    #[test]
    fn test_javadoc_rules() {
        let project = Project::from_sources(&[(
            "A.java",
            "abstract class A { /** Runs. */ abstract void run(); /** Stops. */ abstract void stop(); } \
             abstract class B extends A { abstract void run(); /** Other. */ abstract void stop(); }",
        )])
        .unwrap();
        let (run, super_run) = pair(&project, "B", "A", "run");
        let (stop, super_stop) = pair(&project, "B", "A", "stop");

        let may_omit = SignatureCompatibility::new(&project).with_javadoc(JavadocRule::OverrideMayOmit);
        assert!(may_omit.javadoc_equivalent(run, super_run));
        assert!(!may_omit.javadoc_equivalent(stop, super_stop));

        let must_match = SignatureCompatibility::new(&project).with_javadoc(JavadocRule::PresenceMustMatch);
        assert!(!must_match.javadoc_equivalent(run, super_run));
    }

    #[test]
    fn test_mixed_default_ness() {
        let project = Project::from_sources(&[(
            "A.java",
            "interface I { default void m() {} } interface J { void m(); } \
             class C implements I, J { public void m() { I.super.m(); } }",
        )])
        .unwrap();
        let c = project.type_by_fqn("C").unwrap();
        let m = project.method(&c.methods[0]).unwrap();
        let supers = project.find_super_methods(m);

        assert_eq!(supers.len(), 2);
        assert!(has_mixed_default_ness(&project, &supers));
    }
}
