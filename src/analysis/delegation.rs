//! Delegating-call detection
//!
//! Recognizes overrides whose whole body forwards to the super method with
//! the override's own parameters:
//!
//! ```java
//! @Override
//! public String describe(Locale locale) {
//!     return super.describe(locale);
//! }
//! ```
//!
//! Passing anything other than the parameters, in order, is a behavior
//! change (`super.foo(42)` pins an argument) and is not reported.

use super::search::{ReferenceSearch, SearchCost, SearchMode};
use super::InspectionError;
use crate::model::{MethodDecl, Project, Resolver, Symbol, Visibility};
use crate::parser::{code_children, descendants, is_comment, is_doc_comment, strip_parens};
use tracing::trace;
use tree_sitter::Node;

pub struct DelegationDetector<'a, 'p> {
    project: &'p Project,
    resolver: Resolver<'p>,
    search: &'a ReferenceSearch<'p>,
    mode: SearchMode,
}

impl<'a, 'p> DelegationDetector<'a, 'p> {
    pub fn new(project: &'p Project, search: &'a ReferenceSearch<'p>, mode: SearchMode) -> Self {
        Self {
            project,
            resolver: Resolver::new(project),
            search,
            mode,
        }
    }

    /// Whether `method`'s body is exactly a super call to `super_method` with its own parameters
    pub fn is_super_delegation(&self, method: &MethodDecl, super_method: &MethodDecl) -> Result<bool, InspectionError> {
        let Some(call) = self.single_call(method) else {
            return Ok(false);
        };

        if !self.calls_super_method(method, super_method, call) {
            return Ok(false);
        }

        if self.has_comments(method) {
            return Ok(false);
        }

        if !self.passes_own_parameters(method, call) {
            return Ok(false);
        }

        if self.project.visibility(super_method) == Visibility::Protected {
            return self.is_reachable_only_from_owner(method);
        }

        Ok(true)
    }

    /// The call making up the body's only statement
    fn single_call(&self, method: &MethodDecl) -> Option<Node<'p>> {
        let body = self.project.body_node(method)?;
        let statements = code_children(body);
        let [statement] = statements.as_slice() else {
            return None;
        };

        let expected = if method.returns_void() {
            "expression_statement"
        } else {
            "return_statement"
        };
        if statement.kind() != expected {
            return None;
        }

        let expression = code_children(*statement).into_iter().next()?;
        let call = strip_parens(expression);
        (call.kind() == "method_invocation").then_some(call)
    }

    /// `super.name(...)` or `Iface.super.name(...)` resolving to the super method
    fn calls_super_method(&self, method: &MethodDecl, super_method: &MethodDecl, call: Node) -> bool {
        let file = method.id.file;
        let Some(object) = call.child_by_field_name("object") else {
            return false;
        };
        let mut cursor = call.walk();
        let through_super = object.kind() == "super" || call.children(&mut cursor).any(|c| c.kind() == "super");
        if !through_super {
            return false;
        }

        let Some(source) = self.project.file(file) else {
            return false;
        };
        let name_matches = call
            .child_by_field_name("name")
            .map(|n| crate::parser::node_text(n, &source.source) == method.name)
            .unwrap_or(false);
        if !name_matches {
            return false;
        }

        match self.resolver.resolve_call(file, call) {
            Symbol::Method(target) => {
                target == super_method.id
                    || self.project.navigation_element(&target) == self.project.navigation_element(&super_method.id)
            }
            _ => false,
        }
    }

    /// Any non-doc comment inside the method declaration
    fn has_comments(&self, method: &MethodDecl) -> bool {
        let Some(node) = self.project.method_node(method) else {
            return true;
        };
        let Some(source) = self.project.file(method.id.file) else {
            return true;
        };
        descendants(node).any(|n| is_comment(n) && !is_doc_comment(n, &source.source))
    }

    fn passes_own_parameters(&self, method: &MethodDecl, call: Node) -> bool {
        let args = call
            .child_by_field_name("arguments")
            .map(code_children)
            .unwrap_or_default();
        if args.len() != method.params.len() {
            return false;
        }

        args.iter().enumerate().all(|(index, arg)| {
            let arg = strip_parens(*arg);
            arg.kind() == "identifier"
                && self.resolver.resolve_identifier(method.id.file, arg)
                    == Symbol::Parameter {
                        method: method.id,
                        index,
                    }
        })
    }

    /// A protected override may exist to open the method to its own package;
    /// it is only redundant when nothing outside its class refers to it
    fn is_reachable_only_from_owner(&self, method: &MethodDecl) -> Result<bool, InspectionError> {
        if self.mode == SearchMode::OnTheFly {
            match self.search.search_cost(&method.name, &method.owner)? {
                SearchCost::ZeroOccurrences => return Ok(true),
                SearchCost::TooManyOccurrences => return Ok(false),
                SearchCost::FewOccurrences => {}
            }
        }

        let references = self.search.find_references(method)?;
        let outside = references.iter().filter(|r| !r.is_inside(&method.owner)).count();
        trace!("{} references to '{}' outside its class", outside, method.name);
        Ok(outside == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(sources: &[(&str, &str)], owner: &str, name: &str, mode: SearchMode) -> bool {
        let project = Project::from_sources(sources).unwrap();
        let decl = project.type_by_fqn(owner).unwrap();
        let method = decl
            .methods
            .iter()
            .filter_map(|m| project.method(m))
            .find(|m| m.name == name)
            .unwrap();
        let supers = project.find_super_methods(method);
        let super_method = project.representative_super_method(&supers).unwrap();

        let search = ReferenceSearch::new(&project);
        DelegationDetector::new(&project, &search, mode)
            .is_super_delegation(method, super_method)
            .unwrap()
    }

    #[test]
    fn test_void_delegation() {
        let source = "class A { void m(int a, int b) {} } class B extends A { void m(int a, int b) { super.m(a, b); } }";
        assert!(detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_return_delegation_with_parentheses() {
        let source = "class A { int m(int a) { return a; } } class B extends A { int m(int a) { return (super.m((a))); } }";
        assert!(detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_literal_argument_is_not_delegation() {
        let source = "class A { void foo(int x) {} } class B extends A { void foo(int x) { super.foo(42); } }";
        assert!(!detect(&[("A.java", source)], "B", "foo", SearchMode::Batch));
    }

    #[test]
    fn test_reordered_arguments_are_not_delegation() {
        let source = "class A { void m(int a, int b) {} } class B extends A { void m(int a, int b) { super.m(b, a); } }";
        assert!(!detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_self_call_is_not_delegation() {
        let source = "class A { void m() {} } class B extends A { void m() { this.m(); } }";
        assert!(!detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_comment_disqualifies() {
        let source = "class A { void m() {} } class B extends A { void m() { // keep\n super.m(); } }";
        assert!(!detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_doc_comment_is_allowed() {
        let source = "class A { void m() {} } class B extends A { /** Docs. */ void m() { super.m(); } }";
        assert!(detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_extra_statement_disqualifies() {
        let source = "class A { void m() {} } class B extends A { void m() { super.m(); super.m(); } }";
        assert!(!detect(&[("A.java", source)], "B", "m", SearchMode::Batch));
    }

    #[test]
    fn test_interface_super_delegation() {
        let source = "interface I { default void m() {} } class C implements I { public void m() { I.super.m(); } }";
        assert!(detect(&[("A.java", source)], "C", "m", SearchMode::Batch));
    }

    #[test]
    fn test_protected_with_outside_reference() {
        let sources = [
            ("a/A.java", "package a; public class A { protected void m() {} }"),
            ("b/B.java", "package b; public class B extends a.A { protected void m() { super.m(); } }"),
            ("b/C.java", "package b; class C { void run(B b) { b.m(); } }"),
        ];
        assert!(!detect(&sources, "b.B", "m", SearchMode::Batch));
        assert!(!detect(&sources, "b.B", "m", SearchMode::OnTheFly));
    }

    #[test]
    fn test_protected_without_outside_reference() {
        let sources = [
            ("a/A.java", "package a; public class A { protected void m() {} }"),
            ("b/B.java", "package b; public class B extends a.A { protected void m() { super.m(); } void go() { m(); } }"),
        ];
        assert!(detect(&sources, "b.B", "m", SearchMode::Batch));
        assert!(detect(&sources, "b.B", "m", SearchMode::OnTheFly));
    }

    #[test]
    fn test_too_many_occurrences_is_not_safe_on_the_fly() {
        let project = Project::from_sources(&[
            ("a/A.java", "package a; public class A { protected void m() {} }"),
            ("b/B.java", "package b; public class B extends a.A { protected void m() { super.m(); } void go() { m(); } }"),
        ])
        .unwrap();
        let method = project
            .type_by_fqn("b.B")
            .unwrap()
            .methods
            .iter()
            .filter_map(|m| project.method(m))
            .find(|m| m.name == "m")
            .unwrap();
        let supers = project.find_super_methods(method);
        let super_method = project.representative_super_method(&supers).unwrap();

        // The declaration in A is the one occurrence outside B
        let search = ReferenceSearch::new(&project).with_few_occurrences_limit(0);
        assert_eq!(
            search.search_cost("m", &method.owner).unwrap(),
            SearchCost::TooManyOccurrences
        );

        let on_the_fly = DelegationDetector::new(&project, &search, SearchMode::OnTheFly);
        assert!(!on_the_fly.is_super_delegation(method, super_method).unwrap());

        let batch = DelegationDetector::new(&project, &search, SearchMode::Batch);
        assert!(batch.is_super_delegation(method, super_method).unwrap());
    }
}
