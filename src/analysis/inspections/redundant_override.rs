//! Redundant Method Override Inspection
//!
//! Reports overrides that add nothing to the method they override. Two
//! shapes are recognized:
//!
//! ```java
//! @Override
//! public void onStart() {
//!     super.onStart();            // delegates with the same arguments
//! }
//!
//! @Override
//! int limit() {
//!     return DEFAULT_LIMIT * 2;   // same body as the inherited method
//! }
//! ```
//!
//! ## False Positive Prevention
//!
//! - The signatures must be compatible: same visibility, modifiers,
//!   annotations, return type, exceptions and varargs-ness
//! - Overrides of both a default and an abstract interface method are skipped,
//!   and so are overrides choosing between unrelated interface defaults
//! - Protected delegations that open the method to their own package are kept
//! - Comments that only the override carries are never discarded

use super::{Inspection, InspectionContext};
use crate::analysis::{
    has_mixed_default_ness, has_unrelated_defaults, DelegationDetector, Finding, FullBodyEquivalence, InspectionError, JavadocRule,
    ProblemKind, SignatureCompatibility,
};
use crate::config::RedundantOverrideConfig;
use crate::model::MethodDecl;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct RedundantMethodOverrideInspection {
    /// Compare against library super methods through attached sources
    pub check_library_methods: bool,

    /// Skip overrides that only delegate to super
    pub ignore_delegates: bool,

    pub check_javadoc: bool,
}

impl RedundantMethodOverrideInspection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RedundantOverrideConfig) -> Self {
        Self {
            check_library_methods: config.check_library_methods,
            ignore_delegates: config.ignore_delegates,
            check_javadoc: config.check_javadoc,
        }
    }

    fn javadoc_rule(&self) -> JavadocRule {
        if self.check_javadoc {
            JavadocRule::OverrideMayOmit
        } else {
            JavadocRule::Ignore
        }
    }
}

impl Inspection for RedundantMethodOverrideInspection {
    fn id(&self) -> &'static str {
        "RedundantMethodOverride"
    }

    fn display_name(&self) -> &'static str {
        "Method is identical to its super method"
    }

    fn check_method(&self, ctx: &InspectionContext, method: &MethodDecl) -> Result<Option<Finding>, InspectionError> {
        let project = ctx.project;
        if method.body.is_none() || method.is_static() {
            return Ok(None);
        }

        let supers = project.find_super_methods(method);
        if has_mixed_default_ness(project, &supers) {
            trace!("'{}' overrides both default and abstract methods", method.name);
            return Ok(None);
        }
        if has_unrelated_defaults(project, &supers) {
            trace!("'{}' resolves a conflict between interface defaults", method.name);
            return Ok(None);
        }
        let Some(super_method) = project.representative_super_method(&supers) else {
            return Ok(None);
        };

        let compatible = SignatureCompatibility::new(project)
            .with_javadoc(self.javadoc_rule())
            .check(method, super_method);
        if !compatible {
            return Ok(None);
        }

        let detector = DelegationDetector::new(project, ctx.search, ctx.mode);
        if detector.is_super_delegation(method, super_method)? {
            if self.ignore_delegates {
                return Ok(None);
            }
            return Ok(Some(Finding::new(
                project,
                ProblemKind::DelegatingOverride,
                method,
                super_method,
            )));
        }

        let equivalent = FullBodyEquivalence::new(project)
            .with_check_library(self.check_library_methods)
            .is_equivalent(method, super_method);
        Ok(equivalent.then(|| Finding::new(project, ProblemKind::EquivalentOverride, method, super_method)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{QuickFix, ReferenceSearch, SearchMode};
    use crate::model::Project;

    fn check(inspection: &RedundantMethodOverrideInspection, source: &str, owner: &str, name: &str) -> Option<Finding> {
        let project = Project::from_sources(&[("A.java", source)]).unwrap();
        let search = ReferenceSearch::new(&project);
        let ctx = InspectionContext {
            project: &project,
            search: &search,
            mode: SearchMode::Batch,
        };
        let method = project
            .type_by_fqn(owner)
            .unwrap()
            .methods
            .iter()
            .filter_map(|m| project.method(m))
            .find(|m| m.name == name)
            .unwrap();
        inspection.check_method(&ctx, method).unwrap()
    }

    #[test]
    fn test_delegating_override() {
        let source = "class A { void m(int x) {} } class B extends A { @Override void m(int x) { super.m(x); } }";
        let finding = check(&RedundantMethodOverrideInspection::new(), source, "B", "m").unwrap();

        assert_eq!(finding.kind, ProblemKind::DelegatingOverride);
        assert!(finding.delegates_to_super);
        assert_eq!(finding.fixes, vec![QuickFix::DeleteOverride]);
        assert_eq!(finding.super_owner_name, "A");
    }

    #[test]
    fn test_ignore_delegates() {
        let source = "class A { void m(int x) {} } class B extends A { void m(int x) { super.m(x); } }";
        let inspection = RedundantMethodOverrideInspection {
            ignore_delegates: true,
            ..Default::default()
        };
        assert!(check(&inspection, source, "B", "m").is_none());
    }

    #[test]
    fn test_equivalent_body() {
        let source = "class A { int limit() { return 10 * 2; } } class B extends A { int limit() { return 10 * 2; } }";
        let finding = check(&RedundantMethodOverrideInspection::new(), source, "B", "limit").unwrap();

        assert_eq!(finding.kind, ProblemKind::EquivalentOverride);
        assert!(!finding.delegates_to_super);
        assert_eq!(
            finding.fixes,
            vec![QuickFix::DeleteOverride, QuickFix::ReplaceWithSuperDelegation]
        );
    }

    #[test]
    fn test_incompatible_signature() {
        let source = "class A { void m() {} } class B extends A { synchronized void m() { super.m(); } }";
        assert!(check(&RedundantMethodOverrideInspection::new(), source, "B", "m").is_none());
    }

    #[test]
    fn test_delegation_to_object() {
        let source = "class A { public String toString() { return super.toString(); } }";
        let finding = check(&RedundantMethodOverrideInspection::new(), source, "A", "toString").unwrap();

        assert_eq!(finding.kind, ProblemKind::DelegatingOverride);
        assert_eq!(finding.super_owner_name, "java.lang.Object");
    }

    #[test]
    fn test_javadoc_on_override() {
        let source = "class A { /** Base. */ void m() {} } class B extends A { /** Mine. */ void m() { super.m(); } }";
        assert!(check(&RedundantMethodOverrideInspection::new(), source, "B", "m").is_some());

        let inspection = RedundantMethodOverrideInspection {
            check_javadoc: true,
            ..Default::default()
        };
        assert!(check(&inspection, source, "B", "m").is_none());
    }

    #[test]
    fn test_mixed_default_ness_is_skipped() {
        let source = "interface I { default void m() {} } interface J { void m(); } \
                      class C implements I, J { public void m() { I.super.m(); } }";
        assert!(check(&RedundantMethodOverrideInspection::new(), source, "C", "m").is_none());
    }

    #[test]
    fn test_unrelated_defaults_are_skipped() {
        let source = "interface I { default void m() {} } interface J { default void m() {} } \
                      class C implements I, J { public void m() { I.super.m(); } }";
        assert!(check(&RedundantMethodOverrideInspection::new(), source, "C", "m").is_none());

        // A default that overrides the other one is not a conflict
        let source = "interface I { default void m() {} } interface J extends I { default void m() {} } \
                      class C implements J { public void m() { J.super.m(); } }";
        assert!(check(&RedundantMethodOverrideInspection::new(), source, "C", "m").is_some());
    }

    #[test]
    fn test_delegation_to_native_object_methods() {
        let source = "class A { public int hashCode() { return super.hashCode(); } \
                      protected Object clone() throws CloneNotSupportedException { return super.clone(); } }";
        let inspection = RedundantMethodOverrideInspection::new();

        for name in ["hashCode", "clone"] {
            let finding = check(&inspection, source, "A", name).unwrap();
            assert_eq!(finding.kind, ProblemKind::DelegatingOverride);
            assert_eq!(finding.super_owner_name, "java.lang.Object");
        }
    }
}
