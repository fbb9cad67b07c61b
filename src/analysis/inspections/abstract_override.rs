//! Abstract Method Overrides Abstract Method Inspection
//!
//! Reports abstract redeclarations that repeat an inherited abstract method
//! without changing anything:
//!
//! ```java
//! interface Source { Item next(); }
//!
//! abstract class BufferedSource implements Source {
//!     public abstract Item next();   // adds nothing
//! }
//! ```
//!
//! Unlike the redundant override check, a doc comment present on only one
//! side counts as a difference, unless doc comments are ignored altogether.

use super::{Inspection, InspectionContext};
use crate::analysis::{Finding, InspectionError, JavadocRule, ProblemKind, SignatureCompatibility};
use crate::config::AbstractOverrideConfig;
use crate::model::MethodDecl;

#[derive(Debug, Clone)]
pub struct AbstractMethodOverridesAbstractMethodInspection {
    pub ignore_javadoc: bool,
    pub ignore_annotations: bool,
}

impl AbstractMethodOverridesAbstractMethodInspection {
    pub fn new() -> Self {
        Self {
            ignore_javadoc: true,
            ignore_annotations: false,
        }
    }

    pub fn from_config(config: &AbstractOverrideConfig) -> Self {
        Self {
            ignore_javadoc: config.ignore_javadoc,
            ignore_annotations: config.ignore_annotations,
        }
    }
}

impl Default for AbstractMethodOverridesAbstractMethodInspection {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspection for AbstractMethodOverridesAbstractMethodInspection {
    fn id(&self) -> &'static str {
        "AbstractMethodOverridesAbstractMethod"
    }

    fn display_name(&self) -> &'static str {
        "Abstract method overrides abstract method"
    }

    fn check_method(&self, ctx: &InspectionContext, method: &MethodDecl) -> Result<Option<Finding>, InspectionError> {
        let project = ctx.project;
        if !project.is_abstract(method) {
            return Ok(None);
        }

        let supers = project.find_super_methods(method);
        if supers.is_empty() || !supers.iter().all(|s| project.is_abstract(s)) {
            return Ok(None);
        }
        let Some(super_method) = project.representative_super_method(&supers) else {
            return Ok(None);
        };

        let javadoc = if self.ignore_javadoc {
            JavadocRule::Ignore
        } else {
            JavadocRule::PresenceMustMatch
        };
        let compatible = SignatureCompatibility::new(project)
            .with_javadoc(javadoc)
            .with_ignore_annotations(self.ignore_annotations)
            .check(method, super_method);

        Ok(compatible.then(|| Finding::new(project, ProblemKind::AbstractOverridesAbstract, method, super_method)))
    }
}
