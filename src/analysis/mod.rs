// Analysis module: findings, the inspection trait and the inspector that drives it

pub mod delegation;
pub mod equivalence;
pub mod inspections;
pub mod search;
pub mod signature;

pub use delegation::DelegationDetector;
pub use equivalence::{
    comments_superset, EquivalenceRules, FullBodyEquivalence, ImplicitMember, MemberKind, NodeClass,
    OverrideEquivalence, StructuralRules, TreeEquivalence,
};
pub use inspections::{
    AbstractMethodOverridesAbstractMethodInspection, Inspection, InspectionContext, InspectionRun, Inspector,
    RedundantMethodOverrideInspection,
};
pub use search::{Reference, ReferenceSearch, SearchCost, SearchMode};
pub use signature::{has_mixed_default_ness, has_unrelated_defaults, JavadocRule, SignatureCompatibility};

use crate::model::{DeclarationId, Location, MethodDecl, Project};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that escape a single method check
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InspectionError {
    /// The reference index is unavailable or the run was cancelled
    #[error("reference search was cancelled")]
    Cancelled,
}

/// Kinds of problems the inspections report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemKind {
    /// Override whose body only forwards to the super method
    DelegatingOverride,

    /// Override whose body is equivalent to the inherited body
    EquivalentOverride,

    /// Abstract method redeclaring an abstract super method
    AbstractOverridesAbstract,
}

impl ProblemKind {
    pub fn code(&self) -> &'static str {
        match self {
            ProblemKind::DelegatingOverride => "RO001",
            ProblemKind::EquivalentOverride => "RO002",
            ProblemKind::AbstractOverridesAbstract => "RO003",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProblemKind::DelegatingOverride => "delegating-override",
            ProblemKind::EquivalentOverride => "redundant-override",
            ProblemKind::AbstractOverridesAbstract => "abstract-overrides-abstract",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProblemKind::DelegatingOverride => "Method override only calls its super method with the same arguments",
            ProblemKind::EquivalentOverride => "Method override has the same body as the inherited method",
            ProblemKind::AbstractOverridesAbstract => "Abstract method redeclares an abstract super method unchanged",
        }
    }

    pub fn default_severity(&self) -> Severity {
        match self {
            ProblemKind::DelegatingOverride => Severity::Warning,
            ProblemKind::EquivalentOverride => Severity::Warning,
            ProblemKind::AbstractOverridesAbstract => Severity::Info,
        }
    }

    pub fn default_message(&self, method: &str, super_owner: &str) -> String {
        match self {
            ProblemKind::DelegatingOverride => {
                format!("Method '{}' only delegates to its super method in '{}'", method, super_owner)
            }
            ProblemKind::EquivalentOverride => {
                format!("Method '{}' is identical to its super method in '{}'", method, super_owner)
            }
            ProblemKind::AbstractOverridesAbstract => {
                format!("Abstract method '{}' redeclares the abstract method in '{}'", method, super_owner)
            }
        }
    }

    pub fn delegates_to_super(&self) -> bool {
        matches!(self, ProblemKind::DelegatingOverride)
    }
}

impl std::fmt::Display for ProblemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Severity levels for findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Corrective actions offered with a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickFix {
    /// Remove the overriding method
    DeleteOverride,

    /// Keep the method, but make its body an explicit `super` call
    ReplaceWithSuperDelegation,
}

impl QuickFix {
    pub fn description(&self) -> &'static str {
        match self {
            QuickFix::DeleteOverride => "Delete the override",
            QuickFix::ReplaceWithSuperDelegation => "Replace the body with a super call",
        }
    }
}

/// A reported problem, attached to the method's name identifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub kind: ProblemKind,

    /// The overriding method
    pub method: DeclarationId,

    /// The representative super method it was compared with
    pub super_method: DeclarationId,

    pub method_name: String,

    /// Fully qualified name of the class declaring the method
    pub owner_name: String,

    /// Fully qualified name of the class declaring the super method
    pub super_owner_name: String,

    pub location: Location,

    pub severity: Severity,

    pub message: String,

    pub delegates_to_super: bool,

    pub fixes: Vec<QuickFix>,
}

impl Finding {
    pub fn new(project: &Project, kind: ProblemKind, method: &MethodDecl, super_method: &MethodDecl) -> Self {
        let owner_name = type_name(project, &method.owner);
        let super_owner_name = type_name(project, &super_method.owner);
        let fixes = match kind {
            ProblemKind::EquivalentOverride => vec![QuickFix::DeleteOverride, QuickFix::ReplaceWithSuperDelegation],
            _ => vec![QuickFix::DeleteOverride],
        };

        Self {
            kind,
            method: method.id,
            super_method: super_method.id,
            method_name: method.name.clone(),
            message: kind.default_message(&method.name, &super_owner_name),
            owner_name,
            super_owner_name,
            location: method.name_location.clone(),
            severity: kind.default_severity(),
            delegates_to_super: kind.delegates_to_super(),
            fixes,
        }
    }

    pub fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

fn type_name(project: &Project, id: &DeclarationId) -> String {
    project
        .type_decl(id)
        .map(|t| t.fully_qualified_name.clone())
        .unwrap_or_else(|| "<unknown>".to_string())
}
