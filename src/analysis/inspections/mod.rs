// Inspections over override declarations, and the inspector that runs them

mod abstract_override;
mod redundant_override;

pub use abstract_override::AbstractMethodOverridesAbstractMethodInspection;
pub use redundant_override::RedundantMethodOverrideInspection;

use super::search::{ReferenceSearch, SearchMode};
use super::{Finding, InspectionError};
use crate::config::{Config, SearchConfig};
use crate::model::{MethodDecl, Project};
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Read-only handles shared by every check of one run
pub struct InspectionContext<'a, 'p> {
    pub project: &'p Project,
    pub search: &'a ReferenceSearch<'p>,
    pub mode: SearchMode,
}

/// A per-method check
pub trait Inspection: Send + Sync {
    /// Stable identifier, also used as the rule id in reports
    fn id(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    /// Check one method; `Ok(None)` means nothing to report
    fn check_method(&self, ctx: &InspectionContext, method: &MethodDecl) -> Result<Option<Finding>, InspectionError>;
}

/// Outcome of running the inspector over a project
#[derive(Debug, Default)]
pub struct InspectionRun {
    /// Findings sorted by file and line
    pub findings: Vec<Finding>,

    pub methods_checked: usize,

    /// Method checks abandoned because the search was cancelled
    pub cancelled: usize,
}

/// Runs a set of inspections over every project method
pub struct Inspector {
    inspections: Vec<Box<dyn Inspection>>,
    search: SearchConfig,
    parallel: bool,
}

impl Inspector {
    pub fn new() -> Self {
        Self {
            inspections: Vec::new(),
            search: SearchConfig::default(),
            parallel: false,
        }
    }

    /// Inspector with every inspection the config enables
    pub fn from_config(config: &Config) -> Self {
        let mut inspector = Self::new()
            .with_search(config.search.clone())
            .with_parallel(config.parallel);

        if config.inspections.redundant_override.enabled {
            inspector = inspector.with_inspection(Box::new(RedundantMethodOverrideInspection::from_config(
                &config.inspections.redundant_override,
            )));
        }
        if config.inspections.abstract_override.enabled {
            inspector = inspector.with_inspection(Box::new(AbstractMethodOverridesAbstractMethodInspection::from_config(
                &config.inspections.abstract_override,
            )));
        }

        inspector
    }

    pub fn with_inspection(mut self, inspection: Box<dyn Inspection>) -> Self {
        self.inspections.push(inspection);
        self
    }

    pub fn with_search(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn inspections(&self) -> &[Box<dyn Inspection>] {
        &self.inspections
    }

    pub fn run(&self, project: &Project) -> InspectionRun {
        let search = ReferenceSearch::new(project)
            .with_few_occurrences_limit(self.search.few_occurrences_limit)
            .with_max_scanned_files(self.search.max_scanned_files);
        let ctx = InspectionContext {
            project,
            search: &search,
            mode: self.search.mode,
        };

        let methods: Vec<&MethodDecl> = project.project_methods().collect();
        info!(
            "Running {} inspection(s) over {} methods...",
            self.inspections.len(),
            methods.len()
        );

        let outcomes: Vec<MethodOutcome> = if self.parallel {
            methods.par_iter().map(|m| self.check(&ctx, m)).collect()
        } else {
            methods.iter().map(|m| self.check(&ctx, m)).collect()
        };

        let mut run = InspectionRun {
            methods_checked: methods.len(),
            ..InspectionRun::default()
        };
        for outcome in outcomes {
            run.findings.extend(outcome.findings);
            run.cancelled += outcome.cancelled;
        }

        run.findings.sort_by(|a, b| {
            a.location
                .file
                .cmp(&b.location.file)
                .then(a.location.line.cmp(&b.location.line))
                .then(a.location.column.cmp(&b.location.column))
                .then(a.kind.cmp(&b.kind))
        });

        debug!("{} findings, {} cancelled checks", run.findings.len(), run.cancelled);
        run
    }

    fn check(&self, ctx: &InspectionContext, method: &MethodDecl) -> MethodOutcome {
        let mut outcome = MethodOutcome::default();
        for inspection in &self.inspections {
            match inspection.check_method(ctx, method) {
                Ok(Some(finding)) => outcome.findings.push(finding),
                Ok(None) => {}
                Err(e) => {
                    warn!("{} skipped '{}': {}", inspection.id(), method.name, e);
                    outcome.cancelled += 1;
                }
            }
        }
        outcome
    }
}

impl Default for Inspector {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Default)]
struct MethodOutcome {
    findings: Vec<Finding>,
    cancelled: usize,
}
