//! Reference search over project sources
//!
//! Two strategies back the reachability check of protected delegations: a
//! cheap word-occurrence probe, and an exhaustive scan that resolves every
//! candidate call site.

use super::InspectionError;
use crate::model::{DeclarationId, FileId, MethodDecl, Project, Resolver, SourceOrigin, Symbol};
use crate::parser::{code_children, descendants, node_text};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use tracing::trace;
use tree_sitter::Node;

/// How checks that need reference search are run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Background-style checking: a cheap probe first, full scan only when needed
    OnTheFly,
    /// Whole-project runs: always the exhaustive scan
    #[default]
    Batch,
}

/// Estimated cost of searching for a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCost {
    ZeroOccurrences,
    FewOccurrences,
    TooManyOccurrences,
}

/// A place in project sources that refers to a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub file: FileId,
    /// Range of the referring name
    pub range: Range<usize>,
    /// False when the receiver could not be resolved and the match is by name only
    pub resolved: bool,
}

impl Reference {
    /// Whether the reference lies inside the given declaration's range
    pub fn is_inside(&self, decl: &DeclarationId) -> bool {
        self.file == decl.file && decl.start <= self.range.start && self.range.end <= decl.end
    }
}

pub struct ReferenceSearch<'p> {
    project: &'p Project,
    resolver: Resolver<'p>,
    few_occurrences_limit: usize,
    max_scanned_files: usize,
}

impl<'p> ReferenceSearch<'p> {
    pub fn new(project: &'p Project) -> Self {
        Self {
            project,
            resolver: Resolver::new(project),
            few_occurrences_limit: 10,
            max_scanned_files: 5000,
        }
    }

    pub fn with_few_occurrences_limit(mut self, limit: usize) -> Self {
        self.few_occurrences_limit = limit;
        self
    }

    pub fn with_max_scanned_files(mut self, max: usize) -> Self {
        self.max_scanned_files = max;
        self
    }

    fn check_cancelled(&self) -> Result<(), InspectionError> {
        if self.project.cancellation().is_cancelled() {
            return Err(InspectionError::Cancelled);
        }
        Ok(())
    }

    /// Count whole-word occurrences of `name` in project files, ignoring `excluded`
    pub fn search_cost(&self, name: &str, excluded: &DeclarationId) -> Result<SearchCost, InspectionError> {
        let pattern = format!(r"\b{}\b", regex::escape(name));
        let Ok(word) = Regex::new(&pattern) else {
            return Ok(SearchCost::TooManyOccurrences);
        };

        let mut occurrences = 0;
        let mut scanned = 0;

        for unit in self.project.files().iter().filter(|f| f.origin == SourceOrigin::Project) {
            self.check_cancelled()?;

            scanned += 1;
            if scanned > self.max_scanned_files {
                return Ok(SearchCost::TooManyOccurrences);
            }

            for m in word.find_iter(&unit.source) {
                let inside_excluded = unit.id == excluded.file && excluded.start <= m.start() && m.end() <= excluded.end;
                if inside_excluded {
                    continue;
                }
                occurrences += 1;
                if occurrences > self.few_occurrences_limit {
                    return Ok(SearchCost::TooManyOccurrences);
                }
            }
        }

        trace!("{} occurrences of '{}' outside {}", occurrences, name, excluded);
        Ok(if occurrences == 0 {
            SearchCost::ZeroOccurrences
        } else {
            SearchCost::FewOccurrences
        })
    }

    /// Every call site or method reference in project sources that may refer to `method`
    pub fn find_references(&self, method: &MethodDecl) -> Result<Vec<Reference>, InspectionError> {
        let mut references = Vec::new();

        for unit in self.project.files().iter().filter(|f| f.origin == SourceOrigin::Project) {
            self.check_cancelled()?;

            if !unit.source.contains(method.name.as_str()) {
                continue;
            }

            for node in descendants(unit.tree.root_node()) {
                let reference = match node.kind() {
                    "method_invocation" => self.invocation_reference(unit.id, node, &unit.source, method),
                    "method_reference" => self.method_reference(unit.id, node, &unit.source, method),
                    _ => None,
                };
                references.extend(reference);
            }
        }

        Ok(references)
    }

    fn invocation_reference(&self, file: FileId, call: Node, source: &str, method: &MethodDecl) -> Option<Reference> {
        let name = call.child_by_field_name("name")?;
        if node_text(name, source) != method.name {
            return None;
        }

        let arity = call
            .child_by_field_name("arguments")
            .map(|a| code_children(a).len())
            .unwrap_or(0);
        let arity_matches = if method.is_varargs() {
            arity + 1 >= method.params.len()
        } else {
            arity == method.params.len()
        };
        if !arity_matches {
            return None;
        }

        let range = name.start_byte()..name.end_byte();
        match self.resolver.resolve_call(file, call) {
            Symbol::Method(id) if id == method.id => Some(Reference { file, range, resolved: true }),
            Symbol::Method(_) => None,
            // Unknown receiver: count it
            _ => Some(Reference { file, range, resolved: false }),
        }
    }

    fn method_reference(&self, file: FileId, node: Node, source: &str, method: &MethodDecl) -> Option<Reference> {
        let children = code_children(node);
        let name = children.iter().rev().find(|c| c.kind() == "identifier")?;
        if node_text(*name, source) != method.name {
            return None;
        }
        let receiver = children.first()?;
        let range = name.start_byte()..name.end_byte();

        let receiver_type = match receiver.kind() {
            "this" => self.resolver.enclosing_type(file, node),
            "super" => self
                .resolver
                .enclosing_type(file, node)
                .and_then(|t| self.project.hierarchy().super_class(&t))
                .and_then(|s| s.decl),
            _ => self
                .resolver
                .static_type(file, *receiver)
                .and_then(|t| t.fqn().and_then(|fqn| self.project.type_by_fqn(fqn)).map(|d| d.id)),
        };

        match receiver_type {
            Some(ty) => self
                .project
                .find_methods(&ty, &method.name, method.params.len())
                .iter()
                .any(|m| m.id == method.id)
                .then_some(Reference { file, range, resolved: true }),
            None => Some(Reference { file, range, resolved: false }),
        }
    }
}
