// Project builder: parses sources (optionally in parallel) and assembles the context

use super::library::builtin_units;
use super::{FieldDecl, FileId, MethodDecl, Project, SourceOrigin, SourceUnit, TypeDecl};
use crate::discovery::SourceFile;
use crate::parser::{JavaParser, Parser as SourceParser};
use indicatif::{ProgressBar, ProgressStyle};
use miette::Result;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tree_sitter::Tree;

struct PendingSource {
    path: PathBuf,
    contents: String,
    origin: SourceOrigin,
}

struct ParsedSource {
    pending: PendingSource,
    tree: Tree,
}

/// Collects source units and builds an immutable [`Project`]
pub struct ProjectBuilder {
    sources: Vec<PendingSource>,
    parallel: bool,
    show_progress: bool,
}

impl ProjectBuilder {
    /// A builder pre-loaded with the built-in JDK stubs
    pub fn new() -> Self {
        let mut builder = Self::without_builtins();
        for (path, contents) in builtin_units() {
            builder.add_source(path, contents, SourceOrigin::Compiled);
        }
        builder
    }

    pub fn without_builtins() -> Self {
        Self {
            sources: Vec::new(),
            parallel: false,
            show_progress: false,
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn add_source(
        &mut self,
        path: impl Into<PathBuf>,
        contents: impl Into<String>,
        origin: SourceOrigin,
    ) -> &mut Self {
        self.sources.push(PendingSource {
            path: path.into(),
            contents: contents.into(),
            origin,
        });
        self
    }

    /// Read a discovered file from disk and add it
    pub fn add_file(&mut self, file: &SourceFile, origin: SourceOrigin) -> Result<&mut Self> {
        let contents = file.read_contents()?;
        Ok(self.add_source(file.path.clone(), contents, origin))
    }

    pub fn add_files(&mut self, files: &[SourceFile], origin: SourceOrigin) -> &mut Self {
        for file in files {
            if let Err(e) = self.add_file(file, origin) {
                debug!("Skipping unreadable file {}: {}", file.path.display(), e);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn build(self) -> Result<Project> {
        let parser = JavaParser::new();
        let total = self.sources.len();
        info!("Parsing {} files...", total);

        let progress = if self.show_progress {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let parse_one = |pending: PendingSource| -> Option<ParsedSource> {
            let result = parser.parse_tree(&pending.path, &pending.contents);
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            match result {
                Ok(tree) => Some(ParsedSource { pending, tree }),
                Err(e) => {
                    debug!("Parse error (continuing): {}", e);
                    None
                }
            }
        };

        // Phase 1: syntax trees
        let parsed: Vec<ParsedSource> = if self.parallel {
            self.sources.into_par_iter().filter_map(parse_one).collect()
        } else {
            self.sources.into_iter().filter_map(parse_one).collect()
        };

        if let Some(pb) = &progress {
            pb.finish_and_clear();
        }

        // Phase 2: dense file ids and declaration tables
        let mut files = Vec::with_capacity(parsed.len());
        let mut types: Vec<TypeDecl> = Vec::new();
        let mut methods: Vec<MethodDecl> = Vec::new();
        let mut fields: Vec<FieldDecl> = Vec::new();

        for (index, source) in parsed.into_iter().enumerate() {
            let file = FileId(index);
            let ParsedSource { pending, tree } = source;
            let unit = parser.extract(file, &pending.path, &tree, &pending.contents);

            let mut unit_methods = unit.methods;
            if pending.origin == SourceOrigin::Compiled {
                // Signature-only view
                for method in &mut unit_methods {
                    method.body = None;
                }
            }

            types.extend(unit.types);
            methods.extend(unit_methods);
            fields.extend(unit.fields);

            files.push(SourceUnit {
                id: file,
                path: pending.path,
                source: pending.contents,
                tree,
                origin: pending.origin,
                package: unit.package,
                imports: unit.imports,
            });
        }

        info!(
            "Built project: {} files, {} types, {} methods, {} fields",
            files.len(),
            types.len(),
            methods.len(),
            fields.len()
        );

        Ok(Project::from_parts(files, types, methods, fields))
    }
}

impl Default for ProjectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Convenience for tests and small tools: project sources given inline
    pub fn from_sources<P: AsRef<Path>>(sources: &[(P, &str)]) -> Result<Project> {
        let mut builder = ProjectBuilder::new();
        for (path, contents) in sources {
            builder.add_source(path.as_ref(), *contents, SourceOrigin::Project);
        }
        builder.build()
    }
}
