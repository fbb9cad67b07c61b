//! redundantoverride - find Java method overrides that add nothing
//!
//! This library detects overriding methods that are redundant with respect
//! to the method they override, and offers quick fixes that remove them.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **File Discovery** - Find project `.java` files and attached library sources
//! 2. **Parsing** - Parse source files using tree-sitter
//! 3. **Project Model** - Build declaration tables, the type hierarchy and name resolution
//! 4. **Inspections** - Check every project method against its super methods
//! 5. **Reporting** - Output findings in terminal, JSON or SARIF form
//! 6. **Quick Fixes** - Delete overrides or rewrite them as explicit `super` calls

pub mod analysis;
pub mod baseline;
pub mod config;
pub mod discovery;
pub mod model;
pub mod parser;
pub mod refactor;
pub mod report;

pub use analysis::{
    AbstractMethodOverridesAbstractMethodInspection, Finding, Inspection, Inspector, ProblemKind, QuickFix,
    RedundantMethodOverrideInspection, SearchMode,
};
pub use baseline::Baseline;
pub use config::Config;
pub use discovery::{FileFinder, SourceFile};
pub use model::{Project, ProjectBuilder, SourceOrigin};
pub use refactor::{FixApplier, FixSummary};
pub use report::{ReportFormat, Reporter};
