mod json;
mod sarif;
mod terminal;

pub use json::JsonReporter;
pub use sarif::SarifReporter;
pub use terminal::TerminalReporter;

use crate::analysis::Finding;
use miette::{miette, Result};
use std::path::PathBuf;
use std::str::FromStr;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
    Sarif,
}

impl FromStr for ReportFormat {
    type Err = miette::Report;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "terminal" | "text" => Ok(ReportFormat::Terminal),
            "json" => Ok(ReportFormat::Json),
            "sarif" => Ok(ReportFormat::Sarif),
            other => Err(miette!("Unknown report format: {}", other)),
        }
    }
}

/// Reporter for outputting inspection findings
pub struct Reporter {
    format: ReportFormat,
    output_path: Option<PathBuf>,
    show_fixes: bool,
}

impl Reporter {
    pub fn new(format: ReportFormat, output_path: Option<PathBuf>) -> Self {
        Self {
            format,
            output_path,
            show_fixes: true,
        }
    }

    pub fn with_fixes(mut self, show: bool) -> Self {
        self.show_fixes = show;
        self
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new().with_fixes(self.show_fixes).report(findings),
            ReportFormat::Json => JsonReporter::new(self.output_path.clone()).report(findings),
            ReportFormat::Sarif => SarifReporter::new(self.output_path.clone()).report(findings),
        }
    }
}
