use crate::analysis::{Finding, ProblemKind, Severity};
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List the quick fixes offered with each finding
    show_fixes: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self { show_fixes: true }
    }

    pub fn with_fixes(mut self, show: bool) -> Self {
        self.show_fixes = show;
        self
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        if findings.is_empty() {
            println!("{}", "No redundant overrides found!".green().bold());
            return Ok(());
        }

        let mut by_file: BTreeMap<PathBuf, Vec<&Finding>> = BTreeMap::new();
        for finding in findings {
            by_file
                .entry(finding.location.file.clone())
                .or_default()
                .push(finding);
        }

        println!();
        println!(
            "{}",
            format!("Found {} redundant overrides:", findings.len())
                .yellow()
                .bold()
        );
        println!();

        for (file, items) in &by_file {
            println!("{}", file.display().to_string().cyan().bold());
            for item in items {
                self.print_item(item);
            }
            println!();
        }

        self.print_summary(findings);
        Ok(())
    }

    fn print_item(&self, item: &Finding) {
        let severity_str = match item.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
            Severity::Info => "info".blue().bold(),
        };

        let location = format!("{}:{}", item.location.line, item.location.column);

        println!(
            "  {} {} [{}] {}",
            location.dimmed(),
            severity_str,
            item.kind.code().dimmed(),
            item.message
        );

        println!(
            "    {} {}.{} overrides {}.{}",
            "→".dimmed(),
            item.owner_name.white(),
            item.method_name.white(),
            item.super_owner_name.dimmed(),
            item.method_name.dimmed()
        );

        if self.show_fixes {
            for fix in &item.fixes {
                println!("    {} {}", "fix:".dimmed(), fix.description().dimmed());
            }
        }
    }

    fn print_summary(&self, findings: &[Finding]) {
        let count = |kind: ProblemKind| findings.iter().filter(|f| f.kind == kind).count();
        let delegating = count(ProblemKind::DelegatingOverride);
        let equivalent = count(ProblemKind::EquivalentOverride);
        let abstract_overrides = count(ProblemKind::AbstractOverridesAbstract);

        println!("{}", "─".repeat(60).dimmed());

        let mut parts = Vec::new();
        if delegating > 0 {
            parts.push(format!("{} delegating", delegating).yellow().to_string());
        }
        if equivalent > 0 {
            parts.push(format!("{} identical to super", equivalent).yellow().to_string());
        }
        if abstract_overrides > 0 {
            parts.push(format!("{} abstract redeclarations", abstract_overrides).blue().to_string());
        }
        println!("Summary: {}", parts.join(", "));
        println!();

        println!(
            "{}",
            "Tip: Run with --fix to remove the redundant overrides".dimmed()
        );
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
