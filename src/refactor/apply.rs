use super::{apply_edits, TextEdit, UndoScript};
use crate::analysis::{Finding, QuickFix};
use crate::model::Project;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm, MultiSelect};
use miette::{miette, IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Counts of an apply pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub applied: usize,
    pub failed: usize,
}

/// Applies quick fixes to files on disk, with user confirmation
pub struct FixApplier {
    interactive: bool,
    dry_run: bool,
    assume_yes: bool,
    preferred: QuickFix,
    undo_script_path: Option<PathBuf>,
}

impl FixApplier {
    pub fn new(interactive: bool, dry_run: bool, undo_script_path: Option<PathBuf>) -> Self {
        Self {
            interactive,
            dry_run,
            assume_yes: false,
            preferred: QuickFix::DeleteOverride,
            undo_script_path,
        }
    }

    /// Fix to use wherever a finding offers it; otherwise the first offered fix
    pub fn with_preferred(mut self, fix: QuickFix) -> Self {
        self.preferred = fix;
        self
    }

    /// Skip confirmation prompts
    pub fn with_assume_yes(mut self, assume_yes: bool) -> Self {
        self.assume_yes = assume_yes;
        self
    }

    fn chosen_fix(&self, finding: &Finding) -> Option<QuickFix> {
        if finding.fixes.contains(&self.preferred) {
            Some(self.preferred)
        } else {
            finding.fixes.first().copied()
        }
    }

    fn describe(&self, finding: &Finding) -> String {
        let fix = self
            .chosen_fix(finding)
            .map(|f| f.description())
            .unwrap_or("No fix available");
        format!(
            "{} '{}.{}' at {}:{}",
            fix,
            finding.owner_name,
            finding.method_name,
            finding.location.file.display(),
            finding.location.line
        )
    }

    /// Apply the chosen fix of every confirmed finding
    pub fn apply(&self, project: &Project, findings: &[Finding]) -> Result<FixSummary> {
        let mut summary = FixSummary::default();
        if findings.is_empty() {
            println!("{}", "No overrides to fix.".green());
            return Ok(summary);
        }

        if self.dry_run {
            println!();
            println!("{}", "Dry run - would apply:".yellow().bold());
            for finding in findings {
                println!("  {}", self.describe(finding));
            }
            println!();
            println!(
                "{}",
                format!("Total: {} fixes would be applied", findings.len()).dimmed()
            );
            return Ok(summary);
        }

        let selected = if self.assume_yes {
            findings.iter().collect()
        } else if self.interactive {
            self.interactive_select(findings)?
        } else {
            self.batch_confirm(findings)?
        };

        if selected.is_empty() {
            println!("{}", "No fixes selected.".yellow());
            return Ok(summary);
        }

        // Edits are computed against the analyzed sources, then grouped per file
        let mut by_file: BTreeMap<PathBuf, Vec<(&Finding, Vec<TextEdit>)>> = BTreeMap::new();
        for finding in selected {
            let Some(fix) = self.chosen_fix(finding) else {
                continue;
            };
            match fix.edits(project, finding) {
                Ok(edits) => by_file
                    .entry(finding.location.file.clone())
                    .or_default()
                    .push((finding, edits)),
                Err(e) => {
                    println!("  {} Failed to fix '{}': {}", "✗".red(), finding.method_name, e);
                    summary.failed += 1;
                }
            }
        }

        let mut undo_script = self.undo_script_path.as_ref().map(|_| UndoScript::new());

        println!();
        println!("{}", "Applying fixes...".cyan().bold());

        for (path, fixes) in &by_file {
            let edits: Vec<TextEdit> = fixes.iter().flat_map(|(_, e)| e.iter().cloned()).collect();
            match self.rewrite_file(project, path, &edits, undo_script.as_mut()) {
                Ok(()) => {
                    for (finding, _) in fixes {
                        println!("  {} {}", "✓".green(), self.describe(finding));
                        summary.applied += 1;
                    }
                }
                Err(e) => {
                    println!("  {} Failed to update {}: {}", "✗".red(), path.display(), e);
                    summary.failed += fixes.len();
                }
            }
        }

        if let (Some(script), Some(path)) = (undo_script, &self.undo_script_path) {
            script.write(path)?;
            println!();
            println!("{} Undo script saved to: {}", "→".dimmed(), path.display());
        }

        Ok(summary)
    }

    fn rewrite_file(
        &self,
        project: &Project,
        path: &PathBuf,
        edits: &[TextEdit],
        undo_script: Option<&mut UndoScript>,
    ) -> Result<()> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        let analyzed = project
            .file_by_path(path)
            .ok_or_else(|| miette!("{} was not part of the analysis", path.display()))?;
        if analyzed.source != contents {
            return Err(miette!("{} changed since it was analyzed", path.display()));
        }

        let new_contents = apply_edits(&contents, edits)?;
        if let Some(script) = undo_script {
            script.record_file_state(path, &contents);
        }
        std::fs::write(path, new_contents).into_diagnostic()?;
        Ok(())
    }

    /// Interactive selection mode - confirm each fix
    fn interactive_select<'a>(&self, findings: &'a [Finding]) -> Result<Vec<&'a Finding>> {
        let mut selected = Vec::new();

        println!();
        println!("{}", "Interactive mode - confirm each fix:".cyan().bold());
        println!();

        for finding in findings {
            let prompt = format!("{}?", self.describe(finding));
            if Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(&prompt)
                .default(false)
                .interact()
                .into_diagnostic()?
            {
                selected.push(finding);
            }
        }

        Ok(selected)
    }

    /// Batch confirmation - select multiple at once
    fn batch_confirm<'a>(&self, findings: &'a [Finding]) -> Result<Vec<&'a Finding>> {
        let items: Vec<String> = findings.iter().map(|f| self.describe(f)).collect();

        println!();
        println!("{}", "Select fixes to apply:".cyan().bold());
        println!("{}", "(Space to toggle, Enter to confirm)".dimmed());
        println!();

        let selections = MultiSelect::with_theme(&ColorfulTheme::default())
            .items(&items)
            .interact()
            .into_diagnostic()?;

        let selected: Vec<&Finding> = selections.into_iter().map(|i| &findings[i]).collect();

        if !selected.is_empty() {
            println!();
            let confirm = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!("Apply {} fixes?", selected.len()))
                .default(false)
                .interact()
                .into_diagnostic()?;

            if !confirm {
                return Ok(Vec::new());
            }
        }

        Ok(selected)
    }
}
