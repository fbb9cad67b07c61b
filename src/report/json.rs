use crate::analysis::{Finding, ProblemKind, Severity};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn render(findings: &[Finding]) -> Result<String> {
        let report = JsonReport::from_findings(findings);
        serde_json::to_string_pretty(&report).into_diagnostic()
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let json = Self::render(findings)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

#[derive(Serialize)]
struct JsonReport {
    version: &'static str,
    total_issues: usize,
    issues: Vec<JsonIssue>,
    summary: JsonSummary,
}

#[derive(Serialize)]
struct JsonIssue {
    code: &'static str,
    kind: ProblemKind,
    severity: &'static str,
    message: String,
    file: String,
    line: usize,
    column: usize,
    method: String,
    owner: String,
    super_owner: String,
    delegates_to_super: bool,
    fixes: Vec<&'static str>,
}

#[derive(Serialize)]
struct JsonSummary {
    errors: usize,
    warnings: usize,
    infos: usize,
    delegating: usize,
}

impl JsonReport {
    fn from_findings(findings: &[Finding]) -> Self {
        let mut errors = 0;
        let mut warnings = 0;
        let mut infos = 0;

        let issues: Vec<JsonIssue> = findings
            .iter()
            .map(|f| {
                match f.severity {
                    Severity::Error => errors += 1,
                    Severity::Warning => warnings += 1,
                    Severity::Info => infos += 1,
                }

                JsonIssue {
                    code: f.kind.code(),
                    kind: f.kind,
                    severity: f.severity.as_str(),
                    message: f.message.clone(),
                    file: f.location.file.to_string_lossy().to_string(),
                    line: f.location.line,
                    column: f.location.column,
                    method: f.method_name.clone(),
                    owner: f.owner_name.clone(),
                    super_owner: f.super_owner_name.clone(),
                    delegates_to_super: f.delegates_to_super,
                    fixes: f.fixes.iter().map(|fix| fix.description()).collect(),
                }
            })
            .collect();

        Self {
            version: "1.0",
            total_issues: findings.len(),
            summary: JsonSummary {
                errors,
                warnings,
                infos,
                delegating: findings.iter().filter(|f| f.delegates_to_super).count(),
            },
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Inspector;
    use crate::model::Project;

    #[test]
    fn test_render_findings() {
        let project = Project::from_sources(&[(
            "A.java",
            "class A { void m() {} }\nclass B extends A { void m() { super.m(); } }\n",
        )])
        .unwrap();
        let findings = Inspector::default().run(&project).findings;

        let json: serde_json::Value = serde_json::from_str(&JsonReporter::render(&findings).unwrap()).unwrap();
        assert_eq!(json["total_issues"], 1);
        assert_eq!(json["issues"][0]["code"], "RO001");
        assert_eq!(json["issues"][0]["kind"], "delegating_override");
        assert_eq!(json["issues"][0]["owner"], "B");
        assert_eq!(json["issues"][0]["line"], 2);
        assert_eq!(json["summary"]["delegating"], 1);
    }

    #[test]
    fn test_render_empty() {
        let json: serde_json::Value = serde_json::from_str(&JsonReporter::render(&[]).unwrap()).unwrap();
        assert_eq!(json["total_issues"], 0);
        assert!(json["issues"].as_array().unwrap().is_empty());
    }
}
