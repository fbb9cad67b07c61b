use crate::analysis::{Finding, ProblemKind, Severity};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;

/// SARIF reporter for CI/CD integration (GitHub, Azure DevOps, etc.)
pub struct SarifReporter {
    output_path: Option<PathBuf>,
}

impl SarifReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn render(findings: &[Finding]) -> Result<String> {
        let sarif = SarifReport::from_findings(findings);
        serde_json::to_string_pretty(&sarif).into_diagnostic()
    }

    pub fn report(&self, findings: &[Finding]) -> Result<()> {
        let json = Self::render(findings)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json).into_diagnostic()?;
            println!("SARIF report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }
}

/// SARIF 2.1.0 format
#[derive(Serialize)]
struct SarifReport {
    #[serde(rename = "$schema")]
    schema: &'static str,
    version: &'static str,
    runs: Vec<SarifRun>,
}

#[derive(Serialize)]
struct SarifRun {
    tool: SarifTool,
    results: Vec<SarifResult>,
}

#[derive(Serialize)]
struct SarifTool {
    driver: SarifDriver,
}

#[derive(Serialize)]
struct SarifDriver {
    name: &'static str,
    version: &'static str,
    rules: Vec<SarifRule>,
}

#[derive(Serialize)]
struct SarifRule {
    id: &'static str,
    name: &'static str,
    #[serde(rename = "shortDescription")]
    short_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    default_configuration: SarifConfiguration,
}

#[derive(Serialize)]
struct SarifConfiguration {
    level: &'static str,
}

#[derive(Serialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: &'static str,
    level: &'static str,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
    properties: SarifProperties,
}

#[derive(Serialize)]
struct SarifProperties {
    #[serde(rename = "delegatesToSuper")]
    delegates_to_super: bool,
}

#[derive(Serialize)]
struct SarifMessage {
    text: String,
}

#[derive(Serialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Serialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifactLocation,
    region: SarifRegion,
}

#[derive(Serialize)]
struct SarifArtifactLocation {
    uri: String,
}

#[derive(Serialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: usize,
    #[serde(rename = "startColumn")]
    start_column: usize,
}

fn level(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Info => "note",
    }
}

impl SarifReport {
    fn from_findings(findings: &[Finding]) -> Self {
        let rules = [
            ProblemKind::DelegatingOverride,
            ProblemKind::EquivalentOverride,
            ProblemKind::AbstractOverridesAbstract,
        ]
        .into_iter()
        .map(|kind| SarifRule {
            id: kind.code(),
            name: kind.name(),
            short_description: SarifMessage {
                text: kind.description().to_string(),
            },
            default_configuration: SarifConfiguration {
                level: level(kind.default_severity()),
            },
        })
        .collect();

        let results = findings
            .iter()
            .map(|f| SarifResult {
                rule_id: f.kind.code(),
                level: level(f.severity),
                message: SarifMessage {
                    text: f.message.clone(),
                },
                locations: vec![SarifLocation {
                    physical_location: SarifPhysicalLocation {
                        artifact_location: SarifArtifactLocation {
                            uri: f.location.file.to_string_lossy().to_string(),
                        },
                        region: SarifRegion {
                            start_line: f.location.line,
                            start_column: f.location.column,
                        },
                    },
                }],
                properties: SarifProperties {
                    delegates_to_super: f.delegates_to_super,
                },
            })
            .collect();

        SarifReport {
            schema: "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
            version: "2.1.0",
            runs: vec![SarifRun {
                tool: SarifTool {
                    driver: SarifDriver {
                        name: "redundantoverride",
                        version: env!("CARGO_PKG_VERSION"),
                        rules,
                    },
                },
                results,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Inspector;
    use crate::model::Project;

    #[test]
    fn test_rules_and_results() {
        let project = Project::from_sources(&[(
            "A.java",
            "abstract class A { abstract void m(); }\nabstract class B extends A { abstract void m(); }\n",
        )])
        .unwrap();
        let findings = Inspector::default().run(&project).findings;

        let sarif: serde_json::Value = serde_json::from_str(&SarifReporter::render(&findings).unwrap()).unwrap();
        let run = &sarif["runs"][0];
        assert_eq!(run["tool"]["driver"]["rules"].as_array().unwrap().len(), 3);
        assert_eq!(run["results"][0]["ruleId"], "RO003");
        assert_eq!(run["results"][0]["level"], "note");
        assert_eq!(run["results"][0]["properties"]["delegatesToSuper"], false);
    }
}
