//! Baseline support
//!
//! A baseline records the findings of an earlier run so that later runs
//! only report overrides introduced since.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use thiserror::Error;

use crate::analysis::Finding;

/// Baseline errors
#[derive(Error, Debug)]
pub enum BaselineError {
    #[error("Failed to read baseline file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse baseline: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Baseline version mismatch")]
    VersionMismatch,
}

/// Current baseline format version
const BASELINE_VERSION: u32 = 1;

/// Lines a method may move before its fingerprint stops matching
const LINE_TOLERANCE: usize = 10;

/// A fingerprint for a finding that can be matched across runs
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IssueFingerprint {
    /// Relative file path
    pub file: String,
    /// Fully qualified name of the overriding method's class
    pub owner: String,
    /// Method name
    pub method: String,
    /// Rule code
    pub rule: String,
    /// Line number (approximate, may shift slightly)
    pub line: usize,
}

fn relative_file(finding: &Finding, project_root: &Path) -> String {
    finding
        .location
        .file
        .strip_prefix(project_root)
        .unwrap_or(&finding.location.file)
        .to_string_lossy()
        .to_string()
}

impl IssueFingerprint {
    pub fn from_finding(finding: &Finding, project_root: &Path) -> Self {
        Self {
            file: relative_file(finding, project_root),
            owner: finding.owner_name.clone(),
            method: finding.method_name.clone(),
            rule: finding.kind.code().to_string(),
            line: finding.location.line,
        }
    }

    /// Check if this fingerprint matches a finding, tolerating some line drift
    pub fn matches(&self, finding: &Finding, project_root: &Path) -> bool {
        if self.file != relative_file(finding, project_root)
            || self.owner != finding.owner_name
            || self.method != finding.method_name
            || self.rule != finding.kind.code()
        {
            return false;
        }

        self.line.abs_diff(finding.location.line) <= LINE_TOLERANCE
    }
}

/// A baseline containing known findings to ignore
#[derive(Debug, Serialize, Deserialize)]
pub struct Baseline {
    /// Baseline format version
    pub version: u32,
    /// When the baseline was created, in seconds since the epoch
    pub created_at: String,
    /// Known issues to ignore
    pub issues: Vec<IssueFingerprint>,
    /// Total count at baseline time
    pub total_at_baseline: usize,
}

impl Baseline {
    pub fn from_findings(findings: &[Finding], project_root: &Path) -> Self {
        let issues: Vec<IssueFingerprint> = findings
            .iter()
            .map(|f| IssueFingerprint::from_finding(f, project_root))
            .collect();

        Self {
            version: BASELINE_VERSION,
            created_at: timestamp_now(),
            issues,
            total_at_baseline: findings.len(),
        }
    }

    /// Load a baseline from a file
    pub fn load(path: &Path) -> Result<Self, BaselineError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let baseline: Self = serde_json::from_reader(reader)?;

        if baseline.version != BASELINE_VERSION {
            return Err(BaselineError::VersionMismatch);
        }

        Ok(baseline)
    }

    /// Save baseline to a file
    pub fn save(&self, path: &Path) -> Result<(), BaselineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Findings not covered by the baseline
    pub fn filter_new(&self, findings: &[Finding], project_root: &Path) -> Vec<Finding> {
        findings
            .iter()
            .filter(|f| !self.is_baselined(f, project_root))
            .cloned()
            .collect()
    }

    pub fn is_baselined(&self, finding: &Finding, project_root: &Path) -> bool {
        self.issues.iter().any(|fp| fp.matches(finding, project_root))
    }

    pub fn stats(&self, findings: &[Finding], project_root: &Path) -> BaselineStats {
        let baselined = findings
            .iter()
            .filter(|f| self.is_baselined(f, project_root))
            .count();

        BaselineStats {
            total_in_baseline: self.issues.len(),
            baselined_found: baselined,
            new_issues: findings.len() - baselined,
        }
    }
}

/// Statistics about baseline comparison
#[derive(Debug, Clone)]
pub struct BaselineStats {
    /// Total issues recorded in baseline
    pub total_in_baseline: usize,
    /// Number of current findings that match baseline
    pub baselined_found: usize,
    /// Number of new issues not in baseline
    pub new_issues: usize,
}

impl std::fmt::Display for BaselineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} new issues ({} baselined, {} in baseline file)",
            self.new_issues, self.baselined_found, self.total_in_baseline
        )
    }
}

fn timestamp_now() -> String {
    use std::time::SystemTime;

    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_secs().to_string()
}
