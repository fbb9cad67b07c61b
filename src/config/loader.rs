// Configuration loader

use crate::analysis::SearchMode;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a redundantoverride run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Target directories to analyze
    pub targets: Vec<PathBuf>,

    /// Patterns to exclude from analysis
    pub exclude: Vec<String>,

    /// Roots of attached library sources, used for resolution and navigation only
    pub library_paths: Vec<PathBuf>,

    /// Report configuration
    pub report: ReportConfig,

    /// Per-inspection settings
    pub inspections: InspectionsConfig,

    /// Reference search settings
    pub search: SearchConfig,

    /// Run inspections on a rayon pool
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Output format: terminal, json, sarif
    pub format: String,

    /// Show the offered quick fixes in terminal output
    pub show_fixes: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectionsConfig {
    pub redundant_override: RedundantOverrideConfig,
    pub abstract_override: AbstractOverrideConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedundantOverrideConfig {
    pub enabled: bool,

    /// Compare against library super methods through their attached sources
    pub check_library_methods: bool,

    /// Do not report overrides that only delegate to super
    pub ignore_delegates: bool,

    /// Require doc comments on the override to match the super method's
    pub check_javadoc: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbstractOverrideConfig {
    pub enabled: bool,

    /// Skip doc comment comparison
    pub ignore_javadoc: bool,

    /// Skip annotation comparison
    pub ignore_annotations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// `on_the_fly` probes occurrence counts first; `batch` always scans
    pub mode: SearchMode,

    /// Above this many word occurrences a probe gives up
    pub few_occurrences_limit: usize,

    /// Above this many files a probe gives up
    pub max_scanned_files: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            targets: vec![],
            exclude: vec![
                "**/build/**".to_string(),
                "**/generated/**".to_string(),
                "**/.gradle/**".to_string(),
                "**/.idea/**".to_string(),
                "**/target/**".to_string(),
            ],
            library_paths: vec![],
            report: ReportConfig::default(),
            inspections: InspectionsConfig::default(),
            search: SearchConfig::default(),
            parallel: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: "terminal".to_string(),
            show_fixes: true,
        }
    }
}

impl Default for RedundantOverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_library_methods: false,
            ignore_delegates: false,
            check_javadoc: false,
        }
    }
}

impl Default for AbstractOverrideConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ignore_javadoc: true,
            ignore_annotations: false,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Batch,
            few_occurrences_limit: 10,
            max_scanned_files: 5000,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".redundantoverride.yml",
            ".redundantoverride.yaml",
            ".redundantoverride.toml",
            "redundantoverride.yml",
            "redundantoverride.yaml",
            "redundantoverride.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if a pattern matches for exclusion
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        self.exclude.iter().any(|pattern| glob_match(pattern, &path_str))
    }
}

/// Simple glob matching for patterns like "*Test.java" or "**/build/**"
fn glob_match(pattern: &str, text: &str) -> bool {
    if let Some(suffix) = pattern.strip_prefix('*').filter(|_| !pattern.contains('/')) {
        // "*Test.java" matches "FooTest.java"
        return text.ends_with(suffix);
    }

    if let Some(prefix) = pattern.strip_suffix('*').filter(|_| !pattern.contains('/')) {
        return text.starts_with(prefix);
    }

    if pattern.contains("**") {
        // "**/build/**" must match a complete directory name
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern.trim_start_matches("**/").trim_end_matches("/**").trim_matches('/');
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern) || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true;
            }

            if prefix.is_empty() {
                return text.ends_with(suffix) || text.contains(&format!("/{}", suffix));
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && (text.ends_with(suffix) || text.contains(&format!("/{}", suffix)));
        }
    }

    text == pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_match_suffix() {
        assert!(glob_match("*Test.java", "FooTest.java"));
        assert!(!glob_match("*Test.java", "TestFoo.java"));
    }

    #[test]
    fn test_glob_match_prefix() {
        assert!(glob_match("Generated*", "GeneratedModule"));
        assert!(!glob_match("Generated*", "ModuleGenerated"));
    }

    #[test]
    fn test_glob_match_path() {
        assert!(glob_match("**/build/**", "/project/build/output"));
        assert!(glob_match("**/build/**", "app/build/generated"));
        assert!(!glob_match("**/build/**", "/project/src/main"));
        assert!(!glob_match("**/build/**", "/project/buildSrc/Main.java"));
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.inspections.redundant_override.enabled);
        assert!(!config.inspections.redundant_override.check_library_methods);
        assert!(config.inspections.abstract_override.ignore_javadoc);
        assert_eq!(config.search.mode, SearchMode::Batch);
    }

    #[test]
    fn test_load_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".redundantoverride.yml");
        std::fs::write(
            &path,
            "inspections:\n  redundant_override:\n    ignore_delegates: true\nsearch:\n  mode: on_the_fly\n",
        )
        .unwrap();

        let config = Config::from_default_locations(dir.path()).unwrap();
        assert!(config.inspections.redundant_override.ignore_delegates);
        assert!(config.inspections.redundant_override.enabled);
        assert_eq!(config.search.mode, SearchMode::OnTheFly);
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("redundantoverride.toml");
        std::fs::write(
            &path,
            "library_paths = [\"libs/src\"]\n\n[inspections.abstract_override]\nenabled = false\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.library_paths, vec![PathBuf::from("libs/src")]);
        assert!(!config.inspections.abstract_override.enabled);
    }
}
