use crate::config::Config;
use ignore::WalkBuilder;
use miette::{IntoDiagnostic, Result};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A discovered Java source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
}

impl SourceFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn is_java(path: &Path) -> bool {
        path.extension().and_then(|e| e.to_str()) == Some("java")
    }

    pub fn read_contents(&self) -> Result<String> {
        std::fs::read_to_string(&self.path).into_diagnostic()
    }
}

/// File finder for discovering Java sources in a project and its libraries
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all project source files under `root`, or under its configured targets
    pub fn find_files(&self, root: &Path) -> Result<Vec<SourceFile>> {
        debug!("Scanning for files in: {}", root.display());

        let targets = if self.config.targets.is_empty() {
            vec![root.to_path_buf()]
        } else {
            self.config.targets.iter().map(|t| root.join(t)).collect()
        };

        let mut files: Vec<SourceFile> = targets
            .par_iter()
            .flat_map(|target| self.scan_directory(target))
            .collect();
        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup();

        debug!("Found {} files", files.len());
        Ok(files)
    }

    /// Scan a single directory for source files
    fn scan_directory(&self, dir: &Path) -> Vec<SourceFile> {
        if !dir.exists() {
            trace!("Directory does not exist: {}", dir.display());
            return Vec::new();
        }

        let walker = WalkBuilder::new(dir)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(true)       // Respect global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(true)          // Check parent directories for ignore files
            .follow_links(false)    // Don't follow symlinks
            .build();

        walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();
                if !SourceFile::is_java(path) {
                    return None;
                }

                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                trace!("Found: {}", path.display());
                Some(SourceFile::new(path.to_path_buf()))
            })
            .collect()
    }

    /// Find the sources under every configured library root
    ///
    /// Library trees are often vendored or git-ignored, so ignore files are
    /// not consulted here.
    pub fn find_library_files(&self, root: &Path) -> Vec<SourceFile> {
        let mut files = Vec::new();

        for library in &self.config.library_paths {
            let library_root = root.join(library);
            if !library_root.exists() {
                debug!("Library path does not exist: {}", library_root.display());
                continue;
            }

            let walker = walkdir::WalkDir::new(&library_root)
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

            for entry in walker.flatten() {
                if entry.file_type().is_file() && SourceFile::is_java(entry.path()) {
                    files.push(SourceFile::new(entry.path().to_path_buf()));
                }
            }
        }

        debug!("Found {} library files", files.len());
        files
    }
}
