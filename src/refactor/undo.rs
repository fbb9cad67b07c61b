use miette::{IntoDiagnostic, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Generates a shell script that restores files changed by fixes
pub struct UndoScript {
    /// Original file contents before the first edit
    file_states: BTreeMap<PathBuf, String>,
}

impl UndoScript {
    pub fn new() -> Self {
        Self {
            file_states: BTreeMap::new(),
        }
    }

    /// Record the state of a file before modification; later calls keep the first state
    pub fn record_file_state(&mut self, path: &Path, contents: &str) {
        self.file_states
            .entry(path.to_path_buf())
            .or_insert_with(|| contents.to_string());
    }

    pub fn render(&self) -> String {
        let mut script = String::new();

        script.push_str("#!/bin/bash\n");
        script.push_str("# redundantoverride undo script\n");
        script.push_str("# Run to restore the files changed by applied fixes\n");
        script.push('\n');
        script.push_str("set -e\n");
        script.push('\n');

        for (file_path, contents) in &self.file_states {
            let escaped_path = file_path.display().to_string().replace('\'', "'\\''");

            script.push_str(&format!("# Restore {}\n", file_path.display()));
            // Quoted heredoc: contents are taken literally
            script.push_str(&format!("cat > '{}' << 'REDUNDANTOVERRIDE_EOF'\n", escaped_path));
            script.push_str(contents);
            if !contents.ends_with('\n') {
                script.push('\n');
            }
            script.push_str("REDUNDANTOVERRIDE_EOF\n");
            script.push_str(&format!("echo '  Restored: {}'\n", escaped_path));
            script.push('\n');
        }

        script.push_str("echo 'Done! All files restored.'\n");
        script
    }

    /// Write the undo script to a file
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()).into_diagnostic()?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path).into_diagnostic()?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(path, perms).into_diagnostic()?;
        }

        Ok(())
    }

    pub fn file_count(&self) -> usize {
        self.file_states.len()
    }
}

impl Default for UndoScript {
    fn default() -> Self {
        Self::new()
    }
}
