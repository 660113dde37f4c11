//! Change detection for CI-triggered runs.
//!
//! Asks git which files changed in a commit range and keeps the ones
//! under the configured content directory with an accepted extension.
//! Manual runs pass explicit paths and skip this module entirely.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::config::ContentConfig;
use crate::error::{PipelineError, Result};

/// List text files changed in `range` (e.g. `origin/main..HEAD`),
/// filtered and in git's output order. An empty list is a normal
/// outcome, not an error.
pub fn changed_files(range: &str, filter: &ContentConfig) -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .args(["diff", "--name-only", range])
        .output()?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(PipelineError::Diff(stderr));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut files = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let path = PathBuf::from(line);
        if !matches_filter(&path, filter) {
            debug!("Skipping {line}: outside content filter");
            continue;
        }
        if !files.contains(&path) {
            files.push(path);
        }
    }

    info!("{} changed text file(s) in {range}", files.len());
    Ok(files)
}

/// A path matches when it lives under the content directory and
/// carries one of the accepted extensions.
pub fn matches_filter(path: &Path, filter: &ContentConfig) -> bool {
    let in_dir = filter.dir.is_empty() || path.starts_with(&filter.dir);
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| filter.extensions.iter().any(|allowed| allowed == e))
        .unwrap_or(false);
    in_dir && ext_ok
}
