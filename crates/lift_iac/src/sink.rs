//! Append-only artifact destinations.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{IacError, IacResult};

/// Destination for rendered artifacts.
///
/// Content is always appended, so several units accumulate in one file in
/// emission order. [`ArtifactSink::clear`] runs once per directory before
/// its first append, so a rerun replaces the previous artifact family.
pub trait ArtifactSink {
    /// Drop artifacts left in `directory` by an earlier run.
    fn clear(&mut self, directory: &str) -> IacResult<()>;

    fn append(&mut self, directory: &str, file_name: &str, content: &str) -> IacResult<()>;
}

/// File extensions of emitted artifacts.
const ARTIFACT_EXTENSIONS: [&str; 2] = ["tf", "tfvars"];

/// Writes artifacts under a root directory, one subdirectory per Vpc.
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactSink for FsSink {
    /// Removes `.tf` and `.tfvars` files only; Terraform's own working
    /// files (`.terraform/`, lock file) are left alone.
    fn clear(&mut self, directory: &str) -> IacResult<()> {
        let dir = self.root.join(directory);
        if !dir.is_dir() {
            return Ok(());
        }

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let is_artifact = path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ARTIFACT_EXTENSIONS.contains(&ext));
            if is_artifact {
                fs::remove_file(&path).map_err(|source| IacError::Write {
                    path: path.clone(),
                    source,
                })?;
                debug!("Removed stale artifact {:?}", path);
            }
        }
        Ok(())
    }

    fn append(&mut self, directory: &str, file_name: &str, content: &str) -> IacResult<()> {
        let dir = self.root.join(directory);
        fs::create_dir_all(&dir)?;

        let path = dir.join(file_name);
        let write = |path: &Path| -> std::io::Result<()> {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            writeln!(file, "{}", content)
        };
        write(&path).map_err(|source| IacError::Write {
            path: path.clone(),
            source,
        })?;

        debug!("Appended to {:?}", path);
        Ok(())
    }
}

/// Collects artifacts in memory, keyed by directory then file name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemorySink {
    files: BTreeMap<String, BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, directory: &str, file_name: &str) -> Option<&str> {
        self.files
            .get(directory)
            .and_then(|files| files.get(file_name))
            .map(String::as_str)
    }

    pub fn directories(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn file_names(&self, directory: &str) -> Vec<&str> {
        self.files
            .get(directory)
            .map(|files| files.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

impl ArtifactSink for MemorySink {
    fn clear(&mut self, directory: &str) -> IacResult<()> {
        self.files.remove(directory);
        Ok(())
    }

    fn append(&mut self, directory: &str, file_name: &str, content: &str) -> IacResult<()> {
        let file = self
            .files
            .entry(directory.to_string())
            .or_default()
            .entry(file_name.to_string())
            .or_default();
        file.push_str(content);
        file.push('\n');
        Ok(())
    }
}
