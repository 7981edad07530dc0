//! Timestamped archive of raw payloads and snapshots.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{ModelError, ModelResult};
use crate::snapshot::Snapshot;

/// File name prefix of consolidated snapshots.
pub const SNAPSHOT_PREFIX: &str = "formatted";

/// Audit directory holding raw payload dumps and snapshots.
#[derive(Debug, Clone)]
pub struct AuditArchive {
    dir: PathBuf,
}

impl AuditArchive {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save a raw payload as `<type>_<id>_<timestamp>.json`.
    pub fn save<T: Serialize>(
        &self,
        resource_type: &str,
        resource_id: &str,
        payload: &T,
    ) -> ModelResult<PathBuf> {
        fs::create_dir_all(&self.dir)?;

        let path = self
            .dir
            .join(format!("{}_{}_{}.json", resource_type, resource_id, timestamp()));
        let content = serde_json::to_string_pretty(payload)?;
        fs::write(&path, content)?;

        debug!("Archived {} {} to {:?}", resource_type, resource_id, path);
        Ok(path)
    }

    /// Save a consolidated snapshot as `formatted_<timestamp>.json`.
    pub fn save_snapshot(&self, snapshot: &Snapshot) -> ModelResult<PathBuf> {
        let path = self
            .dir
            .join(format!("{}_{}.json", SNAPSHOT_PREFIX, timestamp()));
        snapshot.write(&path)?;
        info!("Saved snapshot with {} vpcs to {:?}", snapshot.len(), path);
        Ok(path)
    }

    /// Find the most recent snapshot in the audit directory.
    pub fn latest_snapshot(&self) -> ModelResult<PathBuf> {
        if !self.dir.exists() {
            return Err(ModelError::NoSnapshot(self.dir.clone()));
        }

        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| {
                let name = e.file_name().to_string_lossy();
                name.starts_with(SNAPSHOT_PREFIX) && name.ends_with(".json")
            })
            .map(|e| e.into_path())
            .max()
            .ok_or_else(|| ModelError::NoSnapshot(self.dir.clone()))
    }
}

fn timestamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}
