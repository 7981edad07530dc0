//! Consolidated audit snapshot.
//!
//! The snapshot is the nested Vpc → Subnet → Instance tree keyed by Vpc id.
//! It is written once after assembly and read back by generation runs.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::models::VpcNode;

/// Nested resource tree for one audit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    pub vpcs: BTreeMap<String, VpcNode>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vpc: VpcNode) {
        self.vpcs.insert(vpc.id.clone(), vpc);
    }

    pub fn is_empty(&self) -> bool {
        self.vpcs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.vpcs.len()
    }

    pub fn instance_count(&self) -> usize {
        self.vpcs.values().map(VpcNode::instance_count).sum()
    }

    /// Read a snapshot from a JSON file.
    pub fn read(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        debug!("Reading snapshot from {:?}", path);

        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| ModelError::InvalidFormat {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write the snapshot as pretty JSON.
    pub fn write(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let path = path.as_ref();
        debug!("Writing snapshot to {:?}", path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_snapshot() {
        let dir = tempdir().unwrap();
        let err = Snapshot::read(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)));
    }

    #[test]
    fn test_read_invalid_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("formatted.json");
        fs::write(&path, "{\"vpc-1\": 42}").unwrap();

        let err = Snapshot::read(&path).unwrap_err();
        assert!(matches!(err, ModelError::InvalidFormat { .. }));
    }

    #[test]
    fn test_snapshot_is_keyed_by_vpc_id() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(VpcNode {
            id: "vpc-1".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            tags: Vec::new(),
            subnets: BTreeMap::new(),
        });

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["vpc-1"]["cidr_block"], "10.0.0.0/16");
    }
}
