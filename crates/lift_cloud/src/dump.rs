//! Offline inventory provider backed by describe-* JSON dumps.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use lift_model::raw::{
    DescribeInstancesResponse, DescribeSecurityGroupsResponse, DescribeSubnetsResponse,
    DescribeVpcsResponse, RawInstance, RawReservation, RawSecurityGroup, RawSubnet, RawVpc,
};
use lift_model::RawPayload;

use crate::error::{CloudError, CloudResult};
use crate::provider::InventoryProvider;

/// Serves single-resource describe responses out of a dump directory.
///
/// Every `*.json` file below the directory that carries one of the
/// describe collections is indexed by resource id. Later files win for
/// duplicate ids. Files that are not JSON or not a describe response are
/// skipped.
#[derive(Clone, Default)]
pub struct DumpInventory {
    instances: HashMap<String, RawInstance>,
    vpcs: HashMap<String, RawVpc>,
    subnets: HashMap<String, RawSubnet>,
    security_groups: HashMap<String, RawSecurityGroup>,
    /// Every id requested, as `<kind>:<id>`, in call order.
    queries: Arc<RwLock<Vec<String>>>,
}

impl DumpInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every dump below `dir`.
    pub fn load(dir: impl AsRef<Path>) -> CloudResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(CloudError::not_found("dump directory", dir.display().to_string()));
        }

        let mut inventory = Self::new();
        let mut files = 0usize;

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        {
            let path = entry.path();
            let content = fs::read_to_string(path)?;
            let value: serde_json::Value = match serde_json::from_str(&content) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    continue;
                }
            };

            match RawPayload::from_value(value) {
                Ok(Some(payload)) => {
                    inventory.add(payload);
                    files += 1;
                }
                Ok(None) => debug!("Skipping {:?}: not a describe response", path),
                Err(e) => warn!("Skipping {:?}: {}", path, e),
            }
        }

        info!(
            "Loaded {} dump files from {:?} ({} instances, {} vpcs, {} subnets, {} security groups)",
            files,
            dir,
            inventory.instances.len(),
            inventory.vpcs.len(),
            inventory.subnets.len(),
            inventory.security_groups.len()
        );
        Ok(inventory)
    }

    /// Index every identifiable record of a payload.
    pub fn add(&mut self, payload: RawPayload) {
        match payload {
            RawPayload::Instances(response) => {
                for raw in response.reservations.into_iter().flat_map(|r| r.instances) {
                    if let Some(id) = raw.instance_id.clone() {
                        self.instances.insert(id, raw);
                    }
                }
            }
            RawPayload::Vpcs(response) => {
                for raw in response.vpcs {
                    if let Some(id) = raw.vpc_id.clone() {
                        self.vpcs.insert(id, raw);
                    }
                }
            }
            RawPayload::Subnets(response) => {
                for raw in response.subnets {
                    if let Some(id) = raw.subnet_id.clone() {
                        self.subnets.insert(id, raw);
                    }
                }
            }
            RawPayload::SecurityGroups(response) => {
                for raw in response.security_groups {
                    if let Some(id) = raw.group_id.clone() {
                        self.security_groups.insert(id, raw);
                    }
                }
            }
        }
    }

    /// Get all recorded queries.
    pub fn queries(&self) -> Vec<String> {
        self.queries.read().clone()
    }

    /// Number of times a `<kind>:<id>` key was requested.
    pub fn query_count(&self, key: &str) -> usize {
        self.queries.read().iter().filter(|q| *q == key).count()
    }

    fn record_query(&self, kind: &str, id: &str) {
        self.queries.write().push(format!("{}:{}", kind, id));
    }
}

#[async_trait]
impl InventoryProvider for DumpInventory {
    async fn describe_instance(&self, instance_id: &str) -> CloudResult<DescribeInstancesResponse> {
        self.record_query("instance", instance_id);
        let raw = self
            .instances
            .get(instance_id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("instance", instance_id))?;

        Ok(DescribeInstancesResponse {
            reservations: vec![RawReservation {
                instances: vec![raw],
            }],
        })
    }

    async fn describe_vpc(&self, vpc_id: &str) -> CloudResult<DescribeVpcsResponse> {
        self.record_query("vpc", vpc_id);
        let raw = self
            .vpcs
            .get(vpc_id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("vpc", vpc_id))?;
        Ok(DescribeVpcsResponse { vpcs: vec![raw] })
    }

    async fn describe_subnet(&self, subnet_id: &str) -> CloudResult<DescribeSubnetsResponse> {
        self.record_query("subnet", subnet_id);
        let raw = self
            .subnets
            .get(subnet_id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("subnet", subnet_id))?;
        Ok(DescribeSubnetsResponse { subnets: vec![raw] })
    }

    async fn describe_security_group(
        &self,
        group_id: &str,
    ) -> CloudResult<DescribeSecurityGroupsResponse> {
        self.record_query("security-group", group_id);
        let raw = self
            .security_groups
            .get(group_id)
            .cloned()
            .ok_or_else(|| CloudError::not_found("security group", group_id))?;
        Ok(DescribeSecurityGroupsResponse {
            security_groups: vec![raw],
        })
    }
}
