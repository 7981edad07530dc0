//! Inventory collection for a set of instances.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, info};

use lift_model::{AuditArchive, Inventory, Normalizer, RawPayload, RunReport, SkipKind};

use crate::error::{CloudError, CloudResult};
use crate::provider::InventoryProvider;

/// Flat inventory plus everything skipped while building it.
#[derive(Debug, Default)]
pub struct Collection {
    pub inventory: Inventory,
    pub report: RunReport,
}

/// Fetches instances and the network resources they depend on.
///
/// Each Vpc, subnet and security group is requested at most once per
/// collector, however many instances share it.
pub struct InventoryCollector<P> {
    provider: P,
    archive: Option<AuditArchive>,
    queried: HashSet<String>,
}

impl<P: InventoryProvider> InventoryCollector<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            archive: None,
            queried: HashSet::new(),
        }
    }

    /// Archive every raw payload fetched.
    pub fn with_archive(mut self, archive: AuditArchive) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Collect the given instances and their Vpcs, subnets and groups.
    ///
    /// Unknown resources are left out; the assembler reports anything that
    /// ends up dangling. Other provider failures abort the collection.
    pub async fn collect(&mut self, instance_ids: &[String]) -> CloudResult<Collection> {
        let mut collection = Collection::default();

        for instance_id in instance_ids {
            if !self.queried.insert(instance_id.clone()) {
                debug!(instance_id = %instance_id, "Instance already collected");
                continue;
            }

            let response = match self.provider.describe_instance(instance_id).await {
                Ok(response) => response,
                Err(e) if e.is_not_found() => {
                    collection.report.record(
                        SkipKind::DanglingReference,
                        [instance_id.as_str()],
                        "instance not found by the inventory provider",
                    );
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.archive("ec2-instance", instance_id, &response)?;

            let records = Normalizer::instances(&response, &mut collection.report);
            for instance in records {
                if !instance.vpc_id.is_empty() {
                    self.fetch_vpc(&instance.vpc_id, &mut collection).await?;
                }
                if !instance.subnet_id.is_empty() {
                    self.fetch_subnet(&instance.subnet_id, &mut collection).await?;
                }
                for group_id in &instance.security_group_ids {
                    self.fetch_security_group(group_id, &mut collection).await?;
                }
                collection
                    .inventory
                    .instances
                    .insert(instance.id.clone(), instance);
            }
        }

        info!(
            "Collected {} instances, {} vpcs, {} subnets, {} security groups",
            collection.inventory.instances.len(),
            collection.inventory.vpcs.len(),
            collection.inventory.subnets.len(),
            collection.inventory.security_groups.len()
        );
        Ok(collection)
    }

    async fn fetch_vpc(&mut self, vpc_id: &str, collection: &mut Collection) -> CloudResult<()> {
        if !self.first_query(vpc_id) {
            return Ok(());
        }
        let response = self.provider.describe_vpc(vpc_id).await;
        if let Some(response) = Self::found(response, "vpc", vpc_id)? {
            self.archive("vpc", vpc_id, &response)?;
            collection
                .inventory
                .ingest(&RawPayload::Vpcs(response), &mut collection.report);
        }
        Ok(())
    }

    async fn fetch_subnet(&mut self, subnet_id: &str, collection: &mut Collection) -> CloudResult<()> {
        if !self.first_query(subnet_id) {
            return Ok(());
        }
        let response = self.provider.describe_subnet(subnet_id).await;
        if let Some(response) = Self::found(response, "subnet", subnet_id)? {
            self.archive("subnet", subnet_id, &response)?;
            collection
                .inventory
                .ingest(&RawPayload::Subnets(response), &mut collection.report);
        }
        Ok(())
    }

    async fn fetch_security_group(
        &mut self,
        group_id: &str,
        collection: &mut Collection,
    ) -> CloudResult<()> {
        if !self.first_query(group_id) {
            return Ok(());
        }
        let response = self.provider.describe_security_group(group_id).await;
        if let Some(response) = Self::found(response, "security-group", group_id)? {
            self.archive("security-group", group_id, &response)?;
            collection
                .inventory
                .ingest(&RawPayload::SecurityGroups(response), &mut collection.report);
        }
        Ok(())
    }

    fn first_query(&mut self, id: &str) -> bool {
        if self.queried.contains(id) {
            return false;
        }
        self.queried.insert(id.to_string());
        true
    }

    /// Treat `NotFound` as absence; pass other errors through.
    fn found<T>(result: CloudResult<T>, kind: &str, id: &str) -> CloudResult<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(CloudError::NotFound { .. }) => {
                debug!("{} {} not found, leaving it out", kind, id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn archive<T: Serialize>(&self, resource_type: &str, id: &str, payload: &T) -> CloudResult<()> {
        if let Some(archive) = &self.archive {
            archive.save(resource_type, id, payload)?;
        }
        Ok(())
    }
}
