//! Hierarchical assembly of flat records into Vpc trees.

use std::collections::BTreeMap;

use tracing::{debug, info};

use lift_model::{
    Instance, InstanceNode, Inventory, RunReport, SecurityGroup, SkipKind, Snapshot, SubnetNode,
    VpcNode,
};

/// Joins canonical records into one tree per referenced Vpc.
///
/// A child whose parent is missing is left out of the tree and reported as
/// [`SkipKind::DanglingReference`]. It is never attached to another parent.
pub struct Assembler<'a> {
    inventory: &'a Inventory,
}

impl<'a> Assembler<'a> {
    pub fn new(inventory: &'a Inventory) -> Self {
        Self { inventory }
    }

    /// Build the snapshot tree.
    pub fn assemble(&self, report: &mut RunReport) -> Snapshot {
        let mut snapshot = Snapshot::new();

        self.attach_subnets(&mut snapshot, report);
        self.attach_instances(&mut snapshot, report);

        for vpc_id in self.inventory.vpcs.keys() {
            if !snapshot.vpcs.contains_key(vpc_id) {
                debug!(vpc_id = %vpc_id, "Vpc has no subnets, leaving it out");
            }
        }

        info!(
            "Assembled {} vpcs with {} instances",
            snapshot.len(),
            snapshot.instance_count()
        );
        snapshot
    }

    fn attach_subnets(&self, snapshot: &mut Snapshot, report: &mut RunReport) {
        for subnet in self.inventory.subnets.values() {
            let Some(vpc) = self.inventory.vpcs.get(&subnet.vpc_id) else {
                report.record(
                    SkipKind::DanglingReference,
                    [subnet.id.as_str(), subnet.vpc_id.as_str()],
                    "subnet references a vpc that is not in the snapshot",
                );
                continue;
            };

            let node = snapshot
                .vpcs
                .entry(vpc.id.clone())
                .or_insert_with(|| VpcNode {
                    id: vpc.id.clone(),
                    cidr_block: vpc.cidr_block.clone(),
                    tags: vpc.tags.clone(),
                    subnets: BTreeMap::new(),
                });

            node.subnets.insert(
                subnet.id.clone(),
                SubnetNode {
                    id: subnet.id.clone(),
                    availability_zone: subnet.availability_zone.clone(),
                    cidr_block: subnet.cidr_block.clone(),
                    vpc_id: subnet.vpc_id.clone(),
                    tags: subnet.tags.clone(),
                    instances: BTreeMap::new(),
                },
            );
        }
    }

    fn attach_instances(&self, snapshot: &mut Snapshot, report: &mut RunReport) {
        for instance in self.inventory.instances.values() {
            let Some(subnet) = self.inventory.subnets.get(&instance.subnet_id) else {
                report.record(
                    SkipKind::DanglingReference,
                    [instance.id.as_str(), instance.subnet_id.as_str()],
                    "instance references a subnet that is not in the snapshot",
                );
                continue;
            };

            if subnet.vpc_id != instance.vpc_id {
                report.record(
                    SkipKind::DanglingReference,
                    [instance.id.as_str(), instance.vpc_id.as_str(), subnet.id.as_str()],
                    format!("instance vpc does not own its subnet (subnet belongs to {})", subnet.vpc_id),
                );
                continue;
            }

            let Some(subnet_node) = snapshot
                .vpcs
                .get_mut(&subnet.vpc_id)
                .and_then(|vpc| vpc.subnets.get_mut(&subnet.id))
            else {
                report.record(
                    SkipKind::DanglingReference,
                    [instance.id.as_str(), subnet.id.as_str()],
                    "instance subnet was excluded from the tree",
                );
                continue;
            };

            let security_groups = self.resolve_security_groups(instance, report);

            subnet_node.instances.insert(
                instance.id.clone(),
                InstanceNode {
                    id: instance.id.clone(),
                    instance_type: instance.instance_type.clone(),
                    private_ip_address: instance.private_ip_address.clone(),
                    image_id: instance.image_id.clone(),
                    tags: instance.tags.clone(),
                    security_groups,
                },
            );
        }
    }

    /// Resolve an instance's group ids to full definitions.
    ///
    /// Unknown ids and groups owned by another or an unknown Vpc are dropped.
    fn resolve_security_groups(&self, instance: &Instance, report: &mut RunReport) -> Vec<SecurityGroup> {
        instance
            .security_group_ids
            .iter()
            .filter_map(|group_id| {
                let Some(group) = self.inventory.security_groups.get(group_id) else {
                    report.record(
                        SkipKind::DanglingReference,
                        [instance.id.as_str(), group_id.as_str()],
                        "security group not found, dropped from instance",
                    );
                    return None;
                };

                if !self.inventory.vpcs.contains_key(&group.vpc_id) {
                    report.record(
                        SkipKind::DanglingReference,
                        [instance.id.as_str(), group.id.as_str(), group.vpc_id.as_str()],
                        "security group references a vpc that is not in the snapshot",
                    );
                    return None;
                }

                if group.vpc_id != instance.vpc_id {
                    report.record(
                        SkipKind::DanglingReference,
                        [instance.id.as_str(), group.id.as_str(), group.vpc_id.as_str()],
                        format!("security group belongs to another vpc than its instance ({})", instance.vpc_id),
                    );
                    return None;
                }

                Some(group.clone())
            })
            .collect()
    }
}
