//! Security group deduplication and cross-file index allocation.
//!
//! Indices live in three separate 1-based namespaces: Vpcs (global to the
//! run), instances (per Vpc) and security groups (per Vpc). The generated
//! files refer to each other only through these indices.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use lift_model::{SecurityGroup, Snapshot, Tag, VpcNode};

use crate::error::{GraphError, GraphResult};

/// A reference from an instance to a canonical security group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecurityGroupRef {
    pub id: String,
    pub index: usize,
}

/// The single canonical definition of a security group within a Vpc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedSecurityGroup {
    pub index: usize,
    pub group: SecurityGroup,
}

/// A subnet with its 0-based position in the Vpc's subnet list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedSubnet {
    pub position: usize,
    pub id: String,
    pub availability_zone: String,
    pub cidr_block: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedInstance {
    pub index: usize,
    pub id: String,
    pub subnet_id: String,
    /// Position of the owning subnet in [`IndexedVpc::subnets`].
    pub subnet_position: usize,
    pub instance_type: String,
    pub private_ip_address: String,
    pub image_id: String,
    pub tags: Vec<Tag>,
    pub security_groups: Vec<SecurityGroupRef>,
}

impl IndexedInstance {
    pub fn security_group_indices(&self) -> Vec<usize> {
        self.security_groups.iter().map(|r| r.index).collect()
    }
}

/// A Vpc tree with every index assigned. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedVpc {
    pub index: usize,
    pub id: String,
    pub cidr_block: String,
    pub tags: Vec<Tag>,
    pub subnets: Vec<IndexedSubnet>,
    pub instances: Vec<IndexedInstance>,
    /// Canonical definitions in index order.
    pub security_groups: Vec<IndexedSecurityGroup>,
}

impl IndexedVpc {
    /// Generated name of this Vpc, also its output directory name.
    pub fn name(&self) -> String {
        format!("vpc-{}", self.index)
    }

    pub fn security_group(&self, index: usize) -> Option<&IndexedSecurityGroup> {
        self.security_groups.iter().find(|sg| sg.index == index)
    }

    /// Number of instances referencing a security group index.
    pub fn reference_count(&self, index: usize) -> usize {
        self.instances
            .iter()
            .filter(|i| i.security_groups.iter().any(|r| r.index == index))
            .count()
    }
}

/// Per-Vpc allocation state. Dropped when the Vpc is done.
#[derive(Default)]
struct VpcScope {
    seen: HashMap<String, usize>,
    next_instance: usize,
    definitions: Vec<IndexedSecurityGroup>,
}

impl VpcScope {
    fn next_instance_index(&mut self) -> usize {
        self.next_instance += 1;
        self.next_instance
    }

    /// Index for a group id, registering a canonical definition on first sight.
    fn security_group_index(&mut self, group: &SecurityGroup) -> usize {
        if let Some(index) = self.seen.get(&group.id) {
            return *index;
        }

        let index = self.definitions.len() + 1;
        debug!(group_id = %group.id, index, "New canonical security group");
        self.seen.insert(group.id.clone(), index);
        self.definitions.push(IndexedSecurityGroup {
            index,
            group: group.clone(),
        });
        index
    }
}

/// Request-scoped allocator for one generation run.
///
/// Create one per run; the Vpc counter carries across every Vpc allocated
/// through the same instance.
#[derive(Debug, Default)]
pub struct IndexAllocator {
    next_vpc: usize,
}

impl IndexAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate every Vpc in the snapshot, in Vpc id order.
    pub fn allocate_all(&mut self, snapshot: &Snapshot) -> GraphResult<Vec<IndexedVpc>> {
        if snapshot.is_empty() {
            return Err(GraphError::NoUsableInput);
        }

        let indexed: Vec<_> = snapshot.vpcs.values().map(|vpc| self.allocate(vpc)).collect();
        info!("Allocated indices for {} vpcs", indexed.len());
        Ok(indexed)
    }

    /// Allocate one Vpc: its own index, then instances and security groups
    /// in walk order.
    pub fn allocate(&mut self, vpc: &VpcNode) -> IndexedVpc {
        self.next_vpc += 1;
        let index = self.next_vpc;
        let mut scope = VpcScope::default();

        let subnets: Vec<IndexedSubnet> = vpc
            .subnets
            .values()
            .enumerate()
            .map(|(position, subnet)| IndexedSubnet {
                position,
                id: subnet.id.clone(),
                availability_zone: subnet.availability_zone.clone(),
                cidr_block: subnet.cidr_block.clone(),
            })
            .collect();

        let mut instances = Vec::with_capacity(vpc.instance_count());
        for (position, subnet) in vpc.subnets.values().enumerate() {
            for instance in subnet.instances.values() {
                let instance_index = scope.next_instance_index();

                let mut security_groups: Vec<SecurityGroupRef> = Vec::new();
                for group in &instance.security_groups {
                    if security_groups.iter().any(|r| r.id == group.id) {
                        continue;
                    }
                    security_groups.push(SecurityGroupRef {
                        id: group.id.clone(),
                        index: scope.security_group_index(group),
                    });
                }

                instances.push(IndexedInstance {
                    index: instance_index,
                    id: instance.id.clone(),
                    subnet_id: subnet.id.clone(),
                    subnet_position: position,
                    instance_type: instance.instance_type.clone(),
                    private_ip_address: instance.private_ip_address.clone(),
                    image_id: instance.image_id.clone(),
                    tags: instance.tags.clone(),
                    security_groups,
                });
            }
        }

        debug!(
            vpc_id = %vpc.id,
            index,
            instances = instances.len(),
            security_groups = scope.definitions.len(),
            "Allocated vpc"
        );

        IndexedVpc {
            index,
            id: vpc.id.clone(),
            cidr_block: vpc.cidr_block.clone(),
            tags: vpc.tags.clone(),
            subnets,
            instances,
            security_groups: scope.definitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lift_model::{InstanceNode, SubnetNode};

    fn group(id: &str) -> SecurityGroup {
        SecurityGroup {
            id: id.to_string(),
            vpc_id: "vpc-1".to_string(),
            ingress: Vec::new(),
            egress: Vec::new(),
            tags: Vec::new(),
        }
    }

    fn instance(id: &str, groups: &[&str]) -> InstanceNode {
        InstanceNode {
            id: id.to_string(),
            instance_type: "t3.micro".to_string(),
            private_ip_address: String::new(),
            image_id: "ami-1".to_string(),
            tags: Vec::new(),
            security_groups: groups.iter().map(|g| group(g)).collect(),
        }
    }

    fn subnet(id: &str, instances: Vec<InstanceNode>) -> SubnetNode {
        SubnetNode {
            id: id.to_string(),
            availability_zone: "eu-west-1a".to_string(),
            cidr_block: "10.0.0.0/24".to_string(),
            vpc_id: "vpc-1".to_string(),
            tags: Vec::new(),
            instances: instances.into_iter().map(|i| (i.id.clone(), i)).collect(),
        }
    }

    fn vpc(id: &str, subnets: Vec<SubnetNode>) -> VpcNode {
        VpcNode {
            id: id.to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            tags: Vec::new(),
            subnets: subnets.into_iter().map(|s| (s.id.clone(), s)).collect(),
        }
    }

    #[test]
    fn test_two_subnet_scenario() {
        let tree = vpc(
            "vpc-1",
            vec![
                subnet("subnet-a", vec![instance("i-x", &["sg-1", "sg-2"])]),
                subnet("subnet-b", vec![instance("i-y", &["sg-2", "sg-3"])]),
            ],
        );

        let indexed = IndexAllocator::new().allocate(&tree);

        assert_eq!(indexed.index, 1);
        assert_eq!(indexed.instances[0].id, "i-x");
        assert_eq!(indexed.instances[0].index, 1);
        assert_eq!(indexed.instances[1].id, "i-y");
        assert_eq!(indexed.instances[1].index, 2);

        let ids: Vec<_> = indexed
            .security_groups
            .iter()
            .map(|sg| (sg.group.id.as_str(), sg.index))
            .collect();
        assert_eq!(ids, vec![("sg-1", 1), ("sg-2", 2), ("sg-3", 3)]);

        assert_eq!(indexed.instances[0].security_group_indices(), vec![1, 2]);
        assert_eq!(indexed.instances[1].security_group_indices(), vec![2, 3]);
        assert_eq!(indexed.instances[1].subnet_position, 1);
        assert_eq!(indexed.reference_count(2), 2);
    }

    #[test]
    fn test_vpc_counter_spans_run_but_scopes_reset() {
        let mut snapshot = Snapshot::new();
        snapshot.insert(vpc("vpc-b", vec![subnet("s-1", vec![instance("i-1", &["sg-9"])])]));
        snapshot.insert(vpc("vpc-a", vec![subnet("s-2", vec![instance("i-2", &["sg-9"])])]));

        let indexed = IndexAllocator::new().allocate_all(&snapshot).unwrap();

        assert_eq!(indexed[0].id, "vpc-a");
        assert_eq!(indexed[0].index, 1);
        assert_eq!(indexed[1].id, "vpc-b");
        assert_eq!(indexed[1].index, 2);
        for vpc in &indexed {
            assert_eq!(vpc.instances[0].index, 1);
            assert_eq!(vpc.security_groups.len(), 1);
            assert_eq!(vpc.security_groups[0].index, 1);
        }
    }

    #[test]
    fn test_repeated_reference_in_one_instance_counts_once() {
        let tree = vpc("vpc-1", vec![subnet("s-1", vec![instance("i-1", &["sg-1", "sg-1"])])]);

        let indexed = IndexAllocator::new().allocate(&tree);
        assert_eq!(indexed.instances[0].security_group_indices(), vec![1]);
        assert_eq!(indexed.security_groups.len(), 1);
    }

    #[test]
    fn test_empty_snapshot_is_fatal() {
        let err = IndexAllocator::new().allocate_all(&Snapshot::new()).unwrap_err();
        assert!(matches!(err, GraphError::NoUsableInput));
    }

    #[test]
    fn test_vpc_without_instances_still_indexed() {
        let tree = vpc("vpc-1", vec![subnet("s-1", Vec::new())]);
        let indexed = IndexAllocator::new().allocate(&tree);
        assert!(indexed.instances.is_empty());
        assert!(indexed.security_groups.is_empty());
        assert_eq!(indexed.subnets.len(), 1);
    }
}
