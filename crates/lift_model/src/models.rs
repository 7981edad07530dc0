//! Canonical resource records and the assembled resource tree.
//!
//! Flat records ([`Vpc`], [`Subnet`], [`Instance`], [`SecurityGroup`]) are what
//! the normalizer produces. Tree nodes ([`VpcNode`], [`SubnetNode`],
//! [`InstanceNode`]) are what the assembler builds from them and what the
//! snapshot file stores.
//!
//! Every keyed collection is a `BTreeMap`, so iteration is always in
//! ascending provider id order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A key/value tag attached to a cloud resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A single ingress or egress traffic rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rule {
    pub from_port: i32,
    pub to_port: i32,
    pub protocol: String,
    pub cidr_blocks: Vec<String>,
    pub ipv6_cidr_blocks: Vec<String>,
    pub description: String,
}

/// An isolated virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vpc {
    pub id: String,
    pub cidr_block: String,
    pub tags: Vec<Tag>,
}

/// An address range partition inside a Vpc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub availability_zone: String,
    pub cidr_block: String,
    /// Owning Vpc. A back-reference only.
    pub vpc_id: String,
    pub tags: Vec<Tag>,
}

/// A compute instance as reported by the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub instance_type: String,
    pub vpc_id: String,
    pub subnet_id: String,
    pub private_ip_address: String,
    /// Empty until an image has been created and copied for this instance.
    pub image_id: String,
    pub tags: Vec<Tag>,
    /// Security group ids in the order the API reported them.
    pub security_group_ids: Vec<String>,
}

/// A named set of ingress and egress rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub vpc_id: String,
    pub ingress: Vec<Rule>,
    pub egress: Vec<Rule>,
    pub tags: Vec<Tag>,
}

/// Flat canonical records keyed by provider id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    pub instances: BTreeMap<String, Instance>,
    pub vpcs: BTreeMap<String, Vpc>,
    pub subnets: BTreeMap<String, Subnet>,
    pub security_groups: BTreeMap<String, SecurityGroup>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no records of any kind were collected.
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
            && self.vpcs.is_empty()
            && self.subnets.is_empty()
            && self.security_groups.is_empty()
    }

    /// Attach resolved image ids to instances, keyed by instance id.
    ///
    /// Returns the number of instances that were updated. Ids that do not
    /// match a collected instance are ignored.
    pub fn apply_image_ids(&mut self, images: &BTreeMap<String, String>) -> usize {
        let mut applied = 0;
        for (instance_id, image_id) in images {
            if let Some(instance) = self.instances.get_mut(instance_id) {
                debug!(instance_id = %instance_id, image_id = %image_id, "Attaching image");
                instance.image_id = image_id.clone();
                applied += 1;
            }
        }
        applied
    }
}

/// An instance inside the assembled tree, carrying resolved security groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceNode {
    pub id: String,
    pub instance_type: String,
    pub private_ip_address: String,
    pub image_id: String,
    pub tags: Vec<Tag>,
    /// Resolved security group details, in reference order.
    pub security_groups: Vec<SecurityGroup>,
}

impl InstanceNode {
    pub fn security_group_ids(&self) -> impl Iterator<Item = &str> {
        self.security_groups.iter().map(|sg| sg.id.as_str())
    }
}

/// A subnet inside the assembled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetNode {
    pub id: String,
    pub availability_zone: String,
    pub cidr_block: String,
    pub vpc_id: String,
    pub tags: Vec<Tag>,
    pub instances: BTreeMap<String, InstanceNode>,
}

/// A Vpc at the root of an assembled tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcNode {
    pub id: String,
    pub cidr_block: String,
    pub tags: Vec<Tag>,
    pub subnets: BTreeMap<String, SubnetNode>,
}

impl VpcNode {
    /// Count instances across all subnets.
    pub fn instance_count(&self) -> usize {
        self.subnets.values().map(|s| s.instances.len()).sum()
    }

    /// Iterate instances in walk order: subnets by id, then instances by id.
    pub fn instances(&self) -> impl Iterator<Item = (&SubnetNode, &InstanceNode)> {
        self.subnets
            .values()
            .flat_map(|subnet| subnet.instances.values().map(move |i| (subnet, i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(id: &str) -> Instance {
        Instance {
            id: id.to_string(),
            instance_type: "t3.micro".to_string(),
            vpc_id: "vpc-1".to_string(),
            subnet_id: "subnet-1".to_string(),
            private_ip_address: String::new(),
            image_id: String::new(),
            tags: Vec::new(),
            security_group_ids: Vec::new(),
        }
    }

    #[test]
    fn test_apply_image_ids_ignores_unknown_instances() {
        let mut inventory = Inventory::new();
        inventory.instances.insert("i-1".to_string(), instance("i-1"));

        let mut images = BTreeMap::new();
        images.insert("i-1".to_string(), "ami-1".to_string());
        images.insert("i-404".to_string(), "ami-2".to_string());

        assert_eq!(inventory.apply_image_ids(&images), 1);
        assert_eq!(inventory.instances["i-1"].image_id, "ami-1");
    }

    #[test]
    fn test_vpc_node_walk_order() {
        let node = |id: &str| InstanceNode {
            id: id.to_string(),
            instance_type: "t3.micro".to_string(),
            private_ip_address: String::new(),
            image_id: String::new(),
            tags: Vec::new(),
            security_groups: Vec::new(),
        };
        let subnet = |id: &str, instances: &[&str]| SubnetNode {
            id: id.to_string(),
            availability_zone: "eu-west-1a".to_string(),
            cidr_block: "10.0.0.0/24".to_string(),
            vpc_id: "vpc-1".to_string(),
            tags: Vec::new(),
            instances: instances.iter().map(|i| (i.to_string(), node(i))).collect(),
        };

        let mut vpc = VpcNode {
            id: "vpc-1".to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            tags: Vec::new(),
            subnets: BTreeMap::new(),
        };
        vpc.subnets.insert("subnet-b".to_string(), subnet("subnet-b", &["i-a"]));
        vpc.subnets.insert("subnet-a".to_string(), subnet("subnet-a", &["i-z", "i-c"]));

        let order: Vec<_> = vpc.instances().map(|(_, i)| i.id.as_str()).collect();
        assert_eq!(order, vec!["i-c", "i-z", "i-a"]);
        assert_eq!(vpc.instance_count(), 3);
    }
}
