//! Integration tests for assembly and index allocation.

use lift_graph::{Assembler, GraphError, IndexAllocator};
use lift_model::{Instance, Inventory, RunReport, SecurityGroup, SkipKind, Snapshot, Subnet, Vpc};

fn add_vpc(inv: &mut Inventory, id: &str) {
    inv.vpcs.insert(
        id.to_string(),
        Vpc {
            id: id.to_string(),
            cidr_block: "10.0.0.0/16".to_string(),
            tags: Vec::new(),
        },
    );
}

fn add_subnet(inv: &mut Inventory, id: &str, vpc_id: &str) {
    inv.subnets.insert(
        id.to_string(),
        Subnet {
            id: id.to_string(),
            availability_zone: "eu-west-1a".to_string(),
            cidr_block: "10.0.1.0/24".to_string(),
            vpc_id: vpc_id.to_string(),
            tags: Vec::new(),
        },
    );
}

fn add_group(inv: &mut Inventory, id: &str, vpc_id: &str) {
    inv.security_groups.insert(
        id.to_string(),
        SecurityGroup {
            id: id.to_string(),
            vpc_id: vpc_id.to_string(),
            ingress: Vec::new(),
            egress: Vec::new(),
            tags: Vec::new(),
        },
    );
}

fn add_instance(inv: &mut Inventory, id: &str, vpc_id: &str, subnet_id: &str, groups: &[&str]) {
    inv.instances.insert(
        id.to_string(),
        Instance {
            id: id.to_string(),
            instance_type: "t3.micro".to_string(),
            vpc_id: vpc_id.to_string(),
            subnet_id: subnet_id.to_string(),
            private_ip_address: String::new(),
            image_id: "ami-1".to_string(),
            tags: Vec::new(),
            security_group_ids: groups.iter().map(|g| g.to_string()).collect(),
        },
    );
}

/// Two Vpcs sharing nothing, one with two subnets and overlapping groups.
fn inventory() -> Inventory {
    let mut inv = Inventory::new();
    add_vpc(&mut inv, "vpc-a");
    add_vpc(&mut inv, "vpc-b");
    add_subnet(&mut inv, "subnet-1", "vpc-a");
    add_subnet(&mut inv, "subnet-2", "vpc-a");
    add_subnet(&mut inv, "subnet-3", "vpc-b");
    for group in ["sg-1", "sg-2", "sg-3"] {
        add_group(&mut inv, group, "vpc-a");
    }
    add_group(&mut inv, "sg-9", "vpc-b");

    add_instance(&mut inv, "i-x", "vpc-a", "subnet-1", &["sg-1", "sg-2"]);
    add_instance(&mut inv, "i-y", "vpc-a", "subnet-2", &["sg-2", "sg-3"]);
    add_instance(&mut inv, "i-z", "vpc-b", "subnet-3", &["sg-9", "sg-missing"]);
    inv
}

#[test]
fn test_inventory_to_indexed_graph() {
    let inv = inventory();
    let mut report = RunReport::new();

    let snapshot = Assembler::new(&inv).assemble(&mut report);
    let vpcs = IndexAllocator::new().allocate_all(&snapshot).unwrap();

    assert_eq!(vpcs.len(), 2);
    assert_eq!(vpcs[0].name(), "vpc-1");
    assert_eq!(vpcs[1].name(), "vpc-2");

    let a = &vpcs[0];
    assert_eq!(a.instances.len(), 2);
    assert_eq!(a.security_groups.len(), 3);
    assert_eq!(a.instances[0].security_group_indices(), vec![1, 2]);
    assert_eq!(a.instances[1].security_group_indices(), vec![2, 3]);
    assert_eq!(a.instances[1].subnet_position, 1);

    let b = &vpcs[1];
    assert_eq!(b.instances[0].index, 1);
    assert_eq!(b.instances[0].security_group_indices(), vec![1]);
    assert_eq!(b.security_group(1).unwrap().group.id, "sg-9");

    assert_eq!(report.count(SkipKind::DanglingReference), 1);
    assert!(report.items()[0].involves("sg-missing"));
}

#[test]
fn test_every_reference_has_exactly_one_definition() {
    let inv = inventory();
    let snapshot = Assembler::new(&inv).assemble(&mut RunReport::new());
    let vpcs = IndexAllocator::new().allocate_all(&snapshot).unwrap();

    for vpc in &vpcs {
        for instance in &vpc.instances {
            for index in instance.security_group_indices() {
                let definitions = vpc
                    .security_groups
                    .iter()
                    .filter(|sg| sg.index == index)
                    .count();
                assert_eq!(definitions, 1, "{} index {}", vpc.id, index);
            }
        }
        for group in &vpc.security_groups {
            assert!(vpc.reference_count(group.index) > 0);
        }
    }
}

#[test]
fn test_snapshot_file_yields_same_indices() {
    let inv = inventory();
    let snapshot = Assembler::new(&inv).assemble(&mut RunReport::new());

    let json = serde_json::to_string_pretty(&snapshot).unwrap();
    let reloaded: Snapshot = serde_json::from_str(&json).unwrap();

    let direct = IndexAllocator::new().allocate_all(&snapshot).unwrap();
    let from_file = IndexAllocator::new().allocate_all(&reloaded).unwrap();
    assert_eq!(direct, from_file);
}

#[test]
fn test_only_orphans_is_no_usable_input() {
    let mut inv = Inventory::new();
    add_subnet(&mut inv, "subnet-1", "vpc-gone");
    add_instance(&mut inv, "i-1", "vpc-gone", "subnet-1", &[]);

    let mut report = RunReport::new();
    let snapshot = Assembler::new(&inv).assemble(&mut report);
    let err = IndexAllocator::new().allocate_all(&snapshot).unwrap_err();

    assert!(matches!(err, GraphError::NoUsableInput));
    assert_eq!(report.count(SkipKind::DanglingReference), 2);
}

#[test]
fn test_group_from_other_or_unknown_vpc_is_never_declared() {
    let mut inv = inventory();
    add_group(&mut inv, "sg-orphan", "vpc-404");
    add_instance(&mut inv, "i-w", "vpc-a", "subnet-1", &["sg-1", "sg-9", "sg-orphan"]);

    let mut report = RunReport::new();
    let snapshot = Assembler::new(&inv).assemble(&mut report);
    let vpcs = IndexAllocator::new().allocate_all(&snapshot).unwrap();

    let a = &vpcs[0];
    let declared: Vec<_> = a.security_groups.iter().map(|sg| sg.group.id.as_str()).collect();
    assert_eq!(declared, vec!["sg-1", "sg-2", "sg-3"]);
    assert!(a.security_groups.iter().all(|sg| sg.group.vpc_id == "vpc-a"));

    // sg-missing from i-z, plus the two out-of-vpc references from i-w
    assert_eq!(report.count(SkipKind::DanglingReference), 3);
    assert!(report.items().iter().any(|item| item.involves("sg-9") && item.involves("vpc-b")));
    assert!(report.items().iter().any(|item| item.involves("sg-orphan") && item.involves("vpc-404")));
}
