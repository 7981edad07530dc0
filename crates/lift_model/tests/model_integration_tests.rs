//! Integration tests for normalization and the audit archive.

use std::collections::BTreeMap;

use lift_model::{
    AuditArchive, InstanceNode, Inventory, RawPayload, RunReport, SkipKind, Snapshot, SubnetNode,
    VpcNode,
};
use serde_json::json;
use tempfile::tempdir;

fn payloads() -> Vec<RawPayload> {
    let documents = vec![
        json!({
            "Reservations": [{
                "Instances": [
                    {
                        "InstanceId": "i-2",
                        "InstanceType": "t3.small",
                        "VpcId": "vpc-1",
                        "SubnetId": "subnet-a",
                        "PrivateIpAddress": "10.0.1.12",
                        "SecurityGroups": [{"GroupId": "sg-1", "GroupName": "web"}],
                        "Tags": [{"Key": "Name", "Value": "api"}]
                    },
                    {
                        "InstanceType": "t3.micro",
                        "SubnetId": "subnet-a"
                    }
                ]
            }]
        }),
        json!({"Vpcs": [{"VpcId": "vpc-1", "CidrBlock": "10.0.0.0/16"}]}),
        json!({
            "Subnets": [{
                "SubnetId": "subnet-a",
                "VpcId": "vpc-1",
                "AvailabilityZone": "eu-west-1a",
                "CidrBlock": "10.0.1.0/24"
            }]
        }),
        json!({
            "SecurityGroups": [{
                "GroupId": "sg-1",
                "VpcId": "vpc-1",
                "IpPermissions": [{
                    "FromPort": 443,
                    "ToPort": "443",
                    "IpProtocol": "tcp",
                    "IpRanges": [{"CidrIp": "0.0.0.0/0", "Description": "https"}]
                }],
                "IpPermissionsEgress": [{
                    "FromPort": "",
                    "ToPort": "",
                    "IpProtocol": "-1",
                    "IpRanges": [{"CidrIp": "0.0.0.0/0"}]
                }]
            }]
        }),
    ];

    documents
        .into_iter()
        .map(|doc| RawPayload::from_value(doc).unwrap().unwrap())
        .collect()
}

#[test]
fn test_ingest_all_resource_types() {
    let mut inventory = Inventory::new();
    let mut report = RunReport::new();

    let merged: usize = payloads()
        .iter()
        .map(|payload| inventory.ingest(payload, &mut report))
        .sum();

    assert_eq!(merged, 4);
    assert_eq!(inventory.instances.len(), 1);
    assert_eq!(inventory.instances["i-2"].security_group_ids, vec!["sg-1"]);

    let group = &inventory.security_groups["sg-1"];
    assert_eq!(group.ingress[0].from_port, 443);
    assert_eq!(group.ingress[0].to_port, 443);
    assert_eq!(group.ingress[0].description, "https");
    assert_eq!(group.egress[0].from_port, 0);
    assert_eq!(group.egress[0].protocol, "-1");

    assert_eq!(report.count(SkipKind::MalformedRecord), 1);
    assert!(report.items()[0].reason.contains("InstanceId"));
    assert!(report.items()[0].reason.contains("VpcId"));
}

#[test]
fn test_reingesting_same_payload_is_idempotent() {
    let mut inventory = Inventory::new();
    let mut report = RunReport::new();
    for payload in payloads().iter().chain(payloads().iter()) {
        inventory.ingest(payload, &mut report);
    }

    assert_eq!(inventory.instances.len(), 1);
    assert_eq!(inventory.vpcs.len(), 1);
    assert_eq!(inventory.subnets.len(), 1);
    assert_eq!(inventory.security_groups.len(), 1);
}

#[test]
fn test_archived_payloads_classify_again() {
    let dir = tempdir().unwrap();
    let archive = AuditArchive::new(dir.path());

    for payload in payloads() {
        let path = archive
            .save(payload.resource_type(), "x", &payload.to_value().unwrap())
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        let reloaded = RawPayload::from_value(value).unwrap().unwrap();
        assert_eq!(reloaded.resource_type(), payload.resource_type());
    }
}

#[test]
fn test_snapshot_round_trip_through_archive() {
    let dir = tempdir().unwrap();
    let archive = AuditArchive::new(dir.path());

    let mut instances = BTreeMap::new();
    instances.insert(
        "i-1".to_string(),
        InstanceNode {
            id: "i-1".to_string(),
            instance_type: "t3.micro".to_string(),
            private_ip_address: "10.0.1.10".to_string(),
            image_id: "ami-1".to_string(),
            tags: Vec::new(),
            security_groups: Vec::new(),
        },
    );
    let mut subnets = BTreeMap::new();
    subnets.insert(
        "subnet-a".to_string(),
        SubnetNode {
            id: "subnet-a".to_string(),
            availability_zone: "eu-west-1a".to_string(),
            cidr_block: "10.0.1.0/24".to_string(),
            vpc_id: "vpc-1".to_string(),
            tags: Vec::new(),
            instances,
        },
    );

    let mut snapshot = Snapshot::new();
    snapshot.insert(VpcNode {
        id: "vpc-1".to_string(),
        cidr_block: "10.0.0.0/16".to_string(),
        tags: Vec::new(),
        subnets,
    });

    let path = archive.save_snapshot(&snapshot).unwrap();
    assert_eq!(archive.latest_snapshot().unwrap(), path);

    let reloaded = Snapshot::read(&path).unwrap();
    assert_eq!(reloaded, snapshot);
    assert_eq!(reloaded.instance_count(), 1);
}
