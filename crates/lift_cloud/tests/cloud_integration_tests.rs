//! Integration tests for collection and image migration.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use lift_cloud::{DumpInventory, ImageMap, ImageMigrator, InventoryCollector, WaitConfig};
use lift_model::{AuditArchive, SkipKind};
use tempfile::tempdir;

fn write_dumps(dir: &Path) {
    fs::write(
        dir.join("describe-instances.json"),
        r#"{
  "Reservations": [
    {
      "Instances": [
        {
          "InstanceId": "i-web",
          "InstanceType": "t3.small",
          "VpcId": "vpc-1",
          "SubnetId": "subnet-a",
          "PrivateIpAddress": "10.0.1.5",
          "SecurityGroups": [{"GroupId": "sg-web"}, {"GroupId": "sg-ssh"}]
        },
        {
          "InstanceId": "i-db",
          "InstanceType": "r6g.large",
          "VpcId": "vpc-1",
          "SubnetId": "subnet-b",
          "SecurityGroups": [{"GroupId": "sg-ssh"}, {"GroupId": "sg-gone"}]
        }
      ]
    }
  ]
}"#,
    )
    .unwrap();
    fs::write(
        dir.join("describe-vpcs.json"),
        r#"{"Vpcs": [{"VpcId": "vpc-1", "CidrBlock": "10.0.0.0/16"}]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("describe-subnets.json"),
        r#"{"Subnets": [
            {"SubnetId": "subnet-a", "VpcId": "vpc-1", "CidrBlock": "10.0.1.0/24", "AvailabilityZone": "us-east-1a"},
            {"SubnetId": "subnet-b", "VpcId": "vpc-1", "CidrBlock": "10.0.2.0/24", "AvailabilityZone": "us-east-1b"}
        ]}"#,
    )
    .unwrap();
    fs::write(
        dir.join("describe-security-groups.json"),
        r#"{"SecurityGroups": [
            {"GroupId": "sg-web", "VpcId": "vpc-1", "IpPermissions": [{"FromPort": 80, "ToPort": 80, "IpProtocol": "tcp"}]},
            {"GroupId": "sg-ssh", "VpcId": "vpc-1", "IpPermissions": [{"FromPort": 22, "ToPort": 22, "IpProtocol": "tcp"}]}
        ]}"#,
    )
    .unwrap();
}

#[tokio::test]
async fn test_collect_from_dumps_with_archive() {
    let dumps = tempdir().unwrap();
    let audit = tempdir().unwrap();
    write_dumps(dumps.path());

    let provider = DumpInventory::load(dumps.path()).unwrap();
    let mut collector =
        InventoryCollector::new(provider).with_archive(AuditArchive::new(audit.path()));

    let collection = collector
        .collect(&["i-web".to_string(), "i-db".to_string()])
        .await
        .unwrap();

    let inventory = &collection.inventory;
    assert_eq!(inventory.instances.len(), 2);
    assert_eq!(inventory.subnets.len(), 2);
    assert_eq!(inventory.security_groups.len(), 2);
    assert_eq!(collector.provider().query_count("security-group:sg-ssh"), 1);
    assert_eq!(collector.provider().query_count("security-group:sg-gone"), 1);
    assert!(collection.report.is_empty());

    let archived: Vec<String> = fs::read_dir(audit.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    // 2 instances, 1 vpc, 2 subnets, 2 groups found
    assert_eq!(archived.len(), 7);
    assert!(archived.iter().any(|n| n.starts_with("ec2-instance_i-web_")));
    assert!(archived.iter().any(|n| n.starts_with("security-group_sg-ssh_")));
}

#[tokio::test]
async fn test_migrated_images_attach_to_inventory() {
    let dumps = tempdir().unwrap();
    write_dumps(dumps.path());

    let mut collector = InventoryCollector::new(DumpInventory::load(dumps.path()).unwrap());
    let ids = vec!["i-web".to_string(), "i-db".to_string(), "i-missing".to_string()];
    let mut collection = collector.collect(&ids).await.unwrap();
    assert_eq!(collection.report.count(SkipKind::DanglingReference), 1);

    let mut images = BTreeMap::new();
    images.insert("i-web".to_string(), "ami-web".to_string());
    let migrator = ImageMigrator::new(ImageMap::new(images), "us-east-1", "eu-west-1").with_wait(
        WaitConfig {
            max_attempts: 2,
            interval: Duration::ZERO,
        },
    );
    let outcome = migrator.migrate(&ids).await;
    assert_eq!(outcome.failures.len(), 2);

    let applied = collection.inventory.apply_image_ids(&outcome.images);
    assert_eq!(applied, 1);
    assert_eq!(collection.inventory.instances["i-web"].image_id, "ami-web");
    assert_eq!(collection.inventory.instances["i-db"].image_id, "");
}
