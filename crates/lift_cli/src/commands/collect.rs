//! Collect command - Build an audit snapshot from describe dumps.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use lift_cloud::{Collection, DumpInventory, InventoryCollector};
use lift_graph::Assembler;
use lift_model::{AuditArchive, RunReport, Snapshot};

use super::output::print_report;
use crate::config::{pick_dir, LiftConfig};

#[derive(Args)]
pub struct CollectArgs {
    /// Instance ids to collect
    #[arg(required = true)]
    pub instance_ids: Vec<String>,

    /// Directory of describe-* JSON dumps
    #[arg(short, long)]
    pub dump_dir: Option<PathBuf>,

    /// Audit directory for raw payloads and the snapshot
    #[arg(short, long)]
    pub audit_dir: Option<PathBuf>,
}

pub async fn execute(args: CollectArgs, config: &LiftConfig) -> Result<()> {
    let dump_dir = pick_dir(args.dump_dir, config.dump_dir.as_ref(), "dumps");
    let archive = AuditArchive::new(pick_dir(args.audit_dir, config.audit_dir.as_ref(), "audit"));

    let collection = collect(&args.instance_ids, dump_dir, &archive).await?;
    let mut report = collection.report;
    let (snapshot, path) = save_snapshot(&collection.inventory, &archive, &mut report)?;

    println!(
        "📋 Snapshot {} - {} vpcs, {} instances",
        path.display(),
        snapshot.len(),
        snapshot.instance_count()
    );
    print_report(&report);
    Ok(())
}

/// Collect instances from a dump directory, archiving every payload.
pub async fn collect(
    instance_ids: &[String],
    dump_dir: PathBuf,
    archive: &AuditArchive,
) -> Result<Collection> {
    info!("Collecting {} instances from {:?}", instance_ids.len(), dump_dir);

    let provider = DumpInventory::load(&dump_dir)
        .with_context(|| format!("Failed to load dumps from {}", dump_dir.display()))?;
    let mut collector = InventoryCollector::new(provider).with_archive(archive.clone());

    Ok(collector.collect(instance_ids).await?)
}

/// Assemble the inventory and save the snapshot to the archive.
pub fn save_snapshot(
    inventory: &lift_model::Inventory,
    archive: &AuditArchive,
    report: &mut RunReport,
) -> Result<(Snapshot, PathBuf)> {
    let snapshot = Assembler::new(inventory).assemble(report);
    let path = archive.save_snapshot(&snapshot)?;
    Ok((snapshot, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_collect_writes_snapshot() {
        let dir = tempdir().unwrap();
        let dumps = dir.path().join("dumps");
        let audit = dir.path().join("audit");
        fs::create_dir_all(&dumps).unwrap();
        fs::write(
            dumps.join("all.json"),
            r#"{"Reservations": [{"Instances": [{"InstanceId": "i-1", "InstanceType": "t3.micro",
                "VpcId": "vpc-1", "SubnetId": "subnet-a"}]}]}"#,
        )
        .unwrap();
        fs::write(dumps.join("vpcs.json"), r#"{"Vpcs": [{"VpcId": "vpc-1", "CidrBlock": "10.0.0.0/16"}]}"#).unwrap();
        fs::write(
            dumps.join("subnets.json"),
            r#"{"Subnets": [{"SubnetId": "subnet-a", "VpcId": "vpc-1", "CidrBlock": "10.0.1.0/24"}]}"#,
        )
        .unwrap();

        let args = CollectArgs {
            instance_ids: vec!["i-1".to_string()],
            dump_dir: Some(dumps),
            audit_dir: Some(audit.clone()),
        };
        execute(args, &LiftConfig::default()).await.unwrap();

        let latest = AuditArchive::new(&audit).latest_snapshot().unwrap();
        let snapshot = Snapshot::read(latest).unwrap();
        assert_eq!(snapshot.instance_count(), 1);
    }
}
