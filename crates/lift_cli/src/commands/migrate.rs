//! Migrate command - Collect, attach migrated images and generate.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use lift_cloud::{ImageMap, ImageMigrator};
use lift_model::AuditArchive;

use super::collect::{collect, save_snapshot};
use super::generate::emit_snapshot;
use super::output::{print_emit_summary, print_report};
use super::TargetArgs;
use crate::config::{pick, pick_dir, LiftConfig};

#[derive(Args)]
pub struct MigrateArgs {
    /// Instance ids to migrate
    #[arg(required = true)]
    pub instance_ids: Vec<String>,

    /// Directory of describe-* JSON dumps
    #[arg(short, long)]
    pub dump_dir: Option<PathBuf>,

    /// YAML map of instance id to destination image id
    #[arg(short, long)]
    pub image_map: PathBuf,

    /// Audit directory for raw payloads and the snapshot
    #[arg(short, long)]
    pub audit_dir: Option<PathBuf>,

    /// Source region
    #[arg(long, env = "AWS_DEFAULT_REGION")]
    pub source_region: Option<String>,

    /// Maximum image availability checks per image
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds between image availability checks
    #[arg(long)]
    pub interval_secs: Option<u64>,

    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(args: MigrateArgs, config: &LiftConfig) -> Result<()> {
    let target = args.target.resolve(config)?;
    let source_region = pick(args.source_region, config.source_region.as_ref()).unwrap_or_default();
    let dump_dir = pick_dir(args.dump_dir, config.dump_dir.as_ref(), "dumps");
    let archive = AuditArchive::new(pick_dir(args.audit_dir, config.audit_dir.as_ref(), "audit"));

    let mut collection = collect(&args.instance_ids, dump_dir, &archive).await?;

    let images = ImageMap::load(&args.image_map)
        .with_context(|| format!("Failed to load image map {}", args.image_map.display()))?;
    let mut polling = config.polling.clone();
    polling.max_attempts = args.max_attempts.or(polling.max_attempts);
    polling.interval_secs = args.interval_secs.or(polling.interval_secs);

    info!(
        "Migrating images for {} instances from '{}' to '{}'",
        args.instance_ids.len(),
        source_region,
        target.region
    );
    let migrator = ImageMigrator::new(images, source_region, target.region.clone())
        .with_wait(polling.wait_config());
    let outcome = migrator.migrate(&args.instance_ids).await;

    let applied = collection.inventory.apply_image_ids(&outcome.images);
    println!("🖼️  {} images attached, {} failed", applied, outcome.failures.len());
    for failure in &outcome.failures {
        warn!(instance_id = %failure.instance_id, "{}", failure.reason);
        println!("   - {}: {}", failure.instance_id, failure.reason);
    }

    let mut report = collection.report;
    let (snapshot, path) = save_snapshot(&collection.inventory, &archive, &mut report)?;
    println!("📋 Snapshot {}", path.display());

    let summary = emit_snapshot(&snapshot, &target, &mut report)?;
    print_emit_summary(&summary);
    print_report(&report);
    Ok(())
}
