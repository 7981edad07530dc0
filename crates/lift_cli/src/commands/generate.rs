//! Generate command - Terraform from an audit snapshot.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use lift_graph::IndexAllocator;
use lift_iac::{EmitOptions, EmitSummary, Emitter, FsSink};
use lift_model::{AuditArchive, RunReport, Snapshot};

use super::output::{print_emit_summary, print_report};
use super::{Target, TargetArgs};
use crate::config::{pick_dir, LiftConfig};

#[derive(Args)]
pub struct GenerateArgs {
    /// Snapshot file (defaults to the latest in the audit directory)
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// Audit directory to search for the latest snapshot
    #[arg(long)]
    pub audit_dir: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,
}

pub async fn execute(args: GenerateArgs, config: &LiftConfig) -> Result<()> {
    let target = args.target.resolve(config)?;

    let path = match args.snapshot {
        Some(path) => path,
        None => {
            let audit_dir = pick_dir(args.audit_dir, config.audit_dir.as_ref(), "audit");
            AuditArchive::new(audit_dir).latest_snapshot()?
        }
    };
    info!("Generating from snapshot {:?}", path);

    let snapshot = Snapshot::read(&path)?;
    let mut report = RunReport::new();
    let summary = emit_snapshot(&snapshot, &target, &mut report)?;

    print_emit_summary(&summary);
    print_report(&report);
    Ok(())
}

/// Allocate indices for a snapshot and write its Terraform under the
/// target output directory.
pub fn emit_snapshot(
    snapshot: &Snapshot,
    target: &Target,
    report: &mut RunReport,
) -> Result<EmitSummary> {
    let vpcs = IndexAllocator::new().allocate_all(snapshot)?;

    let emitter = Emitter::new(EmitOptions::new(&target.region, target.backend.clone()));
    let mut sink = FsSink::new(&target.output_dir);
    let summary = emitter
        .emit_all(&vpcs, &mut sink, report)
        .with_context(|| format!("Failed to write Terraform to {}", target.output_dir.display()))?;

    info!("Terraform written to {:?}", target.output_dir);
    Ok(summary)
}
