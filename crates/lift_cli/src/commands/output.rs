//! Console output shared by the commands.

use lift_iac::EmitSummary;
use lift_model::{RunReport, SkipKind};

pub fn print_report(report: &RunReport) {
    if report.is_empty() {
        println!("✅ Nothing skipped");
        return;
    }

    println!("⚠️  {} items skipped:", report.len());
    for kind in [
        SkipKind::MalformedRecord,
        SkipKind::DanglingReference,
        SkipKind::MissingSubstitution,
        SkipKind::MissingBackendConfig,
    ] {
        for item in report.of_kind(kind) {
            println!("   - {}", item);
        }
    }
}

pub fn print_emit_summary(summary: &EmitSummary) {
    println!("🏗️  Generated Terraform:");
    for vpc in &summary.vpcs {
        println!(
            "   {} ({}) - {} instances, {} security groups, {} artifacts{}",
            vpc.directory,
            vpc.vpc_id,
            vpc.instances_written,
            vpc.security_groups_written,
            vpc.artifacts_written,
            if vpc.backend_written { ", backend" } else { "" }
        );
    }
    println!(
        "   Total: {} vpcs, {} instances, {} security groups, {} artifacts",
        summary.vpcs.len(),
        summary.instances_written(),
        summary.security_groups_written(),
        summary.artifacts_written()
    );
}
