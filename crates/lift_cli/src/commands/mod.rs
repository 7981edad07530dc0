//! CLI command definitions.
//!
//! Each subcommand is one stage, or all stages, of moving instances and
//! their network into another region.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use lift_iac::BackendSettings;

use crate::config::{pick, pick_dir, LiftConfig};

pub mod collect;
pub mod generate;
pub mod migrate;
pub mod output;

/// regionlift - Move EC2 instances and their network to another region
#[derive(Parser)]
#[command(name = "lift")]
#[command(version, about = "regionlift - cloud audit to Terraform for region migration")]
#[command(long_about = r#"
regionlift audits EC2 instances together with the Vpcs, subnets and
security groups they depend on, and generates one Terraform directory per
Vpc that recreates them in a destination region.

WORKFLOWS:
  collect   → Collect instances from describe dumps into an audit snapshot
  generate  → Generate Terraform from an audit snapshot
  migrate   → Collect, attach migrated image ids, and generate in one go

EXIT CODES:
  0 - Success (skipped items are reported but do not fail the run)
  1 - General error
  2 - Invalid arguments
  3 - Input error (missing or unusable snapshot or dumps)
  4 - Render error
  5 - Cloud error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Settings file (YAML)
    #[arg(short, long, global = true, env = "LIFT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect instances and their network into an audit snapshot
    Collect(collect::CollectArgs),

    /// Generate Terraform from an audit snapshot
    Generate(generate::GenerateArgs),

    /// Collect, attach migrated images and generate Terraform
    Migrate(migrate::MigrateArgs),
}

/// Bad or missing user input. Maps to the invalid-arguments exit code.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Where and how to write the Terraform output.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Destination region
    #[arg(short, long, env = "DESTINATION_REGION")]
    pub region: Option<String>,

    /// Output directory for the generated Terraform
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// S3 bucket for remote state
    #[arg(long, env = "BUCKET_NAME")]
    pub bucket: Option<String>,

    /// State key, prefixed with the Vpc name
    #[arg(long, env = "KEY")]
    pub key: Option<String>,

    /// DynamoDB table for state locking
    #[arg(long, env = "DYNAMODB_TABLE")]
    pub lock_table: Option<String>,
}

/// Target settings with flag, env and file values merged.
#[derive(Debug, Clone)]
pub struct Target {
    pub region: String,
    pub output_dir: PathBuf,
    pub backend: BackendSettings,
}

impl TargetArgs {
    pub fn resolve(self, config: &LiftConfig) -> Result<Target, UsageError> {
        let region = pick(self.region, config.destination_region.as_ref()).ok_or_else(|| {
            UsageError(
                "Destination region not set (use --region or DESTINATION_REGION)".to_string(),
            )
        })?;

        Ok(Target {
            region,
            output_dir: pick_dir(self.output_dir, config.output_dir.as_ref(), "terraform"),
            backend: BackendSettings::new(
                pick(self.bucket, config.bucket.as_ref()),
                pick(self.key, config.key.as_ref()),
                pick(self.lock_table, config.lock_table.as_ref()),
            ),
        })
    }
}
