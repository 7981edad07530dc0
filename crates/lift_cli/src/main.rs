//! regionlift CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Input error
//! - 4: Render error
//! - 5: Cloud error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;

use commands::{Cli, Commands, UsageError};
use config::LiftConfig;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const INPUT_ERROR: u8 = 3;
    pub const RENDER_ERROR: u8 = 4;
    pub const CLOUD_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LiftConfig::load(cli.config.as_deref()).map_err(|e| UsageError(format!("{:#}", e)))?;

    match cli.command {
        Commands::Collect(args) => commands::collect::execute(args, &config).await,
        Commands::Generate(args) => commands::generate::execute(args, &config).await,
        Commands::Migrate(args) => commands::migrate::execute(args, &config).await,
    }
}

fn init_logging(cli: &Cli) {
    let default_directives = if cli.verbose {
        "lift=debug,info"
    } else if cli.quiet {
        "lift=warn,warn"
    } else {
        "lift=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let (json_layer, text_layer) = if cli.log_json {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        )
    };

    let log_result = tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.is::<UsageError>() {
            return ExitCodes::INVALID_ARGS;
        }
        if cause.is::<lift_model::ModelError>() || cause.is::<lift_graph::GraphError>() {
            return ExitCodes::INPUT_ERROR;
        }
        if cause.is::<lift_iac::IacError>() {
            return ExitCodes::RENDER_ERROR;
        }
        if let Some(cloud) = cause.downcast_ref::<lift_cloud::CloudError>() {
            return match cloud {
                lift_cloud::CloudError::Model(_) => ExitCodes::INPUT_ERROR,
                lift_cloud::CloudError::NotFound { .. } | lift_cloud::CloudError::InvalidImageMap { .. } => {
                    ExitCodes::INPUT_ERROR
                }
                _ => ExitCodes::CLOUD_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}
