//! Glacier Restore Tool
//!
//! Lists, restores and transitions archived S3 objects under a prefix

// glacier-restore/src/main.rs
mod config;
mod errors;
mod list;
mod restore;
mod storage;
mod transit;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use config::{AppConfig, Cli, OperationConfig};
use std::process::ExitCode;
use storage::{ObjectStore, S3ObjectStore};
use tracing::{debug, error, info, warn};

/// Main entry point for the glacier restore tool
#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine; the AWS provider chain has other sources.
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    utils::logging::init_logging(cli.log_level);

    match run_app(&cli).await {
        Ok(summary) => {
            info!("{}", summary);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app(cli: &Cli) -> Result<String> {
    // Validation happens before any client is built.
    let app_config = AppConfig::from_cli(cli).context("Invalid arguments")?;
    debug!("Bucket: {}", app_config.bucket);
    debug!("Prefix: {}", app_config.prefix);

    let store = S3ObjectStore::connect(&app_config.connection).await;

    tokio::select! {
        result = run_operation(&store, &app_config) => result,
        _ = interrupted(tokio::signal::ctrl_c()) => {
            anyhow::bail!("Interrupted before the operation completed")
        }
    }
}

/// Resolves once `signal` fires. If the handler cannot be registered the run
/// carries on without one and this never resolves.
async fn interrupted<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!("Could not listen for ctrl-c, continuing without it: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Runs the flow for the requested operation and returns its summary line.
async fn run_operation(store: &dyn ObjectStore, app_config: &AppConfig) -> Result<String> {
    let summary = match &app_config.operation {
        OperationConfig::List => {
            let listed = list::run_list_flow(store, app_config)
                .await
                .context("List process failed")?;
            format!(
                "Done listing Glacier objects! {} object(s) found",
                listed.archived_objects
            )
        }
        OperationConfig::Restore(_) => {
            let restored = restore::run_restore_flow(store, app_config)
                .await
                .context("Restore process failed")?;
            format!(
                "Done listing and restoring Glacier objects! {} requested, {} accepted, {} already in progress, {} failed",
                restored.requested, restored.accepted, restored.in_progress, restored.failed
            )
        }
        OperationConfig::Transit(_) => {
            let (restored, transited) = transit::run_transit_flow(store, app_config)
                .await
                .context("Transit process failed")?;
            format!(
                "Done listing, restoring and transiting Glacier objects! {} restore request(s), {} transitioned, {} skipped over {} cycle(s)",
                restored.requested, transited.transitioned, transited.skipped, transited.cycles
            )
        }
        OperationConfig::CheckRestore => {
            let checked = restore::run_check_restore_flow(store, app_config)
                .await
                .context("Check restore process failed")?;
            format!(
                "Done checking restore status! {} checked, {} in progress, {} restored, {} unrecognized, {} without restore metadata",
                checked.checked,
                checked.in_progress,
                checked.completed,
                checked.unrecognized,
                checked.without_metadata
            )
        }
    };
    Ok(summary)
}
