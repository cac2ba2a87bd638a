pub(crate) mod request; // Restore requests over a batch
pub(crate) mod status; // Point-in-time restore status

use tracing::info;

use crate::config::{AppConfig, OperationConfig};
use crate::errors::{AppError, Result};
use crate::list::enumerate::enumerate_keys;
use crate::storage::ObjectStore;

pub use request::RestoreSummary;
use status::RestoreStatus;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub checked: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub unrecognized: usize,
    pub without_metadata: usize,
}

/// Public entry point for the restore process: lists Glacier objects under the
/// prefix and requests a restore for each of them.
pub async fn run_restore_flow(
    store: &dyn ObjectStore,
    app_config: &AppConfig,
) -> Result<RestoreSummary> {
    let restore_config = match &app_config.operation {
        OperationConfig::Restore(cfg) => cfg,
        OperationConfig::Transit(cfg) => &cfg.restore,
        _ => {
            return Err(AppError::Config(
                "Restore operation selected but no restore configuration found.".to_string(),
            ));
        }
    };
    info!(
        "Restore retrieval days: {}, tier: {}",
        restore_config.days, restore_config.tier
    );

    let keys = enumerate_keys(store, &app_config.bucket, &app_config.prefix, true, false).await?;
    request::request_restore_all(store, &app_config.bucket, &keys, restore_config).await
}

/// Public entry point for the check_restore process. Lists every object under
/// the prefix, whatever its class, and reports its restore status. The first
/// failed check aborts the remaining ones.
pub async fn run_check_restore_flow(
    store: &dyn ObjectStore,
    app_config: &AppConfig,
) -> Result<StatusSummary> {
    let keys = enumerate_keys(store, &app_config.bucket, &app_config.prefix, false, false).await?;
    let mut summary = StatusSummary::default();

    for key in &keys {
        summary.checked += 1;
        match status::check_status(store, &app_config.bucket, key).await? {
            Some(RestoreStatus::InProgress) => summary.in_progress += 1,
            Some(RestoreStatus::Completed { .. }) => summary.completed += 1,
            Some(RestoreStatus::Unrecognized(_)) => summary.unrecognized += 1,
            None => summary.without_metadata += 1,
        }
    }

    Ok(summary)
}
