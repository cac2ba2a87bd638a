pub(crate) mod poller;

use tracing::info;

use crate::config::{AppConfig, OperationConfig};
use crate::errors::{AppError, Result};
use crate::list::enumerate::enumerate_keys;
use crate::restore::RestoreSummary;
use crate::restore::request::request_restore_all;
use crate::storage::ObjectStore;

use poller::TransitSummary;

/// Public entry point for the transit process.
///
/// The batch is listed once up front; restore requests go out for all of it and
/// the same batch is then polled until every object has left GLACIER.
pub async fn run_transit_flow(
    store: &dyn ObjectStore,
    app_config: &AppConfig,
) -> Result<(RestoreSummary, TransitSummary)> {
    let transit_config = match &app_config.operation {
        OperationConfig::Transit(cfg) => cfg,
        _ => {
            return Err(AppError::Config(
                "Transit operation selected but no transit configuration found.".to_string(),
            ));
        }
    };
    info!(
        "Restore retrieval days: {}, tier: {}, transit storage class: {}, poll every {}s",
        transit_config.restore.days,
        transit_config.restore.tier,
        transit_config.storage_class,
        transit_config.poll_interval.as_secs()
    );

    let keys = enumerate_keys(store, &app_config.bucket, &app_config.prefix, true, false).await?;
    let restored =
        request_restore_all(store, &app_config.bucket, &keys, &transit_config.restore).await?;
    let transited = poller::poll_until_transitioned(
        store,
        &app_config.bucket,
        &keys,
        transit_config.storage_class,
        transit_config.poll_interval,
    )
    .await?;

    Ok((restored, transited))
}
