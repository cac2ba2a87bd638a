pub(crate) mod enumerate;

use tracing::info;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::storage::ObjectStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub archived_objects: usize,
}

/// Public entry point for the list process: logs every Glacier key under the prefix.
pub async fn run_list_flow(store: &dyn ObjectStore, app_config: &AppConfig) -> Result<ListSummary> {
    let keys =
        enumerate::enumerate_keys(store, &app_config.bucket, &app_config.prefix, true, true).await?;
    info!("Found {} Glacier object(s)", keys.len());
    Ok(ListSummary {
        archived_objects: keys.len(),
    })
}
