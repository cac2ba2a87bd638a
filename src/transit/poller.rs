// glacier-restore/src/transit/poller.rs
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::errors::{AppError, Result};
use crate::storage::{CopyOutcome, ObjectClass, ObjectStore, ProviderError, StorageClass};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitSummary {
    pub cycles: usize,
    pub transitioned: usize,
    /// Keys found already out of GLACIER and left alone.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyProgress {
    Transitioned,
    Skipped,
    Pending,
}

/// Repeats poll cycles over `keys` until none of them reports "not yet restored".
///
/// A cycle only visits keys that were still pending after the previous one, and
/// the cycles are `poll_interval` apart. Any provider error other than
/// `InvalidObjectState` aborts the loop.
///
/// The loop only ends once every restore completes. A key whose restore never
/// completes keeps it polling forever; callers are expected to have requested the
/// restore first, and cancellation is left to the process.
pub async fn poll_until_transitioned(
    store: &dyn ObjectStore,
    bucket: &str,
    keys: &[String],
    storage_class: StorageClass,
    poll_interval: Duration,
) -> Result<TransitSummary> {
    let mut summary = TransitSummary::default();
    let mut pending: Vec<&str> = keys.iter().map(String::as_str).collect();

    loop {
        summary.cycles += 1;
        let mut still_pending = Vec::new();

        for key in pending {
            match transit_once(store, bucket, key, storage_class).await? {
                KeyProgress::Transitioned => summary.transitioned += 1,
                KeyProgress::Skipped => summary.skipped += 1,
                KeyProgress::Pending => still_pending.push(key),
            }
        }

        if still_pending.is_empty() {
            break;
        }

        info!(
            "Cycle {}: {} object(s) not yet restored, retrying in {}s",
            summary.cycles,
            still_pending.len(),
            poll_interval.as_secs()
        );
        tokio::time::sleep(poll_interval).await;
        pending = still_pending;
    }

    Ok(summary)
}

async fn transit_once(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
    storage_class: StorageClass,
) -> Result<KeyProgress> {
    let transition_failed = |source: ProviderError| {
        error!("Transiting \"{}\" failed: {}", key, source);
        AppError::TransitionFailed {
            key: key.to_string(),
            source,
        }
    };

    // Objects no longer in GLACIER need no copy.
    let class = current_class(store, bucket, key)
        .await
        .map_err(transition_failed)?;
    if !class.is_archived() {
        debug!("Skipping \"{}\" because it is no longer a GLACIER object", key);
        return Ok(KeyProgress::Skipped);
    }

    debug!("Transiting \"{}\" back to storage class [{}]", key, storage_class);
    match store
        .copy_with_storage_class(bucket, key, storage_class)
        .await
        .map_err(transition_failed)?
    {
        CopyOutcome::Transitioned => {
            debug!("Transiting \"{}\" successful!", key);
            Ok(KeyProgress::Transitioned)
        }
        CopyOutcome::NotYetRestored => {
            warn!("\"{}\" is not restored yet (InvalidObjectState)", key);
            Ok(KeyProgress::Pending)
        }
    }
}

/// Lists `key` as a prefix and picks out the exact match.
async fn current_class(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> std::result::Result<ObjectClass, ProviderError> {
    let page = store.list_page(bucket, key, None).await?;
    page.records
        .into_iter()
        .find(|record| record.key == key)
        .map(|record| record.class)
        .ok_or_else(|| ProviderError::new(Some("NoSuchKey"), format!("\"{}\" is no longer listed", key)))
}
