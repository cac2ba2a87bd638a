// glacier-restore/src/restore/request.rs
use tracing::{debug, error, warn};

use crate::config::{ConflictPolicy, ErrorPolicy, RestoreConfig};
use crate::errors::{AppError, Result};
use crate::storage::{ObjectStore, ProviderError, RestoreOutcome};

/// Counts per outcome for one pass over a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub requested: usize,
    pub accepted: usize,
    pub in_progress: usize,
    pub failed: usize,
}

/// Sends one restore request per key, in order.
///
/// "Already in progress" and other provider errors are soft by default and only
/// abort the batch when the matching policy in `config` says so.
pub async fn request_restore_all(
    store: &dyn ObjectStore,
    bucket: &str,
    keys: &[String],
    config: &RestoreConfig,
) -> Result<RestoreSummary> {
    let mut summary = RestoreSummary::default();

    for key in keys {
        debug!("Restoring \"{}\"", key);
        summary.requested += 1;

        match store
            .request_restore(bucket, key, config.days, config.tier)
            .await
        {
            Ok(RestoreOutcome::Accepted) => {
                debug!("Successfully sent Restore request for \"{}\"", key);
                summary.accepted += 1;
            }
            Ok(RestoreOutcome::AlreadyInProgress) => {
                summary.in_progress += 1;
                match config.conflict_policy {
                    ConflictPolicy::ContinueOnConflict => {
                        warn!("Restore already in progress for \"{}\"", key);
                    }
                    ConflictPolicy::Abort => {
                        error!("Restore already in progress for \"{}\", aborting", key);
                        return Err(AppError::RestoreConflict {
                            key: key.clone(),
                            source: ProviderError::new(
                                Some("RestoreAlreadyInProgress"),
                                "Object restore is already in progress",
                            ),
                        });
                    }
                }
            }
            Err(source) => {
                summary.failed += 1;
                error!("Restore request for \"{}\" failed: {}", key, source);
                match config.error_policy {
                    ErrorPolicy::ContinueOnError => {
                        warn!("Continuing because errors are tolerated for restore requests");
                    }
                    ErrorPolicy::Abort => {
                        return Err(AppError::RestoreFailed {
                            key: key.clone(),
                            source,
                        });
                    }
                }
            }
        }
    }

    Ok(summary)
}
