// glacier-restore/src/list/enumerate.rs
use tracing::{debug, error};

use crate::errors::{AppError, Result};
use crate::storage::ObjectStore;

/// Pages through every object under `prefix` and returns the matching keys in
/// listing order. With `archived_only` set, only GLACIER objects are kept.
///
/// There is no retry: the first listing failure aborts the enumeration.
pub async fn enumerate_keys(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    archived_only: bool,
    log_keys: bool,
) -> Result<Vec<String>> {
    let mut keys = Vec::new();
    let mut continuation: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = store
            .list_page(bucket, prefix, continuation.take())
            .await
            .map_err(|source| {
                error!("Failed to list s3://{}/{}: {}", bucket, prefix, source);
                AppError::EnumerationFailed {
                    bucket: bucket.to_string(),
                    source,
                }
            })?;
        pages += 1;

        for record in page.records {
            if archived_only && !record.class.is_archived() {
                continue;
            }
            if log_keys {
                debug!("{}", record.key);
            }
            keys.push(record.key);
        }

        match page.next_continuation {
            Some(token) => continuation = Some(token),
            None => break,
        }
    }

    debug!(
        "Listed {} matching object(s) under s3://{}/{} in {} page(s)",
        keys.len(),
        bucket,
        prefix,
        pages
    );
    Ok(keys)
}
