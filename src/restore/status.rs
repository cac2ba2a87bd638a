// glacier-restore/src/restore/status.rs
use chrono::{DateTime, FixedOffset};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::{debug, error, info, warn};

use crate::errors::{AppError, Result};
use crate::storage::ObjectStore;

// x-amz-restore: ongoing-request="false", expiry-date="Fri, 21 Dec 2012 00:00:00 GMT"
static RESTORE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*ongoing-request="(true|false)"(?:\s*,\s*expiry-date="([^"]+)")?\s*$"#)
        .expect("restore header pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreStatus {
    InProgress,
    Completed {
        expiry: Option<DateTime<FixedOffset>>,
    },
    /// Restore metadata was present but not in a recognised shape.
    Unrecognized(String),
}

impl RestoreStatus {
    pub fn parse(header: &str) -> Self {
        let Some(captures) = RESTORE_HEADER.captures(header) else {
            return RestoreStatus::Unrecognized(header.to_string());
        };
        if &captures[1] == "true" {
            return RestoreStatus::InProgress;
        }
        let expiry = match captures.get(2) {
            Some(raw) => match DateTime::parse_from_rfc2822(raw.as_str()) {
                Ok(expiry) => Some(expiry),
                Err(_) => return RestoreStatus::Unrecognized(header.to_string()),
            },
            None => None,
        };
        RestoreStatus::Completed { expiry }
    }
}

impl fmt::Display for RestoreStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreStatus::InProgress => f.write_str("restore in progress"),
            RestoreStatus::Completed { expiry: Some(expiry) } => {
                write!(f, "restored, expires {}", expiry.to_rfc2822())
            }
            RestoreStatus::Completed { expiry: None } => f.write_str("restored"),
            RestoreStatus::Unrecognized(raw) => write!(f, "unrecognized restore metadata: {}", raw),
        }
    }
}

/// Point-in-time restore status of one object. `None` means the object carries
/// no pending or completed restore metadata.
pub async fn check_status(
    store: &dyn ObjectStore,
    bucket: &str,
    key: &str,
) -> Result<Option<RestoreStatus>> {
    let header = store.head_restore_status(bucket, key).await.map_err(|source| {
        error!("Failed to fetch restore status for \"{}\": {}", key, source);
        AppError::StatusCheckFailed {
            key: key.to_string(),
            source,
        }
    })?;

    let Some(header) = header else {
        debug!("No pending or completed restore metadata present for \"{}\"", key);
        return Ok(None);
    };

    let status = RestoreStatus::parse(&header);
    match &status {
        RestoreStatus::Unrecognized(raw) => {
            warn!("Restore status for \"{}\" could not be parsed: {}", key, raw)
        }
        status => info!("Restore status for \"{}\": {}", key, status),
    }
    Ok(Some(status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fake::FakeObjectStore;
    use crate::storage::{ObjectClass, ProviderError};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_parse_in_progress() {
        assert_eq!(RestoreStatus::parse(r#"ongoing-request="true""#), RestoreStatus::InProgress);
    }

    #[test]
    fn test_parse_completed_with_expiry() {
        let status =
            RestoreStatus::parse(r#"ongoing-request="false", expiry-date="Fri, 21 Dec 2012 00:00:00 GMT""#);
        let expected = Utc.with_ymd_and_hms(2012, 12, 21, 0, 0, 0).unwrap();
        match status {
            RestoreStatus::Completed { expiry: Some(expiry) } => assert_eq!(expiry, expected),
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_parse_unrecognized() {
        assert_eq!(
            RestoreStatus::parse("garbage"),
            RestoreStatus::Unrecognized("garbage".to_string())
        );
        assert!(matches!(
            RestoreStatus::parse(r#"ongoing-request="false", expiry-date="tomorrow""#),
            RestoreStatus::Unrecognized(_)
        ));
    }

    #[tokio::test]
    async fn test_check_status_without_metadata() -> anyhow::Result<()> {
        let store = FakeObjectStore::default().with_object("a", ObjectClass::Standard);
        assert_eq!(check_status(&store, "b", "a").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_check_status_reports_header() -> anyhow::Result<()> {
        let store = FakeObjectStore::default()
            .with_object("a", ObjectClass::Glacier)
            .with_restore_header("a", r#"ongoing-request="true""#);
        assert_eq!(check_status(&store, "b", "a").await?, Some(RestoreStatus::InProgress));
        Ok(())
    }

    #[tokio::test]
    async fn test_check_status_provider_error() {
        let store = FakeObjectStore::default()
            .fail_head("a", ProviderError::new(Some("NotFound"), "Not Found"));
        let result = check_status(&store, "b", "a").await;
        assert!(matches!(result, Err(AppError::StatusCheckFailed { .. })));
    }
}
