// glacier-restore/src/storage/s3_client.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::config::Region;
use s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use s3::types::{GlacierJobParameters, RestoreRequest};
use std::fmt::Debug;
use url::Url;

use super::{
    CopyOutcome, ListPage, ObjectClass, ObjectRecord, ObjectStore, ProviderError, ProviderResult,
    RestoreOutcome, StorageClass, Tier,
};
use crate::config::ConnectionConfig;

const RESTORE_ALREADY_IN_PROGRESS: &str = "RestoreAlreadyInProgress";
const INVALID_OBJECT_STATE: &str = "InvalidObjectState";

/// `ObjectStore` backed by Amazon S3 or an S3-compatible service.
pub struct S3ObjectStore {
    client: s3::Client,
}

impl S3ObjectStore {
    /// Builds a client from the default AWS provider chain, with any explicit
    /// region, endpoint or static credentials from `connection` layered on top.
    pub async fn connect(connection: &ConnectionConfig) -> Self {
        let mut loader = aws_config::defaults(s3::config::BehaviorVersion::latest());
        if let Some(region) = &connection.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &connection.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        if let Some(credentials) = &connection.credentials {
            loader = loader.credentials_provider(s3::config::Credentials::new(
                &credentials.access_key_id,
                &credentials.secret_access_key,
                None, // session_token
                None, // expiry
                "Static", // provider_name
            ));
        }
        let sdk_config = loader.load().await;

        let s3_config = s3::config::Builder::from(&sdk_config)
            .force_path_style(connection.force_path_style)
            .build();

        Self {
            client: s3::Client::from_conf(s3_config),
        }
    }
}

fn provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: Debug,
{
    let code = err.code().map(str::to_string);
    ProviderError {
        code,
        message: DisplayErrorContext(&err).to_string(),
    }
}

/// `CopySource` must be `bucket/key` with the key percent-encoded. The path
/// segment set leaves `+` alone, but S3 decodes it as a space.
fn copy_source(bucket: &str, key: &str) -> ProviderResult<String> {
    let mut url = Url::parse("s3://copy-source")
        .map_err(|e| ProviderError::new(None, format!("Failed to build copy source: {}", e)))?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::new(None, "Failed to build copy source"))?
        .pop_if_empty()
        .push(key);
    Ok(format!("{}{}", bucket, url.path().replace('+', "%2B")))
}

/// Restore errors that still count as a soft outcome; `None` means a hard error.
fn classify_restore_error(code: Option<&str>) -> Option<RestoreOutcome> {
    match code {
        Some(RESTORE_ALREADY_IN_PROGRESS) => Some(RestoreOutcome::AlreadyInProgress),
        _ => None,
    }
}

/// Copy errors that mean "retry next cycle"; `None` means a hard error.
fn classify_copy_error(code: Option<&str>) -> Option<CopyOutcome> {
    match code {
        Some(INVALID_OBJECT_STATE) => Some(CopyOutcome::NotYetRestored),
        _ => None,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> ProviderResult<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .set_continuation_token(continuation)
            .send()
            .await
            .map_err(provider_error)?;

        let records = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?;
                Some(ObjectRecord {
                    key: key.to_string(),
                    class: ObjectClass::from_provider(object.storage_class().map(|c| c.as_str())),
                })
            })
            .collect();

        Ok(ListPage {
            records,
            next_continuation: output.next_continuation_token().map(str::to_string),
        })
    }

    async fn request_restore(
        &self,
        bucket: &str,
        key: &str,
        days: u32,
        tier: Tier,
    ) -> ProviderResult<RestoreOutcome> {
        let days = i32::try_from(days)
            .map_err(|_| ProviderError::new(None, format!("Restore days out of range: {}", days)))?;
        let job_parameters = GlacierJobParameters::builder()
            .tier(s3::types::Tier::from(tier.as_str()))
            .build()
            .map_err(|e| ProviderError::new(None, e.to_string()))?;
        let request = RestoreRequest::builder()
            .days(days)
            .glacier_job_parameters(job_parameters)
            .build();

        match self
            .client
            .restore_object()
            .bucket(bucket)
            .key(key)
            .restore_request(request)
            .send()
            .await
        {
            Ok(_) => Ok(RestoreOutcome::Accepted),
            Err(err) => classify_restore_error(err.code()).ok_or_else(|| provider_error(err)),
        }
    }

    async fn copy_with_storage_class(
        &self,
        bucket: &str,
        key: &str,
        class: StorageClass,
    ) -> ProviderResult<CopyOutcome> {
        match self
            .client
            .copy_object()
            .bucket(bucket)
            .key(key)
            .copy_source(copy_source(bucket, key)?)
            .storage_class(s3::types::StorageClass::from(class.as_str()))
            .send()
            .await
        {
            Ok(_) => Ok(CopyOutcome::Transitioned),
            Err(err) => classify_copy_error(err.code()).ok_or_else(|| provider_error(err)),
        }
    }

    async fn head_restore_status(&self, bucket: &str, key: &str) -> ProviderResult<Option<String>> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(provider_error)?;
        Ok(output.restore().map(str::to_string))
    }
}
