// glacier-restore/src/storage/mod.rs
pub(crate) mod s3_client; // aws-sdk-s3 backed store
#[cfg(test)]
pub(crate) mod fake; // In-memory store recording every call

use async_trait::async_trait;
use std::fmt;

pub use s3_client::S3ObjectStore;

/// Storage class exactly as reported by a bucket listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectClass {
    Standard,
    StandardIa,
    OneZoneIa,
    IntelligentTiering,
    ReducedRedundancy,
    Glacier,
    GlacierIr,
    DeepArchive,
    Other(String),
}

impl ObjectClass {
    /// Maps the provider's storage class string. A missing class means STANDARD.
    pub fn from_provider(value: Option<&str>) -> Self {
        match value {
            None | Some("STANDARD") => ObjectClass::Standard,
            Some("STANDARD_IA") => ObjectClass::StandardIa,
            Some("ONEZONE_IA") => ObjectClass::OneZoneIa,
            Some("INTELLIGENT_TIERING") => ObjectClass::IntelligentTiering,
            Some("REDUCED_REDUNDANCY") => ObjectClass::ReducedRedundancy,
            Some("GLACIER") => ObjectClass::Glacier,
            Some("GLACIER_IR") => ObjectClass::GlacierIr,
            Some("DEEP_ARCHIVE") => ObjectClass::DeepArchive,
            Some(other) => ObjectClass::Other(other.to_string()),
        }
    }

    /// Only GLACIER objects are eligible for restore.
    pub fn is_archived(&self) -> bool {
        matches!(self, ObjectClass::Glacier)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub key: String,
    pub class: ObjectClass,
}

/// One page of a bucket listing.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub records: Vec<ObjectRecord>,
    pub next_continuation: Option<String>,
}

/// Glacier retrieval tier, forwarded to the provider untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Tier {
    #[value(name = "Expedited")]
    Expedited,
    #[value(name = "Standard")]
    Standard,
    #[value(name = "Bulk")]
    Bulk,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Expedited => "Expedited",
            Tier::Standard => "Standard",
            Tier::Bulk => "Bulk",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage classes an object can be transitioned back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StorageClass {
    #[value(name = "STANDARD")]
    Standard,
    #[value(name = "STANDARD_IA")]
    StandardInfrequentAccess,
    #[value(name = "ONEZONE_IA")]
    OneZoneInfrequentAccess,
    #[value(name = "INTELLIGENT_TIERING")]
    IntelligentTiering,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::StandardInfrequentAccess => "STANDARD_IA",
            StorageClass::OneZoneInfrequentAccess => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Accepted,
    AlreadyInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Transitioned,
    /// The provider rejected the copy with `InvalidObjectState`.
    NotYetRestored,
}

/// Error reported by the storage provider, with its error code when one was returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{} ({})", self.message, code),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// The four provider operations the workflow is built on.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one page of `bucket` under `prefix`, resuming from `continuation`.
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<String>,
    ) -> ProviderResult<ListPage>;

    async fn request_restore(
        &self,
        bucket: &str,
        key: &str,
        days: u32,
        tier: Tier,
    ) -> ProviderResult<RestoreOutcome>;

    /// Copy the object onto itself with a new storage class.
    async fn copy_with_storage_class(
        &self,
        bucket: &str,
        key: &str,
        class: StorageClass,
    ) -> ProviderResult<CopyOutcome>;

    /// Raw restore metadata from a metadata-only fetch, if the object carries any.
    async fn head_restore_status(&self, bucket: &str, key: &str) -> ProviderResult<Option<String>>;
}
