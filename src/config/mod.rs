// glacier-restore/src/config/mod.rs
use clap::{Parser, ValueEnum};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{AppError, Result};
use crate::storage::{StorageClass, Tier};
use crate::utils::logging::LogLevel;

pub const DEFAULT_POLL_SECONDS: u64 = 3600; // Every hour

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    /// List Glacier objects only. No other actions will take place.
    #[value(name = "list")]
    List,
    /// List and restore. Returns immediately; the restored copies become
    /// available hours later depending on the tier.
    #[value(name = "restore")]
    Restore,
    /// List, restore and transition. Polls until every listed Glacier object
    /// has been moved to the target storage class.
    #[value(name = "transit")]
    Transit,
    /// Check the restore status of every object under the prefix.
    #[value(name = "check_restore")]
    CheckRestore,
}

#[derive(Debug, Parser)]
#[command(name = "glacier-restore")]
#[command(about = "Restore glacier objects helper")]
pub struct Cli {
    /// Operation to perform
    #[arg(value_enum)]
    pub op: Operation,

    /// Bucket to perform operations on
    #[arg(short = 'b', long = "bucket")]
    pub bucket: String,

    /// Prefix to perform operations recursively on
    #[arg(short = 'p', long = "prefix", default_value = "")]
    pub prefix: String,

    /// Logging level to set
    #[arg(short = 'l', long = "log_level", value_enum, default_value_t = LogLevel::Debug)]
    pub log_level: LogLevel,

    /// (restore | transit) Number of days to restore the Glacier object for
    #[arg(long)]
    pub days: Option<String>,

    /// (restore | transit) Glacier restore tier
    #[arg(long, value_enum)]
    pub tier: Option<Tier>,

    /// (transit) Storage class to transit back to
    #[arg(long = "storage-class", value_enum)]
    pub storage_class: Option<StorageClass>,

    /// (transit) Polling interval in seconds to retry transition
    #[arg(long = "poll", default_value_t = DEFAULT_POLL_SECONDS)]
    pub poll_seconds: u64,

    /// (restore | transit) Abort when a restore is already in progress
    #[arg(long)]
    pub fail_on_conflict: bool,

    /// (restore | transit) Abort on the first failed restore request
    #[arg(long)]
    pub fail_on_error: bool,

    /// JSON file with an `s3_storage` connection section
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Region override
    #[arg(long)]
    pub region: Option<String>,

    /// Endpoint override for S3-compatible stores
    #[arg(long = "endpoint-url")]
    pub endpoint_url: Option<String>,
}

// Structs for deserializing the optional connection file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JsonS3StorageConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJsonConfig {
    pub s3_storage: Option<JsonS3StorageConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Connection overrides layered on top of the AWS default provider chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub credentials: Option<StaticCredentials>,
    pub force_path_style: bool,
}

/// What to do when the provider reports a restore already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    #[default]
    ContinueOnConflict,
    Abort,
}

/// What to do when a restore request fails for any other reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    ContinueOnError,
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreConfig {
    pub days: u32,
    pub tier: Tier,
    pub conflict_policy: ConflictPolicy,
    pub error_policy: ErrorPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitConfig {
    pub restore: RestoreConfig,
    pub storage_class: StorageClass,
    pub poll_interval: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationConfig {
    List,
    Restore(RestoreConfig),
    Transit(TransitConfig),
    CheckRestore,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bucket: String,
    pub prefix: String,
    pub operation: OperationConfig,
    pub connection: ConnectionConfig,
}

impl AppConfig {
    /// Validates the parsed arguments and loads the connection file, if any.
    /// Nothing here touches the network.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        if cli.bucket.trim().is_empty() {
            return Err(AppError::ValidationFailed("--bucket cannot be empty".to_string()));
        }

        let operation = match cli.op {
            Operation::List => OperationConfig::List,
            Operation::CheckRestore => OperationConfig::CheckRestore,
            Operation::Restore => OperationConfig::Restore(restore_config_from_cli(cli)?),
            Operation::Transit => {
                let restore = restore_config_from_cli(cli)?;
                let storage_class = cli.storage_class.ok_or_else(|| {
                    AppError::ValidationFailed("--storage-class must be set".to_string())
                })?;
                if cli.poll_seconds == 0 {
                    return Err(AppError::ValidationFailed(
                        "--poll must be a positive number of seconds".to_string(),
                    ));
                }
                OperationConfig::Transit(TransitConfig {
                    restore,
                    storage_class,
                    poll_interval: Duration::from_secs(cli.poll_seconds),
                })
            }
        };

        let connection = load_connection_config(
            cli.config.as_deref(),
            cli.region.clone(),
            cli.endpoint_url.clone(),
        )?;

        Ok(AppConfig {
            bucket: cli.bucket.clone(),
            prefix: cli.prefix.clone(),
            operation,
            connection,
        })
    }
}

fn restore_config_from_cli(cli: &Cli) -> Result<RestoreConfig> {
    let days = parse_days(cli.days.as_deref())?;
    let tier = cli
        .tier
        .ok_or_else(|| AppError::ValidationFailed("--tier must be set".to_string()))?;

    Ok(RestoreConfig {
        days,
        tier,
        conflict_policy: if cli.fail_on_conflict {
            ConflictPolicy::Abort
        } else {
            ConflictPolicy::ContinueOnConflict
        },
        error_policy: if cli.fail_on_error {
            ErrorPolicy::Abort
        } else {
            ErrorPolicy::ContinueOnError
        },
    })
}

/// `--days` must be a string of digits naming a positive number that the
/// provider accepts (a signed 32-bit day count).
pub fn parse_days(raw: Option<&str>) -> Result<u32> {
    let raw = raw.ok_or_else(|| AppError::ValidationFailed("--days must be set".to_string()))?;
    let digits = Regex::new(r"^[0-9]+$")
        .map_err(|e| AppError::Config(format!("Invalid days pattern: {}", e)))?;
    if !digits.is_match(raw) {
        return Err(AppError::ValidationFailed(format!(
            "--days must be set to an integer, got \"{}\"",
            raw
        )));
    }
    let days: i32 = raw.parse().map_err(|_| {
        AppError::ValidationFailed(format!(
            "--days is out of range (at most {}): {}",
            i32::MAX,
            raw
        ))
    })?;
    match u32::try_from(days) {
        Ok(days) if days > 0 => Ok(days),
        _ => Err(AppError::ValidationFailed(
            "--days must be a positive integer".to_string(),
        )),
    }
}

/// Reads the optional JSON connection file and applies the CLI overrides on top.
pub fn load_connection_config(
    config_path: Option<&Path>,
    region: Option<String>,
    endpoint_url: Option<String>,
) -> Result<ConnectionConfig> {
    let raw = match config_path {
        Some(path) => load_raw_json_config(path)?,
        None => RawJsonConfig::default(),
    };
    let s3_raw = raw.s3_storage.unwrap_or_default();

    let non_empty = |value: Option<String>| value.filter(|s| !s.trim().is_empty());

    let credentials = match (
        non_empty(s3_raw.access_key_id),
        non_empty(s3_raw.secret_access_key),
    ) {
        (Some(access_key_id), Some(secret_access_key)) => Some(StaticCredentials {
            access_key_id,
            secret_access_key,
        }),
        (None, None) => None,
        _ => {
            return Err(AppError::Config(
                "s3_storage must set both access_key_id and secret_access_key, or neither"
                    .to_string(),
            ));
        }
    };

    Ok(ConnectionConfig {
        region: non_empty(region).or(non_empty(s3_raw.region)),
        endpoint_url: non_empty(endpoint_url).or(non_empty(s3_raw.endpoint_url)),
        credentials,
        force_path_style: s3_raw.force_path_style.unwrap_or(false),
    })
}

fn load_raw_json_config(config_path: &Path) -> Result<RawJsonConfig> {
    let config_content = fs::read_to_string(config_path).map_err(|e| {
        AppError::Config(format!(
            "Failed to read config file at {}: {}",
            config_path.display(),
            e
        ))
    })?;
    let raw: RawJsonConfig = serde_json::from_str(&config_content)?;
    Ok(raw)
}
