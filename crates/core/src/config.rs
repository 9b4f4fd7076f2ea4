//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. The core never reads environment variables itself; binaries
//! read them once, turn them into a [`CoreConfig`], and thread it through explicitly.

use crate::constants::DEFAULT_DATA_DIR;
use crate::{CoreError, CoreResult};
use paymeta_store::{DocumentStore, LocalStore, ObjectStoreBackend, S3Settings};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Which storage backend to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StorageKind {
    #[default]
    Local,
    S3,
}

impl FromStr for StorageKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" | "filesystem" => Ok(StorageKind::Local),
            "s3" | "object" => Ok(StorageKind::S3),
            other => Err(CoreError::InvalidInput(format!(
                "unknown storage backend '{other}' (expected 'local' or 's3')"
            ))),
        }
    }
}

/// Backend selection plus the settings that backend needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageSettings {
    Local { root: PathBuf },
    S3(S3Settings),
}

impl StorageSettings {
    /// Combines a backend choice with the settings gathered for it.
    ///
    /// A missing `data_dir` falls back to [`DEFAULT_DATA_DIR`]. The S3 settings are only
    /// checked when `kind` is [`StorageKind::S3`].
    pub fn from_parts(
        kind: StorageKind,
        data_dir: Option<PathBuf>,
        s3: S3Settings,
    ) -> CoreResult<Self> {
        match kind {
            StorageKind::Local => Ok(StorageSettings::Local {
                root: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            }),
            StorageKind::S3 => {
                if s3.bucket.trim().is_empty() {
                    return Err(CoreError::InvalidInput(
                        "an S3 bucket is required for the s3 backend".into(),
                    ));
                }
                Ok(StorageSettings::S3(s3))
            }
        }
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            StorageSettings::Local { .. } => StorageKind::Local,
            StorageSettings::S3(_) => StorageKind::S3,
        }
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    storage: StorageSettings,
    public_base_url: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `public_base_url` is the externally reachable root that document URLs are built from.
    /// It must be an `http` or `https` URL; a trailing `/` is removed.
    pub fn new(storage: StorageSettings, public_base_url: String) -> CoreResult<Self> {
        let public_base_url = public_base_url.trim().trim_end_matches('/').to_string();

        if public_base_url.is_empty() {
            return Err(CoreError::InvalidInput(
                "public_base_url cannot be empty".into(),
            ));
        }
        if !public_base_url.starts_with("http://") && !public_base_url.starts_with("https://") {
            return Err(CoreError::InvalidInput(format!(
                "public_base_url must start with http:// or https://, got '{public_base_url}'"
            )));
        }

        Ok(Self {
            storage,
            public_base_url,
        })
    }

    pub fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub fn public_base_url(&self) -> &str {
        &self.public_base_url
    }
}

/// Parse the storage backend from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`StorageKind::Local`].
pub fn storage_kind_from_env_value(value: Option<String>) -> CoreResult<StorageKind> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    let parsed = value.map(|v| v.parse::<StorageKind>()).transpose()?;

    Ok(parsed.unwrap_or_default())
}

/// Opens the configured backend.
///
/// This is the only place the backend is chosen; everything downstream sees
/// `Arc<dyn DocumentStore>`.
pub fn open_store(settings: &StorageSettings) -> CoreResult<Arc<dyn DocumentStore>> {
    let store: Arc<dyn DocumentStore> = match settings {
        StorageSettings::Local { root } => Arc::new(LocalStore::new(root.clone())?),
        StorageSettings::S3(s3) => Arc::new(ObjectStoreBackend::s3(s3)?),
    };
    tracing::info!(backend = store.backend_name(), "opened document store");
    Ok(store)
}
