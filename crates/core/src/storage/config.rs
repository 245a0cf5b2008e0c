//! Storage configuration types.

use std::path::PathBuf;

use kabox_shared::{StorageBackend, StorageSettings};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Region.
        region: String,
    },
    /// Supabase Storage, reached through its S3-compatible endpoint
    Supabase {
        /// S3 endpoint URL (`<project>/storage/v1/s3`).
        endpoint: String,
        /// Bucket name.
        bucket: String,
        /// S3 access key ID issued by Supabase.
        access_key_id: String,
        /// S3 secret access key issued by Supabase.
        secret_access_key: String,
        /// Project region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests only)
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider.
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create Supabase Storage provider.
    ///
    /// `endpoint` may be the project URL or its S3 endpoint; the S3 path is
    /// appended when missing.
    #[must_use]
    pub fn supabase(
        endpoint: &str,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::Supabase {
            endpoint: supabase_s3_endpoint(endpoint),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Build a provider from application settings.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a credential required by the selected
    /// backend is missing.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, StorageError> {
        fn required(value: Option<&String>, name: &str) -> Result<String, StorageError> {
            value
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or_else(|| StorageError::configuration(format!("storage.{name} is required")))
        }

        match settings.backend {
            StorageBackend::S3 => Ok(Self::s3(
                required(settings.endpoint.as_ref(), "endpoint")?,
                &settings.bucket,
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                &settings.region,
            )),
            StorageBackend::Supabase => Ok(Self::supabase(
                &required(settings.endpoint.as_ref(), "endpoint")?,
                &settings.bucket,
                required(settings.access_key_id.as_ref(), "access_key_id")?,
                required(settings.secret_access_key.as_ref(), "secret_access_key")?,
                &settings.region,
            )),
            StorageBackend::Fs => Ok(Self::local_fs(&settings.root)),
            StorageBackend::Memory => Ok(Self::Memory),
        }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::Supabase { .. } => "supabase",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } | Self::Supabase { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
            Self::Memory => "memory",
        }
    }
}

/// Path of the S3-compatible API under a Supabase project URL.
const SUPABASE_S3_PATH: &str = "/storage/v1/s3";

fn supabase_s3_endpoint(endpoint: &str) -> String {
    let endpoint = endpoint.trim().trim_end_matches('/');
    if endpoint.ends_with(SUPABASE_S3_PATH) {
        endpoint.to_string()
    } else {
        format!("{endpoint}{SUPABASE_S3_PATH}")
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
}

impl StorageConfig {
    /// Create a new storage config.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self { provider }
    }

    /// In-memory storage config for tests and local experiments.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(StorageProvider::Memory)
    }
}
