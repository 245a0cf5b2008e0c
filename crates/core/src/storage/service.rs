//! Storage service implementation using Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Cache directive attached to every stored object and served response.
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Longest key accepted for lookups.
const MAX_KEY_LEN: usize = 255;

/// Object store boundary used by the upload and download services.
///
/// Implemented by [`StorageService`]; tests provide their own doubles.
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`.
    fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Fetch the full contents stored under `key`.
    fn download(&self, key: &str) -> impl Future<Output = Result<Bytes, StorageError>> + Send;
}

/// Storage service backed by an OpenDAL operator.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            // Supabase is served through its S3-compatible API.
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            }
            | StorageProvider::Supabase {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()
                .pipe(Ok),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl ObjectStore for StorageService {
    async fn upload(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
        cache_control: &str,
    ) -> Result<(), StorageError> {
        validate_key(key)?;

        // Options the backend cannot persist are left off; OpenDAL rejects them otherwise.
        let capability = self.operator.info().full_capability();
        let mut write = self.operator.write_with(key, data);
        if capability.write_with_content_type {
            write = write.content_type(content_type);
        }
        if capability.write_with_cache_control {
            write = write.cache_control(cache_control);
        }

        write
            .await
            .map(|_| ())
            .map_err(|e| StorageError::from_opendal(key, &e))
    }

    async fn download(&self, key: &str) -> Result<Bytes, StorageError> {
        validate_key(key)?;

        self.operator
            .read(key)
            .await
            .map(|buffer| buffer.to_bytes())
            .map_err(|e| StorageError::from_opendal(key, &e))
    }
}

/// Validate that a key addresses a single object at the bucket root.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] for empty, overlong or path-like keys.
pub fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("empty key".to_string()));
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey(format!(
            "key longer than {MAX_KEY_LEN} bytes"
        )));
    }
    if key.contains(['/', '\\']) || key.contains("..") || key.chars().any(char::is_control) {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
