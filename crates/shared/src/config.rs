//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Object storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Upload limits and remote fetch settings.
    #[serde(default)]
    pub upload: UploadSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Explicit public base URL for returned file links.
    ///
    /// When unset, the base is derived from forwarding headers of each request.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_base_url: None,
        }
    }
}

impl ServerConfig {
    /// Returns the configured public base URL without a trailing slash.
    #[must_use]
    pub fn public_base_url(&self) -> Option<&str> {
        self.public_base_url
            .as_deref()
            .map(|url| url.trim().trim_end_matches('/'))
            .filter(|url| !url.is_empty())
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Object storage backend kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// S3-compatible service (AWS S3, Cloudflare R2, MinIO).
    S3,
    /// Supabase Storage through its S3-compatible endpoint.
    Supabase,
    /// Local filesystem (development only).
    #[default]
    Fs,
    /// In-process memory (tests only).
    Memory,
}

/// Object storage configuration.
///
/// Fields not used by the selected backend are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend kind.
    #[serde(default)]
    pub backend: StorageBackend,
    /// Bucket name.
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Service endpoint URL (S3 and Supabase).
    #[serde(default)]
    pub endpoint: Option<String>,
    /// S3 access key ID (S3 and Supabase).
    #[serde(default)]
    pub access_key_id: Option<String>,
    /// S3 secret access key (S3 and Supabase).
    #[serde(default)]
    pub secret_access_key: Option<String>,
    /// Region (S3 and Supabase).
    #[serde(default = "default_region")]
    pub region: String,
    /// Filesystem root directory.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            region: default_region(),
            root: default_root(),
        }
    }
}

fn default_bucket() -> String {
    "kabox-files".to_string()
}

fn default_region() -> String {
    "auto".to_string()
}

fn default_root() -> String {
    "./storage".to_string()
}

/// Upload limits and remote fetch settings.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Maximum number of resolved items per batch.
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Maximum size of a single item in bytes.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Timeout for remote URL fetches in seconds.
    #[serde(default)]
    pub fetch_timeout_secs: Option<u64>,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            max_file_size: default_max_file_size(),
            fetch_timeout_secs: None,
        }
    }
}

impl UploadSettings {
    /// Default per-item limit: 50 MiB.
    pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
    /// Default batch limit.
    pub const DEFAULT_MAX_FILES: usize = 3;
}

fn default_max_files() -> usize {
    UploadSettings::DEFAULT_MAX_FILES
}

fn default_max_file_size() -> u64 {
    UploadSettings::DEFAULT_MAX_FILE_SIZE
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KABOX").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
