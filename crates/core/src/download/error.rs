//! Download error types.

use kabox_shared::AppError;
use thiserror::Error;

/// File serving failures.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The store could not produce the object, whether it is absent or the
    /// store call itself failed.
    #[error("file not found: {key}")]
    NotFound {
        /// Requested key.
        key: String,
    },
}

impl DownloadError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}

impl From<DownloadError> for AppError {
    fn from(err: DownloadError) -> Self {
        match err {
            DownloadError::NotFound { .. } => Self::NotFound("file not found".to_string()),
        }
    }
}
