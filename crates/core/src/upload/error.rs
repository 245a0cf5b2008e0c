//! Upload error types.

use kabox_shared::AppError;
use thiserror::Error;

/// Batch-level upload failures.
///
/// Per-item problems never surface here; they are recorded as
/// [`SkipReason`](super::SkipReason)s in the batch report.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Nothing left to store after URL resolution.
    #[error("no valid files to upload")]
    NoValidFiles,

    /// More resolved items than the batch allows.
    #[error("too many files: {count} submitted, at most {max} per upload")]
    TooManyFiles {
        /// Resolved item count.
        count: usize,
        /// Batch limit.
        max: usize,
    },

    /// Every resolved item was skipped.
    #[error("all {attempted} files failed to upload; each file must be at most {max_file_size} bytes")]
    AllFailed {
        /// Items that reached the store step.
        attempted: usize,
        /// Per-item size limit.
        max_file_size: u64,
    },
}

impl UploadError {
    /// Create a too many files error.
    #[must_use]
    pub fn too_many_files(count: usize, max: usize) -> Self {
        Self::TooManyFiles { count, max }
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::NoValidFiles => Self::Validation(err.to_string()),
            UploadError::TooManyFiles { max, .. } => {
                Self::Validation(format!("too many files: at most {max} files per upload"))
            }
            UploadError::AllFailed { max_file_size, .. } => Self::ExternalService(format!(
                "all files failed to upload; make sure each file is at most {}MB",
                max_file_size / (1024 * 1024)
            )),
        }
    }
}

/// Remote URL fetch failures.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or uses an unsupported scheme.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Remote server answered with a non-success status.
    #[error("remote server returned status {0}")]
    Status(u16),

    /// Network or protocol failure.
    #[error("request failed: {0}")]
    Request(String),

    /// HTTP client could not be built.
    #[error("http client error: {0}")]
    Client(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}
