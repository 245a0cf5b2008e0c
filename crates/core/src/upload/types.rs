//! Upload types and data structures.

use bytes::Bytes;
use kabox_shared::UploadSettings;
use serde::Serialize;

/// MIME type used when none is declared.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Batch limits applied by the upload service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum number of resolved items per batch.
    pub max_files: usize,
    /// Maximum size of a single item in bytes.
    pub max_file_size: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: UploadSettings::DEFAULT_MAX_FILES,
            max_file_size: UploadSettings::DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl From<&UploadSettings> for UploadLimits {
    fn from(settings: &UploadSettings) -> Self {
        Self {
            max_files: settings.max_files,
            max_file_size: settings.max_file_size,
        }
    }
}

impl UploadLimits {
    /// Maximum accepted request body size.
    ///
    /// Leaves room for one oversized item on top of a full batch, so that the
    /// oversized item is skipped instead of the whole request being rejected.
    #[must_use]
    pub fn request_body_limit(&self) -> usize {
        let per_item = usize::try_from(self.max_file_size).unwrap_or(usize::MAX);
        self.max_files
            .saturating_add(1)
            .saturating_mul(per_item)
            .saturating_add(1024 * 1024)
    }

    /// Whether an item of `size` bytes may be stored.
    #[must_use]
    pub fn allows_size(&self, size: u64) -> bool {
        size <= self.max_file_size
    }
}

/// A resolved item waiting to be stored.
#[derive(Debug, Clone)]
pub struct PendingFile {
    /// Declared or derived filename.
    pub name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File contents. Empty when the item was cut off for exceeding the limit.
    pub data: Bytes,
    /// Size in bytes.
    pub size: u64,
}

impl PendingFile {
    /// Create a pending file, defaulting the name to `file` and the MIME type
    /// to `application/octet-stream`.
    #[must_use]
    pub fn new(name: Option<String>, mime_type: Option<String>, data: Bytes) -> Self {
        Self {
            name: name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "file".to_string()),
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size: data.len() as u64,
            data,
        }
    }

    /// A placeholder for an item known to exceed the size limit.
    ///
    /// The body is dropped; only the observed size is kept so the item still
    /// counts toward the batch and is later skipped as too large.
    #[must_use]
    pub fn oversized(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: Bytes::new(),
            size,
        }
    }
}

/// Files and URLs submitted in one request.
#[derive(Debug, Clone, Default)]
pub struct UploadSubmission {
    /// Directly uploaded files.
    pub files: Vec<PendingFile>,
    /// Remote URLs to fetch.
    pub urls: Vec<String>,
}

impl UploadSubmission {
    /// Submission carrying only remote URLs.
    #[must_use]
    pub fn from_urls(urls: Vec<String>) -> Self {
        Self {
            files: Vec::new(),
            urls,
        }
    }
}

/// A successfully stored file, as returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    /// Generated storage key.
    pub name: String,
    /// Public URL.
    pub url: String,
    /// Declared MIME type.
    pub mime: String,
    /// Size in bytes.
    pub size: u64,
}

/// Why an item was left out of the result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The remote URL could not be fetched.
    FetchFailed(String),
    /// The item exceeds the per-item size limit.
    TooLarge {
        /// Observed size.
        size: u64,
        /// Limit.
        max: u64,
    },
    /// The object store rejected the upload.
    StoreFailed(String),
}

/// Outcome of a single submitted item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Stored and registered.
    Stored(UploadedFile),
    /// Left out of the result set.
    Skipped {
        /// Filename or URL of the item.
        name: String,
        /// Reason.
        reason: SkipReason,
    },
}

/// Per-item outcomes of one batch, in submission order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    items: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Wrap collected outcomes.
    #[must_use]
    pub fn new(items: Vec<ItemOutcome>) -> Self {
        Self { items }
    }

    /// All outcomes.
    #[must_use]
    pub fn items(&self) -> &[ItemOutcome] {
        &self.items
    }

    /// Stored files.
    pub fn stored(&self) -> impl Iterator<Item = &UploadedFile> {
        self.items.iter().filter_map(|item| match item {
            ItemOutcome::Stored(file) => Some(file),
            ItemOutcome::Skipped { .. } => None,
        })
    }

    /// Skipped items with their reasons.
    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.items.iter().filter_map(|item| match item {
            ItemOutcome::Skipped { name, reason } => Some((name.as_str(), reason)),
            ItemOutcome::Stored(_) => None,
        })
    }

    /// Number of stored files.
    #[must_use]
    pub fn stored_count(&self) -> usize {
        self.stored().count()
    }

    /// Number of skipped items.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.items.len() - self.stored_count()
    }

    /// Consume the report, keeping only stored files.
    #[must_use]
    pub fn into_uploaded(self) -> Vec<UploadedFile> {
        self.items
            .into_iter()
            .filter_map(|item| match item {
                ItemOutcome::Stored(file) => Some(file),
                ItemOutcome::Skipped { .. } => None,
            })
            .collect()
    }
}
