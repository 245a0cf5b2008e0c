//! Upload service implementation.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{error, info, warn};

use super::error::UploadError;
use super::fetch::RemoteFetcher;
use super::key::generate_key;
use super::types::{
    BatchReport, ItemOutcome, PendingFile, SkipReason, UploadLimits, UploadSubmission,
    UploadedFile,
};
use crate::registry::{MetadataRecord, MetadataRegistry};
use crate::storage::{IMMUTABLE_CACHE_CONTROL, ObjectStore};

/// Path under which stored files are served.
pub const PUBLIC_FILES_PATH: &str = "/files";

/// Public URL of `key` under `base_url`.
#[must_use]
pub fn public_url(base_url: &str, key: &str) -> String {
    format!(
        "{}{PUBLIC_FILES_PATH}/{key}",
        base_url.trim_end_matches('/')
    )
}

/// Upload orchestrator.
pub struct UploadService<S: ObjectStore> {
    store: Arc<S>,
    registry: Arc<dyn MetadataRegistry>,
    fetcher: RemoteFetcher,
    limits: UploadLimits,
}

impl<S: ObjectStore> UploadService<S> {
    /// Create a new upload service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        registry: Arc<dyn MetadataRegistry>,
        fetcher: RemoteFetcher,
        limits: UploadLimits,
    ) -> Self {
        Self {
            store,
            registry,
            fetcher,
            limits,
        }
    }

    /// Batch limits in effect.
    #[must_use]
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Resolve, bound and store one submission.
    ///
    /// Remote URLs are fetched concurrently; a failed fetch only drops that
    /// URL. The item count is checked after resolution. Items over the size
    /// limit or rejected by the store are skipped without affecting the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No item resolved
    /// - More items resolved than the batch limit
    /// - Every resolved item was skipped
    pub async fn upload(
        &self,
        submission: UploadSubmission,
        base_url: &str,
    ) -> Result<BatchReport, UploadError> {
        let UploadSubmission { files, urls } = submission;
        let max = self.limits.max_files;

        // Fetching can only grow the batch, so an over-full batch fails early.
        if files.len() > max {
            return Err(UploadError::too_many_files(files.len(), max));
        }

        let urls: Vec<String> = urls
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        let mut outcomes = Vec::new();
        let mut pending = files;

        let fetched = join_all(urls.iter().map(|url| self.fetcher.fetch(url))).await;
        for (url, result) in urls.into_iter().zip(fetched) {
            match result {
                Ok(file) => pending.push(file),
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping remote file");
                    outcomes.push(ItemOutcome::Skipped {
                        name: url,
                        reason: SkipReason::FetchFailed(e.to_string()),
                    });
                }
            }
        }

        if pending.is_empty() {
            return Err(UploadError::NoValidFiles);
        }
        if pending.len() > max {
            return Err(UploadError::too_many_files(pending.len(), max));
        }

        let attempted = pending.len();
        for file in pending {
            outcomes.push(self.store_one(file, base_url).await);
        }

        let report = BatchReport::new(outcomes);
        if report.stored_count() == 0 {
            return Err(UploadError::AllFailed {
                attempted,
                max_file_size: self.limits.max_file_size,
            });
        }

        Ok(report)
    }

    async fn store_one(&self, file: PendingFile, base_url: &str) -> ItemOutcome {
        if !self.limits.allows_size(file.size) {
            warn!(
                filename = %file.name,
                size = file.size,
                max = self.limits.max_file_size,
                "Skipping oversized file"
            );
            return ItemOutcome::Skipped {
                name: file.name,
                reason: SkipReason::TooLarge {
                    size: file.size,
                    max: self.limits.max_file_size,
                },
            };
        }

        let key = generate_key(&file.name);
        if let Err(e) = self
            .store
            .upload(&key, file.data, &file.mime_type, IMMUTABLE_CACHE_CONTROL)
            .await
        {
            error!(key = %key, filename = %file.name, error = %e, "Failed to store file");
            return ItemOutcome::Skipped {
                name: file.name,
                reason: SkipReason::StoreFailed(e.to_string()),
            };
        }

        let url = public_url(base_url, &key);
        self.registry.put(MetadataRecord {
            key: key.clone(),
            original_name: file.name,
            mime_type: file.mime_type.clone(),
            size: file.size,
            public_url: url.clone(),
            uploaded_at: Utc::now(),
        });

        info!(key = %key, mime = %file.mime_type, size = file.size, "File stored");

        ItemOutcome::Stored(UploadedFile {
            name: key,
            url,
            mime: file.mime_type,
            size: file.size,
        })
    }
}
