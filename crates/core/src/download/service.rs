//! Download proxy implementation.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, error, warn};

use super::error::DownloadError;
use super::mime::mime_from_key;
use crate::registry::MetadataRegistry;
use crate::storage::{IMMUTABLE_CACHE_CONTROL, ObjectStore};

/// A stored object ready to be written to the client.
#[derive(Debug, Clone)]
pub struct ServedFile {
    /// Object bytes.
    pub data: Bytes,
    /// `Content-Type` value.
    pub content_type: String,
    /// `Content-Length` value.
    pub content_length: u64,
    /// `Content-Disposition` value.
    pub content_disposition: String,
    /// `Cache-Control` value.
    pub cache_control: &'static str,
}

/// Serves stored objects with headers derived from recorded metadata.
pub struct DownloadService<S: ObjectStore> {
    store: Arc<S>,
    registry: Arc<dyn MetadataRegistry>,
}

impl<S: ObjectStore> DownloadService<S> {
    /// Create a new download service.
    #[must_use]
    pub fn new(store: Arc<S>, registry: Arc<dyn MetadataRegistry>) -> Self {
        Self { store, registry }
    }

    /// Fetch the object stored under `key`.
    ///
    /// When the registry knows the key, its MIME type and original filename
    /// are used. Otherwise the MIME type comes from the key's extension and
    /// the key itself is offered as filename.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::NotFound`] whenever the store call fails.
    /// Failures other than absence are logged as errors.
    pub async fn fetch(&self, key: &str) -> Result<ServedFile, DownloadError> {
        let data = self.store.download(key).await.map_err(|e| {
            if e.is_not_found() {
                debug!(key = %key, "File not found");
            } else {
                error!(key = %key, error = %e, "Failed to read file");
            }
            DownloadError::not_found(key)
        })?;

        let stored_len = data.len() as u64;
        let (content_type, filename, content_length) = match self.registry.get(key) {
            Some(record) => {
                // Content-Length must match the body actually sent.
                let length = if record.size == stored_len {
                    record.size
                } else {
                    warn!(
                        key = %key,
                        recorded = record.size,
                        stored = stored_len,
                        "Recorded size differs from stored object"
                    );
                    stored_len
                };
                (record.mime_type, record.original_name, length)
            }
            None => (mime_from_key(key).to_string(), key.to_string(), stored_len),
        };

        Ok(ServedFile {
            content_length,
            data,
            content_type,
            content_disposition: content_disposition(&filename),
            cache_control: IMMUTABLE_CACHE_CONTROL,
        })
    }
}

/// Inline `Content-Disposition` value for `filename`.
///
/// Characters that cannot appear in a quoted ASCII header value are replaced
/// with `_`.
#[must_use]
pub fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("inline; filename=\"{safe}\"")
}
