//! Ephemeral metadata registry.
//!
//! Records the original filename, MIME type and size of every object stored
//! during the lifetime of the process. The download proxy uses it to improve
//! response headers; it is never a source of truth and is lost on restart.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Metadata captured when an object is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    /// Generated storage key.
    pub key: String,
    /// Filename as submitted by the client.
    pub original_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Public URL returned to the client.
    pub public_url: String,
    /// When the object was stored.
    pub uploaded_at: DateTime<Utc>,
}

/// Key → metadata lookup shared by the upload and download services.
pub trait MetadataRegistry: Send + Sync {
    /// Record metadata for a freshly stored object.
    fn put(&self, record: MetadataRecord);

    /// Look up metadata by exact key.
    fn get(&self, key: &str) -> Option<MetadataRecord>;

    /// All known records, in no particular order.
    fn list(&self) -> Vec<MetadataRecord>;

    /// Number of known records.
    fn len(&self) -> usize;

    /// Whether no records are known.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local registry backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    records: DashMap<String, MetadataRecord>,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataRegistry for InMemoryRegistry {
    fn put(&self, record: MetadataRecord) {
        self.records.insert(record.key.clone(), record);
    }

    fn get(&self, key: &str) -> Option<MetadataRecord> {
        self.records.get(key).map(|entry| entry.value().clone())
    }

    fn list(&self) -> Vec<MetadataRecord> {
        self.records
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
