//! Upload orchestration.
//!
//! This module turns a client submission into stored objects:
//! - Remote URL resolution
//! - Batch bounding (item count, per-item size)
//! - Storage key generation
//! - Per-item outcome aggregation
//!
//! ```text
//! direct files ─┐
//!               ├─► bound batch ─► for each item: size check ─► key ─► store ─► registry
//! URLs ─ fetch ─┘
//! ```

mod error;
mod fetch;
pub mod key;
mod service;
mod types;

pub use error::{FetchError, UploadError};
pub use fetch::RemoteFetcher;
pub use key::{generate_key, generate_token};
pub use service::{PUBLIC_FILES_PATH, UploadService, public_url};
pub use types::{
    BatchReport, DEFAULT_MIME_TYPE, ItemOutcome, PendingFile, SkipReason, UploadLimits,
    UploadSubmission, UploadedFile,
};
