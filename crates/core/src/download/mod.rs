//! Download proxy.
//!
//! Looks up stored objects by key and derives the response headers, using
//! the metadata registry when it knows the key and the extension table when
//! it does not.

mod error;
pub mod mime;
mod service;

pub use error::DownloadError;
pub use mime::mime_from_key;
pub use service::{DownloadService, ServedFile, content_disposition};
