//! Object storage for uploaded files using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: AWS S3, Cloudflare R2, MinIO
//! - Supabase Storage (S3-compatible endpoint)
//! - Local filesystem (development only)
//! - In-process memory (tests)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     ObjectStore (trait)                          │
//! │   upload(key, bytes, content_type, cache_control) / download(key)│
//! ├─────────────────────────────────────────────────────────────────┤
//! │                StorageService (Apache OpenDAL)                   │
//! │ op.write_with("key", data)  │ op.read("key")                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{IMMUTABLE_CACHE_CONTROL, ObjectStore, StorageService, validate_key};
