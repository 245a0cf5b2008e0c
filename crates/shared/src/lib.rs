//! Shared errors and configuration for Kabox.
//!
//! This crate provides common pieces used across all other crates:
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;

pub use config::{AppConfig, ServerConfig, StorageBackend, StorageSettings, UploadSettings};
pub use error::{AppError, AppResult};
