//! Core logic for Kabox.
//!
//! This crate has no web framework dependency. HTTP concerns live in
//! `kabox-api`; everything here works on plain bytes, keys and URLs.
//!
//! # Modules
//!
//! - `storage` - Object store client (OpenDAL)
//! - `upload` - Batch orchestration, key generation and remote fetches
//! - `download` - Serving stored objects with derived headers
//! - `registry` - Ephemeral key to metadata registry

pub mod download;
pub mod registry;
pub mod storage;
pub mod upload;
