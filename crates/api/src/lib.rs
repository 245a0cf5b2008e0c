//! HTTP API layer with Axum routes and extractors.
//!
//! This crate provides:
//! - The upload, file serving and health routes
//! - Request extractors for upload submissions and the public base URL
//! - The JSON error envelope

pub mod error;
pub mod extractors;
pub mod routes;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use kabox_core::download::DownloadService;
use kabox_core::registry::MetadataRegistry;
use kabox_core::storage::StorageService;
use kabox_core::upload::{RemoteFetcher, UploadLimits, UploadService};

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Upload orchestrator.
    pub uploads: Arc<UploadService<StorageService>>,
    /// Download proxy.
    pub downloads: Arc<DownloadService<StorageService>>,
    /// Metadata registry shared by both services.
    pub registry: Arc<dyn MetadataRegistry>,
    /// Configured public base URL; derived from request headers when unset.
    pub public_base_url: Option<Arc<str>>,
}

impl AppState {
    /// Wire the upload and download services around one store and registry.
    #[must_use]
    pub fn new(
        store: Arc<StorageService>,
        registry: Arc<dyn MetadataRegistry>,
        fetcher: RemoteFetcher,
        limits: UploadLimits,
        public_base_url: Option<String>,
    ) -> Self {
        let uploads = UploadService::new(Arc::clone(&store), Arc::clone(&registry), fetcher, limits);
        let downloads = DownloadService::new(store, Arc::clone(&registry));

        Self {
            uploads: Arc::new(uploads),
            downloads: Arc::new(downloads),
            registry,
            public_base_url: public_base_url.map(Arc::from),
        }
    }
}

/// Creates the main application router.
///
/// Files are served from `/files/{key}`; everything else lives under `/api`.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.uploads.limits().request_body_limit();

    Router::new()
        .merge(routes::files::routes())
        .nest("/api", routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
