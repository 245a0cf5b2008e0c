//! File serving endpoint.

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::Response,
    routing::get,
};
use tracing::error;

use kabox_core::upload::DEFAULT_MIME_TYPE;
use kabox_shared::AppError;

use crate::{AppState, error::ApiError};

/// GET `/files/{key}`
///
/// Returns the stored object with content, caching and CORS headers. Any
/// store failure answers 404; failing to assemble the response answers 500.
async fn serve_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let served = state.downloads.fetch(&key).await?;

    // Recorded MIME types come from clients and may not be valid header values.
    let content_type = HeaderValue::from_str(&served.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_MIME_TYPE));

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, served.content_length)
        .header(header::CONTENT_DISPOSITION, served.content_disposition)
        .header(header::CACHE_CONTROL, served.cache_control)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(Body::from(served.data))
        .map_err(|e| {
            error!(key = %key, error = %e, "Failed to build file response");
            ApiError(AppError::Internal("failed to access file".to_string()))
        })
}

/// Creates file serving routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/files/{key}", get(serve_file))
}
