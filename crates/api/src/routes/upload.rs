//! Upload endpoint.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use tracing::info;

use kabox_core::upload::UploadedFile;

use crate::{
    AppState,
    error::ApiError,
    extractors::{BaseUrl, UploadForm},
};

/// Successful upload response.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Stored files, in submission order.
    pub files: Vec<UploadedFile>,
}

/// POST `/api/upload`
///
/// Stores up to the batch limit of directly uploaded files and remote URLs.
/// Items that cannot be stored are left out of `files`.
async fn upload_files(
    State(state): State<AppState>,
    BaseUrl(base_url): BaseUrl,
    UploadForm(submission): UploadForm,
) -> Result<Json<UploadResponse>, ApiError> {
    let report = state.uploads.upload(submission, &base_url).await?;

    info!(
        stored = report.stored_count(),
        skipped = report.skipped_count(),
        "Upload batch complete"
    );

    Ok(Json(UploadResponse {
        success: true,
        files: report.into_uploaded(),
    }))
}

/// Creates upload routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/upload", post(upload_files))
}
