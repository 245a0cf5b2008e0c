//! JSON error envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use kabox_core::download::DownloadError;
use kabox_core::upload::UploadError;
use kabox_shared::AppError;

/// Error returned by handlers and extractors.
///
/// Renders as `{"success": false, "error": "<message>"}` with the status of
/// the wrapped [`AppError`].
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// The wrapped application error.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        Self(err.into())
    }
}

impl From<DownloadError> for ApiError {
    fn from(err: DownloadError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.0.is_server_error() {
            error!(code = self.0.error_code(), error = %self.0, "Request failed");
        }

        (
            status,
            Json(json!({
                "success": false,
                "error": self.0.message(),
            })),
        )
            .into_response()
    }
}
