//! Request extractors.

use std::convert::Infallible;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Multipart, Request,
        multipart::MultipartError,
    },
    http::{HeaderMap, StatusCode, header, request::Parts},
};
use serde::Deserialize;
use tracing::warn;

use kabox_core::upload::{PendingFile, UploadSubmission};
use kabox_shared::AppError;

use crate::{AppState, error::ApiError};

/// Multipart field carrying uploaded files.
const FILES_FIELD: &str = "files";
/// Multipart field carrying remote URLs.
const URLS_FIELD: &str = "urls";

/// Upload submission read from a multipart form or a JSON body.
///
/// Multipart forms carry file parts under `files` and text parts under
/// `urls`. JSON bodies carry `{"urls": [...]}` or `{"urls": "..."}`. Any
/// other content type yields an empty submission.
#[derive(Debug)]
pub struct UploadForm(pub UploadSubmission);

impl FromRequest<AppState> for UploadForm {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.status(), "invalid multipart form"))?;
            return read_multipart(multipart).await.map(Self);
        }

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<UrlsBody>::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.status(), "invalid JSON body"))?;
            return Ok(Self(UploadSubmission::from_urls(body.urls.into_vec())));
        }

        Ok(Self(UploadSubmission::default()))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<UploadSubmission, ApiError> {
    let mut submission = UploadSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(FILES_FIELD) => {
                let name = field.file_name().map(str::to_string);
                let mime_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(multipart_error)?;

                // Browsers send an empty unnamed part when no file was picked.
                if name.as_deref().is_none_or(str::is_empty) && data.is_empty() {
                    continue;
                }
                submission
                    .files
                    .push(PendingFile::new(name, mime_type, data));
            }
            Some(URLS_FIELD) => {
                let url = field.text().await.map_err(multipart_error)?;
                submission.urls.push(url);
            }
            _ => {}
        }
    }

    Ok(submission)
}

fn multipart_error(err: MultipartError) -> ApiError {
    warn!(error = %err, "Failed to read multipart body");
    body_error(err.status(), "invalid multipart form")
}

fn body_error(status: StatusCode, message: &str) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError(AppError::PayloadTooLarge("request body too large".to_string()))
    } else {
        ApiError(AppError::Validation(message.to_string()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct UrlsBody {
    #[serde(default)]
    urls: UrlList,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UrlList {
    One(String),
    Many(Vec<String>),
}

impl Default for UrlList {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

impl UrlList {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(url) => vec![url],
            Self::Many(urls) => urls,
        }
    }
}

/// Public base URL for links returned to the client.
///
/// The configured override wins. Otherwise it is rebuilt from the first
/// `X-Forwarded-Proto` value (default `http`) and the first
/// `X-Forwarded-Host` or `Host` value (default `localhost`).
#[derive(Debug, Clone)]
pub struct BaseUrl(pub String);

impl FromRequestParts<AppState> for BaseUrl {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let base = match &state.public_base_url {
            Some(base) => base.to_string(),
            None => base_url_from_headers(&parts.headers),
        };
        Ok(Self(base))
    }
}

/// Rebuild the externally visible base URL from proxy and host headers.
#[must_use]
pub fn base_url_from_headers(headers: &HeaderMap) -> String {
    let proto = first_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .unwrap_or("localhost");
    format!("{proto}://{host}")
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
