//! Remote URL fetching.

use std::time::Duration;

use bytes::BytesMut;
use reqwest::{Client, Url, header::CONTENT_TYPE};

use super::error::FetchError;
use super::types::{DEFAULT_MIME_TYPE, PendingFile};

/// Filename used when the URL path has no last segment.
const FALLBACK_FILENAME: &str = "download";

/// Downloads remote files into pending upload items.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    client: Client,
    max_bytes: u64,
}

impl RemoteFetcher {
    /// Create a fetcher that buffers at most `max_bytes` per download.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>, max_bytes: u64) -> Result<Self, FetchError> {
        let mut builder =
            Client::builder().user_agent(concat!("kabox/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, max_bytes })
    }

    /// Download `url` with an unauthenticated GET.
    ///
    /// Bodies larger than the limit are not buffered; the returned item only
    /// carries the observed size so the caller can skip it.
    ///
    /// # Errors
    ///
    /// Returns an error for unparseable or non-HTTP URLs, non-success
    /// statuses and network failures.
    pub async fn fetch(&self, url: &str) -> Result<PendingFile, FetchError> {
        let parsed =
            Url::parse(url.trim()).map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let name = filename_from_url(&parsed);
        let mut response = self.client.get(parsed).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_MIME_TYPE)
            .to_string();

        if let Some(declared) = response.content_length() {
            if declared > self.max_bytes {
                return Ok(PendingFile::oversized(name, mime_type, declared));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            let seen = body.len() as u64 + chunk.len() as u64;
            if seen > self.max_bytes {
                return Ok(PendingFile::oversized(name, mime_type, seen));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(PendingFile::new(Some(name), Some(mime_type), body.freeze()))
    }
}

/// Last path segment of `url`, or `download` when there is none.
fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(Iterator::last)
        .filter(|segment| !segment.is_empty())
        .unwrap_or(FALLBACK_FILENAME)
        .to_string()
}
