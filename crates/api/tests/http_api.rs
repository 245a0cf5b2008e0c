//! End-to-end tests for the HTTP API against the in-memory store.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kabox_api::{AppState, create_router};
use kabox_core::registry::{InMemoryRegistry, MetadataRegistry};
use kabox_core::storage::{StorageConfig, StorageService};
use kabox_core::upload::{RemoteFetcher, UploadLimits};

const BOUNDARY: &str = "kabox-test-boundary";

enum Part<'a> {
    File {
        name: &'a str,
        mime: &'a str,
        data: &'a [u8],
    },
    Url(&'a str),
}

fn app_with(limits: UploadLimits, public_base_url: Option<&str>) -> (Router, Arc<InMemoryRegistry>) {
    let store = Arc::new(StorageService::from_config(StorageConfig::memory()).unwrap());
    let registry = Arc::new(InMemoryRegistry::new());
    let fetcher = RemoteFetcher::new(Some(Duration::from_secs(5)), limits.max_file_size).unwrap();
    let state = AppState::new(
        store,
        Arc::clone(&registry) as Arc<dyn MetadataRegistry>,
        fetcher,
        limits,
        public_base_url.map(str::to_string),
    );
    (create_router(state), registry)
}

fn app() -> (Router, Arc<InMemoryRegistry>) {
    app_with(
        UploadLimits {
            max_files: 3,
            max_file_size: 1024,
        },
        Some("https://kabox.example"),
    )
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { name, mime, data } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\n\
                         Content-Type: {mime}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Url(url) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"urls\"\r\n\r\n{url}").as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_upload_then_serve_round_trip() {
    let (app, registry) = app();

    let response = app
        .clone()
        .oneshot(upload_request(&[Part::File {
            name: "cat photo.png",
            mime: "image/png",
            data: b"\x89PNG fake image",
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    let file = &json["files"][0];
    let key = file["name"].as_str().unwrap().to_string();
    assert!(key.ends_with(".png"));
    assert_eq!(file["mime"], "image/png");
    assert_eq!(file["size"], 15);
    assert_eq!(
        file["url"],
        format!("https://kabox.example/files/{key}")
    );
    assert_eq!(registry.len(), 1);

    let response = app.oneshot(get(&format!("/files/{key}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "image/png");
    assert_eq!(headers[header::CONTENT_LENGTH], "15");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "inline; filename=\"cat photo.png\""
    );
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"\x89PNG fake image");
}

#[tokio::test]
async fn test_api_files_alias_serves_same_object() {
    let (app, _) = app();

    let json = json_body(
        app.clone()
            .oneshot(upload_request(&[Part::File {
                name: "notes.txt",
                mime: "text/plain",
                data: b"hello",
            }]))
            .await
            .unwrap(),
    )
    .await;
    let key = json["files"][0]["name"].as_str().unwrap().to_string();

    let response = app.oneshot(get(&format!("/api/files/{key}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
}

#[tokio::test]
async fn test_missing_file_is_404() {
    let (app, _) = app();
    let response = app.oneshot(get("/files/doesNotExist.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "file not found");
}

#[tokio::test]
async fn test_empty_form_is_400() {
    let (app, _) = app();
    let response = app.oneshot(upload_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "no valid files to upload");
}

#[tokio::test]
async fn test_unsupported_content_type_is_treated_as_empty() {
    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("hello"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_more_than_three_files_is_400() {
    let (app, registry) = app();
    let parts: Vec<Part<'_>> = (0..4)
        .map(|_| Part::File {
            name: "a.txt",
            mime: "text/plain",
            data: b"a",
        })
        .collect();

    let response = app.oneshot(upload_request(&parts)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["error"], "too many files: at most 3 files per upload");
    assert!(registry.is_empty());
}

#[tokio::test]
async fn test_oversized_file_is_left_out() {
    let (app, _) = app();
    let big = vec![b'x'; 1025];

    let response = app
        .oneshot(upload_request(&[
            Part::File {
                name: "big.bin",
                mime: "application/octet-stream",
                data: &big,
            },
            Part::File {
                name: "small.txt",
                mime: "text/plain",
                data: b"ok",
            },
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["mime"], "text/plain");
}

#[tokio::test]
async fn test_only_oversized_files_is_500() {
    let (app, _) = app();
    let big = vec![b'x'; 2048];

    let response = app
        .oneshot(upload_request(&[Part::File {
            name: "big.bin",
            mime: "application/octet-stream",
            data: &big,
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("all files failed"));
}

#[tokio::test]
async fn test_body_over_request_limit_is_413() {
    let (app, _) = app();
    // Limit is (3 + 1) * 1024 + 1 MiB.
    let huge = vec![b'x'; 2 * 1024 * 1024];

    let response = app
        .oneshot(upload_request(&[Part::File {
            name: "huge.bin",
            mime: "application/octet-stream",
            data: &huge,
        }]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_urls_in_multipart_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/remote.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![1u8; 32]),
        )
        .mount(&server)
        .await;
    let url = format!("{}/img/remote.jpg", server.uri());

    let (app, registry) = app();

    let response = app
        .clone()
        .oneshot(upload_request(&[
            Part::File {
                name: "local.txt",
                mime: "text/plain",
                data: b"local",
            },
            Part::Url(&url),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let files = json["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[1]["mime"], "image/jpeg");
    assert_eq!(files[1]["size"], 32);

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "urls": url }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert!(json["files"][0]["name"].as_str().unwrap().ends_with(".jpg"));

    assert_eq!(registry.len(), 3);
}

#[tokio::test]
async fn test_unreachable_urls_only_is_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (app, _) = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "urls": [format!("{}/gone.png", server.uri())] }).to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_url_follows_forwarded_headers() {
    let (app, _) = app_with(UploadLimits::default(), None);

    let mut request = upload_request(&[Part::File {
        name: "a.txt",
        mime: "text/plain",
        data: b"a",
    }]);
    let headers = request.headers_mut();
    headers.insert(header::HOST, "10.0.0.5:5000".parse().unwrap());
    headers.insert("x-forwarded-proto", "https".parse().unwrap());
    headers.insert("x-forwarded-host", "files.kabox.id".parse().unwrap());

    let json = json_body(app.oneshot(request).await.unwrap()).await;
    let url = json["files"][0]["url"].as_str().unwrap();
    assert!(url.starts_with("https://files.kabox.id/files/"));
}

#[tokio::test]
async fn test_health_reports_tracked_files() {
    let (app, _) = app();

    app.clone()
        .oneshot(upload_request(&[Part::File {
            name: "a.txt",
            mime: "text/plain",
            data: b"a",
        }]))
        .await
        .unwrap();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["tracked_files"], 1);
    assert!(json["version"].is_string());
}
