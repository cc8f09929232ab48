use super::*;
use crate::cache::MockCoordinator;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

fn setup_router() -> (Router, Arc<MockCoordinator>, TempDir) {
    let temp_dir = TempDir::new().expect("tempdir");
    std::fs::write(temp_dir.path().join("index.html"), "<h1>spool</h1>").expect("write file");
    std::fs::write(temp_dir.path().join("data.txt"), "0123456789").expect("write file");

    let config = Config {
        root_dir: temp_dir.path().to_path_buf(),
        chunk_size: 4,
        ..Default::default()
    };
    let coordinator = Arc::new(MockCoordinator::new());
    let router = create_router(&config, Arc::clone(&coordinator));

    (router, coordinator, temp_dir)
}

async fn send(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, coordinator, _temp_dir) = setup_router();

    let (status, body) = send(&router, "/healthz").await;

    assert_eq!(status, StatusCode::OK);
    let body_json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body_json["status"], "ok");
    assert_eq!(coordinator.get_count(), 0);
}

#[tokio::test]
async fn test_file_is_cached_on_first_request() {
    let (router, coordinator, _temp_dir) = setup_router();

    let (status, body) = send(&router, "/data.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"0123456789");
    assert!(coordinator.store().contains("/data.txt"));
}

#[tokio::test]
async fn test_cached_body_survives_file_change() {
    let (router, _coordinator, temp_dir) = setup_router();

    let (_, first) = send(&router, "/data.txt").await;
    std::fs::write(temp_dir.path().join("data.txt"), "changed").unwrap();
    let (status, second) = send(&router, "/data.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_missing_file_is_not_cached() {
    let (router, coordinator, temp_dir) = setup_router();

    let (status, _) = send(&router, "/late.txt").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!coordinator.store().contains("/late.txt"));

    std::fs::write(temp_dir.path().join("late.txt"), "arrived").unwrap();
    let (status, body) = send(&router, "/late.txt").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"arrived");
}

#[tokio::test]
async fn test_head_request_does_not_fill_entry() {
    let (router, coordinator, _temp_dir) = setup_router();

    let request = Request::builder()
        .method("HEAD")
        .uri("/data.txt")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!coordinator.store().contains("/data.txt"));

    let (status, body) = send(&router, "/data.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"0123456789");
}

#[tokio::test]
async fn test_range_request_served_directly() {
    let (router, coordinator, _temp_dir) = setup_router();

    let request = Request::builder()
        .method("GET")
        .uri("/data.txt")
        .header("range", "bytes=2-4")
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"234");
    assert!(!coordinator.store().contains("/data.txt"));

    let (_, body) = send(&router, "/data.txt").await;
    assert_eq!(body, b"0123456789");
}

#[tokio::test]
async fn test_unavailable_cache_serves_directly() {
    let (router, coordinator, _temp_dir) = setup_router();
    coordinator.set_unavailable(true);

    let (status, body) = send(&router, "/index.html").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"<h1>spool</h1>");
    assert!(coordinator.store().is_empty());
}
