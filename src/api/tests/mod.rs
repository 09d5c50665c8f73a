use super::*;
use crate::Config;
use crate::config::{RetryConfig, StorageBackend};
use crate::error::ApiError;
use crate::export::{MemoryStore, ObjectStore};
use crate::youtube::{ApiCallCounter, YouTubeClient};
use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};


/// Configuration pointing the YouTube client at `server`
fn test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.youtube.api_key = "test-key".into();
    config.youtube.base_url = format!("{}/youtube/v3", server.uri());
    config.youtube.retry = RetryConfig::fixed(1, Duration::from_millis(1));
    config.storage.backend = StorageBackend::Memory;
    config.export.close_retry = RetryConfig::fixed(2, Duration::from_millis(1));
    config
}

/// Service backed by a wiremock YouTube API and the given store
fn service_with_store(config: Config, store: Arc<dyn ObjectStore>) -> Arc<YouTubeData> {
    let calls = Arc::new(ApiCallCounter::new());
    let client = YouTubeClient::new(&config.youtube, calls.clone()).unwrap();
    Arc::new(YouTubeData::with_components(
        config,
        Arc::new(client),
        Some(store),
        calls,
    ))
}

fn create_test_service(server: &MockServer) -> (Arc<YouTubeData>, MemoryStore) {
    let store = MemoryStore::new();
    let service = service_with_store(test_config(server), Arc::new(store.clone()));
    (service, store)
}

async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Mount the cats fixture: one channel with one video, and one video with one comment
async fn mount_cats(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("type", "channel"))
        .and(query_param("q", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": {"kind": "youtube#channel", "channelId": "UC1"}, "snippet": {"title": "Cats"}}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", "UC1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UC1",
                "snippet": {"title": "Cat Channel", "publishedAt": "2020-01-01T00:00:00Z"},
                "statistics": {"subscriberCount": "5000", "videoCount": "100"}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("channelId", "UC1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": {"kind": "youtube#video", "videoId": "v1"},
                "snippet": {"title": "Cat video", "thumbnails": {"default": {"url": "https://img/v1.jpg"}}}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("type", "video"))
        .and(query_param("q", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"id": {"kind": "youtube#video", "videoId": "v1"}, "snippet": {"title": "Cat video"}}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "v1",
                "snippet": {"channelId": "UC1"},
                "statistics": {"viewCount": "900", "likeCount": "30", "dislikeCount": "10", "commentCount": "1"}
            }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/commentThreads"))
        .and(query_param("videoId", "v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": {
                    "videoId": "v1",
                    "totalReplyCount": 0,
                    "topLevelComment": {"snippet": {
                        "videoId": "v1",
                        "authorDisplayName": "Alice",
                        "authorChannelId": {"value": "UCalice"},
                        "textDisplay": "so fluffy",
                        "likeCount": 2,
                        "publishedAt": "2024-05-01T10:00:00Z"
                    }}
                }
            }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_cors_enabled() {
    let server = MockServer::start().await;
    let (service, _store) = create_test_service(&server);

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = create_router(service).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    config.api.cors_enabled = false;
    let service = service_with_store(config, Arc::new(MemoryStore::new()));

    let request = Request::builder()
        .uri("/api/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = create_router(service).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_specific_origins() {
    let layer = build_cors_layer(&["http://app.example".to_string()]);
    let app = Router::new()
        .route("/", axum::routing::get(|| async { "ok" }))
        .layer(layer);

    let request = Request::builder()
        .uri("/")
        .header("Origin", "http://app.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://app.example"
    );
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let server = MockServer::start().await;
    let (service, _store) = create_test_service(&server);

    let response = get(create_router(service), "/api/videos").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_api_server_stops_on_shutdown() {
    let server = MockServer::start().await;
    let mut config = test_config(&server);
    // Port 0 = OS assigns a free port
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let service = service_with_store(config, Arc::new(MemoryStore::new()));

    let handle = tokio::spawn(start_api_server(service.clone()));
    tokio::time::sleep(Duration::from_millis(100)).await;

    service.shutdown();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
