// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::config::YouTubeConfig;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> (YouTubeClient, Arc<ApiCallCounter>) {
    let config = YouTubeConfig {
        api_key: "test-key".into(),
        base_url: format!("{}/youtube/v3", server.uri()),
        page_size: 2,
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    };
    let calls = Arc::new(ApiCallCounter::new());
    let client = YouTubeClient::new(&config, calls.clone()).unwrap();
    (client, calls)
}

#[tokio::test]
async fn search_channels_sends_key_and_follows_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("key", "test-key"))
        .and(query_param("q", "cats"))
        .and(query_param("type", "channel"))
        .and(query_param("order", "viewCount"))
        .and(query_param("maxResults", "2"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "PAGE2",
            "items": [
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}, "snippet": {"title": "One"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC2"}, "snippet": {"title": "Two"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "",
            "items": [{"id": {"kind": "youtube#channel", "channelId": "UC3"}, "snippet": {"title": "Three"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, calls) = client_for(&server).await;

    let first = client.search_channels("cats", None).await.unwrap();
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].channel_id, "UC1");
    assert_eq!(first.next_page_token.as_deref(), Some("PAGE2"));

    let second = client.search_channels("cats", Some("PAGE2")).await.unwrap();
    assert_eq!(second.items[0].title, "Three");
    assert!(second.next_page_token.is_none(), "empty token ends pagination");

    assert_eq!(calls.get(), 2);
}

#[tokio::test]
async fn get_channel_parses_string_statistics() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", "UC1"))
        .and(query_param("part", "snippet,statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "UC1",
                "snippet": {"title": "Cat Channel", "publishedAt": "2023-01-01T00:00:00Z"},
                "statistics": {"subscriberCount": "5000", "videoCount": "42", "viewCount": "1"}
            }]
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;
    let channel = client.get_channel("UC1").await.unwrap();

    assert_eq!(channel.title, "Cat Channel");
    assert_eq!(channel.subscriber_count, 5000);
    assert_eq!(channel.video_count, 42);
    assert_eq!(channel.published_at.to_rfc3339(), "2023-01-01T00:00:00+00:00");
}

#[tokio::test]
async fn empty_items_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let (client, calls) = client_for(&server).await;
    let err = client.get_video("gone").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.id(), "gone");
    assert_eq!(calls.get(), 1, "failed calls are counted too");
}

#[tokio::test]
async fn http_errors_map_to_typed_upstream_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "limited"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "broken"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": {"code": 503, "message": "Backend Error"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", "garbled"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;

    assert!(matches!(
        client.get_video("missing").await,
        Err(UpstreamError::NotFound { .. })
    ));
    assert!(matches!(
        client.get_video("limited").await,
        Err(UpstreamError::QuotaExceeded { .. })
    ));
    match client.get_video("broken").await {
        Err(UpstreamError::Status {
            status, message, ..
        }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Backend Error");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(matches!(
        client.get_video("garbled").await,
        Err(UpstreamError::Decode { .. })
    ));
}

#[tokio::test]
async fn comments_disabled_is_forbidden() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/commentThreads"))
        .and(query_param("videoId", "v1"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The video identified by the videoId parameter has disabled comments.",
                "errors": [{"reason": "commentsDisabled", "domain": "youtube.commentThread"}]
            }
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;
    let err = client.list_top_level_comments("v1").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Forbidden { .. }));
}

#[tokio::test]
async fn search_videos_keeps_only_video_hits() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("type", "video"))
        .and(query_param("q", "cats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "ignored",
            "items": [
                {"id": {"kind": "youtube#video", "videoId": "v1"},
                 "snippet": {"title": "Cat", "thumbnails": {"default": {"url": "https://img/v1.jpg"}}}},
                {"id": {"kind": "youtube#channel", "channelId": "UC9"}, "snippet": {"title": "Not a video"}},
                {"id": {"kind": "youtube#video", "videoId": "v2"}, "snippet": {"title": "Cat 2"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;
    let videos = client.search_videos("cats").await.unwrap();

    let ids: Vec<_> = videos.iter().map(|v| v.video_id.as_str()).collect();
    assert_eq!(ids, ["v1", "v2"]);
    assert_eq!(videos[0].thumbnail_url, "https://img/v1.jpg");
}

#[tokio::test]
async fn comment_threads_are_flattened() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/commentThreads"))
        .and(query_param("part", "snippet"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "snippet": {
                    "videoId": "v1",
                    "totalReplyCount": 4,
                    "topLevelComment": {"snippet": {
                        "videoId": "v1",
                        "authorDisplayName": "Alice",
                        "authorChannelId": {"value": "UCalice"},
                        "textDisplay": "so fluffy",
                        "likeCount": 12,
                        "publishedAt": "2024-05-01T10:00:00Z"
                    }}
                }
            }]
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server).await;
    let comments = client.list_top_level_comments("v1").await.unwrap();

    assert_eq!(comments.len(), 1);
    let comment = &comments[0];
    assert_eq!(comment.author_name, "Alice");
    assert_eq!(comment.author_channel_id, "UCalice");
    assert_eq!(comment.text, "so fluffy");
    assert_eq!(comment.like_count, 12);
    assert_eq!(comment.reply_count, 4);
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_api_key() {
    let config = YouTubeConfig {
        api_key: "super-secret".into(),
        // nothing listens on port 9 on loopback
        base_url: "http://127.0.0.1:9/youtube/v3".into(),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let client = YouTubeClient::new(&config, Arc::new(ApiCallCounter::new())).unwrap();

    let err = client.get_channel("UC1").await.unwrap_err();
    assert!(matches!(err, UpstreamError::Transport { .. }));
    assert!(!format!("{err:?}").contains("super-secret"));
    assert!(!err.to_string().contains("super-secret"));
}

#[test]
fn counter_is_monotonic() {
    let counter = ApiCallCounter::new();
    assert_eq!(counter.get(), 0);
    assert_eq!(counter.record(), 1);
    assert_eq!(counter.record(), 2);
    assert_eq!(counter.get(), 2);
}
