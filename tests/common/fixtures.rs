//! YouTube Data API and GCS mocks

use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base URL of the mocked YouTube API on `server`
pub fn youtube_base(server: &MockServer) -> String {
    format!("{}/youtube/v3", server.uri())
}

/// Channel search for `term` returning the given channel ids on one page
pub async fn mount_channel_search(server: &MockServer, term: &str, channel_ids: &[&str]) {
    let items: Vec<_> = channel_ids
        .iter()
        .map(|id| {
            json!({
                "id": {"kind": "youtube#channel", "channelId": id},
                "snippet": {"title": id}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("type", "channel"))
        .and(query_param("q", term))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(server)
        .await;
}

/// `channels.list` for one channel
pub async fn mount_channel(
    server: &MockServer,
    channel_id: &str,
    title: &str,
    subscribers: u64,
    published_at: &str,
) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/channels"))
        .and(query_param("id", channel_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": channel_id,
                "snippet": {"title": title, "publishedAt": published_at},
                "statistics": {"subscriberCount": subscribers.to_string(), "videoCount": "10"}
            }]
        })))
        .mount(server)
        .await;
}

/// Per-channel video search returning `video_ids` on one page
pub async fn mount_channel_videos(server: &MockServer, channel_id: &str, video_ids: &[&str]) {
    let items: Vec<_> = video_ids
        .iter()
        .map(|id| {
            json!({
                "id": {"kind": "youtube#video", "videoId": id},
                "snippet": {"title": id, "thumbnails": {"default": {"url": format!("https://img/{}.jpg", id)}}}
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("channelId", channel_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
        .mount(server)
        .await;
}

/// `videos.list` for one video
pub async fn mount_video(
    server: &MockServer,
    video_id: &str,
    channel_id: &str,
    likes: u64,
    dislikes: u64,
) {
    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("id", video_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": video_id,
                "snippet": {"channelId": channel_id},
                "statistics": {
                    "viewCount": "1000",
                    "likeCount": likes.to_string(),
                    "dislikeCount": dislikes.to_string(),
                    "commentCount": "3"
                }
            }]
        })))
        .mount(server)
        .await;
}

/// GCS resumable upload that succeeds and links objects of `bucket` to `https://media/{name}`
pub async fn mount_gcs_bucket(server: &MockServer, bucket: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/upload/storage/v1/b/{}/o", bucket)))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Location", format!("{}/upload/session/s1", server.uri())),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/upload/session/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bucket": bucket})))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(format!("^/storage/v1/b/{}/o/.+$", bucket)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mediaLink": format!("https://media/{}/object.csv", bucket)
        })))
        .mount(server)
        .await;
}
