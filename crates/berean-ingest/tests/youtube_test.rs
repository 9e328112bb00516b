//! Catalog lister tests against a mock YouTube Data API.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use berean_core::{Error, VideoSource};
use berean_ingest::youtube::{YouTubeClient, YouTubeConfig};

fn client_for(server: &MockServer) -> YouTubeClient {
    YouTubeClient::new(YouTubeConfig {
        base_url: server.uri(),
        api_key: "yt-key".to_string(),
        channel_id: "UC123".to_string(),
        timeout_seconds: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn lists_completed_broadcasts_with_detail_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("channelId", "UC123"))
        .and(query_param("eventType", "completed"))
        .and(query_param("type", "video"))
        .and(query_param("order", "date"))
        .and(query_param("maxResults", "10"))
        .and(query_param("key", "yt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": { "videoId": "vid-new" } },
                { "id": { "videoId": "vid-old" } }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("part", "snippet,contentDetails"))
        .and(query_param("id", "vid-new,vid-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {
                    "id": "vid-old",
                    "snippet": {
                        "title": "Older Service",
                        "description": "Full older description",
                        "publishedAt": "2026-08-16T10:00:00Z",
                        "thumbnails": { "high": { "url": "https://img/old.jpg" } }
                    },
                    "contentDetails": { "duration": "PT45M" }
                },
                {
                    "id": "vid-new",
                    "snippet": {
                        "title": "Newer Service",
                        "description": "Full newer description",
                        "publishedAt": "2026-08-23T10:00:00Z",
                        "thumbnails": { "high": { "url": "https://img/new.jpg" } }
                    },
                    "contentDetails": { "duration": "PT1H30M" }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let videos = client_for(&server).latest_completed(10).await.unwrap();

    assert_eq!(videos.len(), 2);
    // Newest first regardless of detail response order.
    assert_eq!(videos[0].youtube_id, "vid-new");
    assert_eq!(videos[0].duration_seconds, 5400);
    assert_eq!(videos[1].youtube_id, "vid-old");
    assert_eq!(videos[1].description, "Full older description");
}

#[tokio::test]
async fn empty_search_skips_the_detail_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let videos = client_for(&server).latest_completed(10).await.unwrap();
    assert!(videos.is_empty());
}

#[tokio::test]
async fn api_failure_maps_to_source_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client_for(&server).latest_completed(10).await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));
}
