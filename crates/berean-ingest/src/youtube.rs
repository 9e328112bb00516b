//! YouTube Data API v3 client: the Source Video Lister.
//!
//! Two-phase fetch: the search endpoint finds a channel's completed
//! broadcasts newest-first, then a videos detail lookup resolves duration
//! and the untruncated description, which search results omit. Any API
//! failure surfaces as `Error::SourceUnavailable`; the orchestrator
//! decides whether that aborts the batch. No internal retry.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use berean_core::{defaults, Error, Result, SourceVideo, VideoSource};

/// Default YouTube Data API base URL.
pub const DEFAULT_YOUTUBE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Configuration for the YouTube catalog client.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    /// Base URL for the API (overridable for tests).
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Channel whose completed broadcasts are ingested.
    pub channel_id: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl YouTubeConfig {
    /// Create from environment variables (`YOUTUBE_API_KEY`,
    /// `YOUTUBE_CHANNEL_ID`, optional `YOUTUBE_BASE_URL`).
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            base_url: std::env::var("YOUTUBE_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_YOUTUBE_URL.to_string()),
            api_key: std::env::var("YOUTUBE_API_KEY")
                .map_err(|_| Error::Config("YOUTUBE_API_KEY not set".into()))?,
            channel_id: std::env::var("YOUTUBE_CHANNEL_ID")
                .map_err(|_| Error::Config("YOUTUBE_CHANNEL_ID not set".into()))?,
            timeout_seconds: defaults::CATALOG_TIMEOUT_SECS,
        })
    }
}

/// YouTube Data API v3 client implementing [`VideoSource`].
pub struct YouTubeClient {
    client: Client,
    config: YouTubeConfig,
}

impl YouTubeClient {
    /// Create a new client with the given configuration.
    pub fn new(config: YouTubeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(YouTubeConfig::from_env()?)
    }

    async fn search_video_ids(&self, limit: u32) -> Result<Vec<String>> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet"),
                ("channelId", self.config.channel_id.as_str()),
                ("eventType", "completed"),
                ("type", "video"),
                ("order", "date"),
                ("maxResults", &limit.to_string()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("search request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("invalid search body: {}", e)))?;

        Ok(body
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id)
            .collect())
    }

    async fn fetch_details(&self, ids: &[String]) -> Result<Vec<SourceVideo>> {
        let url = format!("{}/videos", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("part", "snippet,contentDetails"),
                ("id", ids.join(",").as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("detail request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::SourceUnavailable(format!(
                "detail lookup returned {}",
                response.status()
            )));
        }

        let body: VideoListResponse = response
            .json()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("invalid detail body: {}", e)))?;

        Ok(body.items.into_iter().map(SourceVideo::from).collect())
    }
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn latest_completed(&self, limit: u32) -> Result<Vec<SourceVideo>> {
        let ids = self.search_video_ids(limit).await?;
        debug!(
            subsystem = "ingest",
            component = "youtube",
            op = "search",
            result_count = ids.len(),
            "Found candidate video ids"
        );

        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut videos = self.fetch_details(&ids).await?;
        // Search order is authoritative (newest first); the detail endpoint
        // does not guarantee it.
        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        info!(
            subsystem = "ingest",
            component = "youtube",
            op = "latest_completed",
            result_count = videos.len(),
            "Listed completed broadcasts"
        );
        Ok(videos)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchItemId,
}

#[derive(Debug, Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Option<Snippet>,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: Option<String>,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<DateTime<Utc>>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    high: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

impl From<VideoItem> for SourceVideo {
    fn from(item: VideoItem) -> Self {
        let snippet = item.snippet.unwrap_or(Snippet {
            title: None,
            description: None,
            published_at: None,
            thumbnails: None,
        });
        let thumbnail_url = snippet
            .thumbnails
            .and_then(|t| t.high.or(t.default))
            .and_then(|t| t.url)
            .unwrap_or_default();
        let duration_seconds = item
            .content_details
            .and_then(|d| d.duration)
            .map(|d| parse_iso8601_duration(&d))
            .unwrap_or(0);

        SourceVideo {
            youtube_id: item.id,
            title: snippet.title.unwrap_or_else(|| "Untitled".to_string()),
            description: snippet.description.unwrap_or_default(),
            published_at: snippet.published_at.unwrap_or_else(Utc::now),
            thumbnail_url,
            duration_seconds,
        }
    }
}

static DURATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap());

/// Parse a YouTube ISO-8601 duration (`PT1H2M10S`) into seconds.
///
/// Unparseable input yields 0 rather than an error; duration is
/// descriptive metadata, not a processing precondition.
pub fn parse_iso8601_duration(duration: &str) -> i32 {
    let Some(caps) = DURATION_RE.captures(duration) else {
        return 0;
    };
    let group = |i: usize| {
        caps.get(i)
            .and_then(|m| m.as_str().parse::<i32>().ok())
            .unwrap_or(0)
    };
    group(1) * 3600 + group(2) * 60 + group(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M10S"), 3730);
    }

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(parse_iso8601_duration("PT45M30S"), 2730);
    }

    #[test]
    fn test_parse_seconds_only() {
        assert_eq!(parse_iso8601_duration("PT59S"), 59);
    }

    #[test]
    fn test_parse_hours_only() {
        assert_eq!(parse_iso8601_duration("PT2H"), 7200);
    }

    #[test]
    fn test_parse_zero_duration() {
        assert_eq!(parse_iso8601_duration("PT0S"), 0);
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert_eq!(parse_iso8601_duration("not-a-duration"), 0);
        assert_eq!(parse_iso8601_duration(""), 0);
    }

    #[test]
    fn test_detail_item_normalization() {
        let json = r#"{
            "id": "abc123",
            "snippet": {
                "title": "Sunday Service",
                "description": "Full description",
                "publishedAt": "2026-08-23T10:00:00Z",
                "thumbnails": { "high": { "url": "https://img/1.jpg" } }
            },
            "contentDetails": { "duration": "PT1H30M" }
        }"#;
        let item: VideoItem = serde_json::from_str(json).unwrap();
        let video = SourceVideo::from(item);
        assert_eq!(video.youtube_id, "abc123");
        assert_eq!(video.title, "Sunday Service");
        assert_eq!(video.duration_seconds, 5400);
        assert_eq!(video.thumbnail_url, "https://img/1.jpg");
    }

    #[test]
    fn test_detail_item_missing_fields_defaults() {
        let item: VideoItem = serde_json::from_str(r#"{"id": "xyz"}"#).unwrap();
        let video = SourceVideo::from(item);
        assert_eq!(video.title, "Untitled");
        assert_eq!(video.duration_seconds, 0);
        assert!(video.thumbnail_url.is_empty());
    }
}
