//! Transcript providers.
//!
//! A transcript source may return short or empty text; the pipeline owns
//! the minimum-length quality gate. Callers must not assume long-form
//! correctness — only length-based availability.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use berean_core::{defaults, Error, Result, TranscriptSource};

/// Transcript provider backed by an HTTP captions service.
///
/// Issues `GET {base_url}/{video_id}` and expects the transcript as the
/// plain-text body. A non-success status is reported as
/// `TranscriptUnavailable`, which the pipeline treats as a skip, not a
/// failure.
pub struct HttpTranscriptSource {
    client: Client,
    base_url: String,
}

impl HttpTranscriptSource {
    /// Create a provider against the given captions service base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(defaults::TRANSCRIPT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Create from the `TRANSCRIPT_SERVICE_URL` environment variable.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("TRANSCRIPT_SERVICE_URL")
            .map_err(|_| Error::Config("TRANSCRIPT_SERVICE_URL not set".into()))?;
        Self::new(base_url)
    }
}

#[async_trait]
impl TranscriptSource for HttpTranscriptSource {
    async fn fetch_transcript(&self, youtube_id: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), youtube_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|_| Error::TranscriptUnavailable(youtube_id.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::TranscriptUnavailable(youtube_id.to_string()));
        }

        let text = response
            .text()
            .await
            .map_err(|_| Error::TranscriptUnavailable(youtube_id.to_string()))?;

        debug!(
            subsystem = "ingest",
            component = "transcript",
            youtube_id = %youtube_id,
            transcript_len = text.len(),
            "Fetched transcript"
        );
        Ok(text)
    }
}

/// Placeholder transcript provider for environments without a captioning
/// integration. Returns a fixed sample transcript for every video.
pub struct PlaceholderTranscripts;

const SAMPLE_TRANSCRIPT: &str = "This is a powerful message about prayer and fasting.

The speaker discusses the importance of seeking God through prayer and fasting, \
emphasizing that these spiritual disciplines unlock supernatural breakthroughs in our lives.

Key points covered:
- Prayer is our direct communication with God
- Fasting demonstrates our hunger for more of God
- When we fast and pray, we position ourselves for breakthrough
- God responds to those who seek Him with their whole heart

The message includes references to:
- Matthew 17:21 - \"This kind does not go out except by prayer and fasting\"
- Acts 13:2 - The church leaders fasted and the Holy Spirit spoke
- Daniel 10 - Daniel's three-week fast brought angelic breakthrough

The speaker emphasizes that prayer and fasting are not just religious activities, \
but powerful weapons in spiritual warfare. Through these disciplines, believers can \
break through demonic strongholds, receive clear direction from God, and experience \
miraculous provision.

The call to action is to commit to regular times of prayer and fasting, making it \
a lifestyle rather than just an occasional practice.";

#[async_trait]
impl TranscriptSource for PlaceholderTranscripts {
    async fn fetch_transcript(&self, youtube_id: &str) -> Result<String> {
        debug!(
            subsystem = "ingest",
            component = "transcript",
            youtube_id = %youtube_id,
            "Using placeholder transcript"
        );
        Ok(SAMPLE_TRANSCRIPT.to_string())
    }
}
