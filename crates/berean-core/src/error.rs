//! Error types for berean.

use thiserror::Error;

/// Result type alias using berean's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for berean operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Video catalog API unreachable — aborts the whole ingest batch
    #[error("Video source unavailable: {0}")]
    SourceUnavailable(String),

    /// Transcript missing or below the minimum length threshold.
    /// A quality gate, not a hard failure: the video is skipped.
    #[error("Transcript unavailable for video {0}")]
    TranscriptUnavailable(String),

    /// Generation call failed or returned an unparseable/incomplete
    /// structure. The orchestrator skips the video rather than persist
    /// partial content.
    #[error("Generation malformed: {0}")]
    GenerationMalformed(String),

    /// Notification delivery failed
    #[error("Notification error: {0}")]
    Notification(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Video not found
    #[error("Video not found: {0}")]
    VideoNotFound(uuid::Uuid),

    /// Lesson not found
    #[error("Lesson not found: {0}")]
    LessonNotFound(uuid::Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Authentication/authorization failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Whether this error aborts an entire ingest batch.
    ///
    /// Only lister-level failure propagates to the batch caller; every
    /// per-video error is caught at the orchestration loop boundary and
    /// converted to a skip-and-continue.
    pub fn aborts_batch(&self) -> bool {
        matches!(self, Error::SourceUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_source_unavailable() {
        let err = Error::SourceUnavailable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "Video source unavailable: connection refused"
        );
    }

    #[test]
    fn test_error_display_transcript_unavailable() {
        let err = Error::TranscriptUnavailable("abc123".to_string());
        assert_eq!(err.to_string(), "Transcript unavailable for video abc123");
    }

    #[test]
    fn test_error_display_generation_malformed() {
        let err = Error::GenerationMalformed("missing summary".to_string());
        assert_eq!(err.to_string(), "Generation malformed: missing summary");
    }

    #[test]
    fn test_error_display_notification() {
        let err = Error::Notification("provider rejected".to_string());
        assert_eq!(err.to_string(), "Notification error: provider rejected");
    }

    #[test]
    fn test_error_display_video_not_found() {
        let id = Uuid::nil();
        let err = Error::VideoNotFound(id);
        assert_eq!(err.to_string(), format!("Video not found: {}", id));
    }

    #[test]
    fn test_error_display_lesson_not_found() {
        let id = Uuid::new_v4();
        let err = Error::LessonNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_config() {
        let err = Error::Config("missing API key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing API key");
    }

    #[test]
    fn test_error_display_unauthorized() {
        let err = Error::Unauthorized("bad cron secret".to_string());
        assert_eq!(err.to_string(), "Unauthorized: bad cron secret");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_aborts_batch_only_for_source_unavailable() {
        assert!(Error::SourceUnavailable("x".into()).aborts_batch());
        assert!(!Error::TranscriptUnavailable("x".into()).aborts_batch());
        assert!(!Error::GenerationMalformed("x".into()).aborts_batch());
        assert!(!Error::Notification("x".into()).aborts_batch());
        assert!(!Error::Internal("x".into()).aborts_batch());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn test_result_type_ok() {
        fn get_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(get_result().unwrap(), 42);
    }
}
