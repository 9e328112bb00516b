//! Core traits for berean abstractions.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy. Every external collaborator of the ingestion pipeline — the
//! video catalog, transcript source, content generator, notifier, and the
//! persistence store — is injected through one of these traits; there is
//! no ambient singleton state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// REPOSITORY TRAITS
// =============================================================================

/// Repository for source video records.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Conditionally insert a new video, claiming it for processing.
    ///
    /// Returns `None` when a row with the same external identifier already
    /// exists. The uniqueness constraint on the external identifier makes
    /// this insert the mutual-exclusion point between overlapping ingest
    /// runs; callers must not pre-check existence with a separate read.
    async fn claim(&self, video: NewVideo) -> Result<Option<Video>>;

    /// Fetch a video by row id.
    async fn get(&self, id: Uuid) -> Result<Option<Video>>;

    /// Fetch a video by its external identifier.
    async fn find_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Video>>;

    /// Publish timestamp of the most recently published stored video.
    ///
    /// `None` on an empty store; the recency gate is disabled for that
    /// first-run bootstrap rather than defaulting to the current time.
    async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>>;

    /// Attach a fetched transcript to a video record.
    async fn attach_transcript(&self, id: Uuid, transcript: &str) -> Result<()>;

    /// Flip the processed flag once lesson and questions are persisted.
    async fn mark_processed(&self, id: Uuid) -> Result<()>;

    /// Most recently published videos, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Video>>;

    /// Videos without a lesson, available for manual re-drive.
    async fn list_unprocessed(&self) -> Result<Vec<Video>>;
}

/// Repository for derived lessons.
#[async_trait]
pub trait LessonRepository: Send + Sync {
    /// Insert a lesson and return the stored row.
    async fn insert(&self, lesson: NewLesson) -> Result<Lesson>;

    /// Fetch a lesson by id.
    async fn get(&self, id: Uuid) -> Result<Option<Lesson>>;

    /// Published lessons in display order.
    async fn list_published(&self) -> Result<Vec<Lesson>>;
}

/// Repository for quiz questions.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Insert all of a lesson's questions as one batch, in generated order.
    async fn insert_batch(&self, questions: Vec<NewQuestion>) -> Result<Vec<Question>>;

    /// A lesson's questions in order-index order.
    async fn list_by_lesson(&self, lesson_id: Uuid) -> Result<Vec<Question>>;
}

/// Repository for per-user progress, stats, completions, and notes.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Idempotent attempt upsert keyed by (user, question); increments the
    /// attempt count, and applies XP/stat updates on a correct answer.
    async fn record_attempt(&self, req: RecordAttemptRequest) -> Result<UserProgress>;

    /// Record a completion, keeping the best score seen, and update the
    /// user's streak.
    async fn complete_lesson(&self, req: CompleteLessonRequest) -> Result<LessonCompletion>;

    /// A user's per-question progress within one lesson.
    async fn get_progress(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Vec<UserProgress>>;

    /// Fetch a user's stats row, creating a zeroed one if absent.
    async fn get_or_create_stats(&self, user_id: Uuid) -> Result<UserStats>;

    /// Upsert free-text notes keyed by (user, lesson).
    async fn save_notes(&self, req: SaveNotesRequest) -> Result<LessonNote>;

    /// Fetch notes for a (user, lesson) pair; absence is a normal outcome.
    async fn get_notes(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Option<LessonNote>>;
}

/// Repository for registered users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Email addresses of every registered user (notification recipients).
    async fn list_emails(&self) -> Result<Vec<String>>;
}

// =============================================================================
// COLLABORATOR TRAITS
// =============================================================================

/// Source Video Lister: queries the external catalog for a channel's
/// recently completed recordings.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// Latest completed broadcasts/uploads, newest first, normalized with
    /// secondary detail (duration, full description) already resolved.
    ///
    /// Fails with `Error::SourceUnavailable` on API failure; no internal
    /// retry — the orchestrator decides whether to abort the batch.
    async fn latest_completed(&self, limit: u32) -> Result<Vec<SourceVideo>>;
}

/// Transcript Provider: spoken-word transcript text for one source video.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Transcript text for the given external video identifier. May be
    /// short or empty; callers apply the minimum-length quality gate.
    async fn fetch_transcript(&self, youtube_id: &str) -> Result<String>;
}

/// Content Generator: derives structured lesson content from a transcript.
#[async_trait]
pub trait LessonGenerator: Send + Sync {
    /// Generate lesson content from transcript + title + description.
    ///
    /// Implementations must request schema-constrained output and validate
    /// the parsed shape; any transport, parse, or shape failure surfaces
    /// as `Error::GenerationMalformed`.
    async fn generate(
        &self,
        transcript: &str,
        video_title: &str,
        video_description: &str,
    ) -> Result<GeneratedContent>;
}

/// Notifier: fans a "new lesson" notification out to all recipients.
#[async_trait]
pub trait LessonNotifier: Send + Sync {
    /// Attempt delivery to every recipient; individual failures are
    /// counted, never raised. `sent + failed` always equals the
    /// recipient count.
    async fn notify_all(&self, recipients: &[String], email: &NewLessonEmail) -> DeliveryReport;
}
