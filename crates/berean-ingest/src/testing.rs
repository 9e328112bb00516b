//! In-memory collaborator implementations for pipeline tests.
//!
//! `MemoryStore` implements the repository traits over mutex-guarded
//! vectors so orchestrator behavior can be exercised without Postgres.
//! Always compiled so integration tests in `tests/` can use it too.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use berean_core::{
    DeliveryReport, Error, Lesson, LessonNotifier, LessonRepository, NewLesson, NewLessonEmail,
    NewQuestion, NewVideo, Question, QuestionRepository, Result, SourceVideo, TranscriptSource,
    UserRepository, Video, VideoRepository, VideoSource,
};

#[derive(Default)]
struct StoreInner {
    videos: Vec<Video>,
    lessons: Vec<Lesson>,
    questions: Vec<Question>,
    users: Vec<String>,
}

/// Shared in-memory store implementing every repository trait.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: &[&str]) -> Self {
        let store = Self::new();
        store.lock().users = users.iter().map(|u| u.to_string()).collect();
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // Poisoning is unrecoverable in a test fixture.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed an already-stored video (optionally already processed).
    pub fn seed_video(&self, source: &SourceVideo, processed: bool) -> Video {
        let video = Video {
            id: Uuid::new_v4(),
            youtube_id: source.youtube_id.clone(),
            title: source.title.clone(),
            description: source.description.clone(),
            published_at: source.published_at,
            thumbnail_url: source.thumbnail_url.clone(),
            duration_seconds: source.duration_seconds,
            transcript: None,
            processed,
            created_at: Utc::now(),
        };
        self.lock().videos.push(video.clone());
        video
    }

    pub fn videos(&self) -> Vec<Video> {
        self.lock().videos.clone()
    }

    pub fn lessons(&self) -> Vec<Lesson> {
        self.lock().lessons.clone()
    }

    pub fn questions(&self) -> Vec<Question> {
        self.lock().questions.clone()
    }
}

#[async_trait]
impl VideoRepository for MemoryStore {
    async fn claim(&self, video: NewVideo) -> Result<Option<Video>> {
        let mut inner = self.lock();
        if inner.videos.iter().any(|v| v.youtube_id == video.youtube_id) {
            return Ok(None);
        }
        let stored = Video {
            id: Uuid::new_v4(),
            youtube_id: video.youtube_id,
            title: video.title,
            description: video.description,
            published_at: video.published_at,
            thumbnail_url: video.thumbnail_url,
            duration_seconds: video.duration_seconds,
            transcript: None,
            processed: false,
            created_at: Utc::now(),
        };
        inner.videos.push(stored.clone());
        Ok(Some(stored))
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>> {
        Ok(self.lock().videos.iter().find(|v| v.id == id).cloned())
    }

    async fn find_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Video>> {
        Ok(self
            .lock()
            .videos
            .iter()
            .find(|v| v.youtube_id == youtube_id)
            .cloned())
    }

    async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>> {
        Ok(self.lock().videos.iter().map(|v| v.published_at).max())
    }

    async fn attach_transcript(&self, id: Uuid, transcript: &str) -> Result<()> {
        let mut inner = self.lock();
        let video = inner
            .videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(Error::VideoNotFound(id))?;
        video.transcript = Some(transcript.to_string());
        Ok(())
    }

    async fn mark_processed(&self, id: Uuid) -> Result<()> {
        let mut inner = self.lock();
        let video = inner
            .videos
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(Error::VideoNotFound(id))?;
        video.processed = true;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Video>> {
        let mut videos = self.lock().videos.clone();
        videos.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        videos.truncate(limit as usize);
        Ok(videos)
    }

    async fn list_unprocessed(&self) -> Result<Vec<Video>> {
        Ok(self
            .lock()
            .videos
            .iter()
            .filter(|v| !v.processed)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LessonRepository for MemoryStore {
    async fn insert(&self, lesson: NewLesson) -> Result<Lesson> {
        let stored = Lesson {
            id: Uuid::new_v4(),
            video_id: lesson.video_id,
            title: lesson.title,
            summary: lesson.summary,
            key_themes: lesson.key_themes,
            scripture_references: lesson.scripture_references,
            is_published: lesson.is_published,
            order_index: lesson.order_index,
            created_at: Utc::now(),
        };
        self.lock().lessons.push(stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Lesson>> {
        Ok(self.lock().lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn list_published(&self) -> Result<Vec<Lesson>> {
        Ok(self
            .lock()
            .lessons
            .iter()
            .filter(|l| l.is_published)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuestionRepository for MemoryStore {
    async fn insert_batch(&self, questions: Vec<NewQuestion>) -> Result<Vec<Question>> {
        let mut inner = self.lock();
        let stored: Vec<Question> = questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                lesson_id: q.lesson_id,
                question_type: q.question_type,
                question_text: q.question_text,
                options: q.options,
                correct_answer: q.correct_answer,
                explanation: q.explanation,
                xp_value: q.xp_value,
                order_index: q.order_index,
            })
            .collect();
        inner.questions.extend(stored.clone());
        Ok(stored)
    }

    async fn list_by_lesson(&self, lesson_id: Uuid) -> Result<Vec<Question>> {
        let mut questions: Vec<Question> = self
            .lock()
            .questions
            .iter()
            .filter(|q| q.lesson_id == lesson_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.order_index);
        Ok(questions)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list_emails(&self) -> Result<Vec<String>> {
        Ok(self.lock().users.clone())
    }
}

/// Video source that returns a fixed candidate list.
pub struct StaticVideoSource {
    videos: Vec<SourceVideo>,
}

impl StaticVideoSource {
    pub fn new(videos: Vec<SourceVideo>) -> Self {
        Self { videos }
    }
}

#[async_trait]
impl VideoSource for StaticVideoSource {
    async fn latest_completed(&self, limit: u32) -> Result<Vec<SourceVideo>> {
        Ok(self.videos.iter().take(limit as usize).cloned().collect())
    }
}

/// Video source that always fails, for batch-abort tests.
pub struct FailingVideoSource;

#[async_trait]
impl VideoSource for FailingVideoSource {
    async fn latest_completed(&self, _limit: u32) -> Result<Vec<SourceVideo>> {
        Err(Error::SourceUnavailable("catalog unreachable".to_string()))
    }
}

/// Transcript source returning a fixed text for every video, with optional
/// per-video overrides.
pub struct StaticTranscripts {
    default: String,
    overrides: Vec<(String, Result<String>)>,
}

impl StaticTranscripts {
    pub fn new(default: &str) -> Self {
        Self {
            default: default.to_string(),
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, youtube_id: &str, result: Result<String>) -> Self {
        self.overrides.push((youtube_id.to_string(), result));
        self
    }
}

#[async_trait]
impl TranscriptSource for StaticTranscripts {
    async fn fetch_transcript(&self, youtube_id: &str) -> Result<String> {
        for (id, result) in &self.overrides {
            if id == youtube_id {
                return match result {
                    Ok(text) => Ok(text.clone()),
                    Err(_) => Err(Error::TranscriptUnavailable(youtube_id.to_string())),
                };
            }
        }
        Ok(self.default.clone())
    }
}

/// Notifier that records every fan-out and reports full delivery.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<(Vec<String>, NewLessonEmail)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(Vec<String>, NewLessonEmail)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl LessonNotifier for RecordingNotifier {
    async fn notify_all(&self, recipients: &[String], email: &NewLessonEmail) -> DeliveryReport {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((recipients.to_vec(), email.clone()));
        DeliveryReport {
            sent: recipients.len(),
            failed: 0,
        }
    }
}
