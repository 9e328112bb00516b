//! The ingestion orchestrator.
//!
//! Coordinates the source lister, transcript provider, content generator,
//! persistence store, and notifier. Videos move through the per-video
//! state machine strictly sequentially — the dedup claim and the
//! processed flag must not race across videos, and the generation service
//! carries per-request cost.
//!
//! Failure isolation is per-video: transcript, generation, and
//! persistence failures are caught at the loop boundary and converted to
//! a skip-and-continue. Only lister failure aborts a batch.

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use berean_core::{
    defaults, DeliveryReport, Error, IngestSummary, Lesson, LessonDigest, LessonGenerator,
    LessonNotifier, LessonRepository, NewLesson, NewLessonEmail, QuestionRepository, Result,
    TranscriptSource, UserRepository, Video, VideoRepository, VideoSource,
};

/// Configuration for the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Candidate videos requested from the catalog per batch.
    pub fetch_limit: u32,
    /// Minimum transcript length (characters) to attempt generation.
    pub transcript_min_chars: usize,
    /// Public application URL used for notification deep links.
    pub app_url: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            fetch_limit: defaults::FETCH_LIMIT,
            transcript_min_chars: defaults::TRANSCRIPT_MIN_CHARS,
            app_url: "http://localhost:3000".to_string(),
        }
    }
}

impl IngestConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `INGEST_FETCH_LIMIT` | `10` |
    /// | `APP_URL` | `http://localhost:3000` |
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(limit) = std::env::var("INGEST_FETCH_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.fetch_limit = limit;
        }
        if let Ok(url) = std::env::var("APP_URL") {
            config.app_url = url;
        }
        config
    }
}

/// Outcome of processing one claimed (or re-driven) video.
#[derive(Debug)]
pub enum VideoOutcome {
    /// The video is already processed; nothing to do.
    AlreadyProcessed,
    /// Transcript missing or below the length threshold. The video stays
    /// unprocessed, transcript unattached.
    TranscriptUnavailable,
    /// Generation failed or returned a malformed shape. The video stays
    /// transcript-attached but unprocessed.
    GenerationFailed,
    /// A store write was rejected mid-way. Parents are always inserted
    /// before children, so partial state is recoverable, not orphaned.
    PersistenceFailed,
    /// Lesson and questions persisted, video marked processed,
    /// notifications attempted.
    Processed {
        digest: LessonDigest,
        delivery: DeliveryReport,
    },
}

/// The ingestion orchestrator. All collaborators are injected.
pub struct IngestPipeline {
    videos: Arc<dyn VideoRepository>,
    lessons: Arc<dyn LessonRepository>,
    questions: Arc<dyn QuestionRepository>,
    users: Arc<dyn UserRepository>,
    source: Arc<dyn VideoSource>,
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<dyn LessonGenerator>,
    notifier: Arc<dyn LessonNotifier>,
    config: IngestConfig,
}

impl IngestPipeline {
    /// Create a pipeline over the given repositories and collaborators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        lessons: Arc<dyn LessonRepository>,
        questions: Arc<dyn QuestionRepository>,
        users: Arc<dyn UserRepository>,
        source: Arc<dyn VideoSource>,
        transcripts: Arc<dyn TranscriptSource>,
        generator: Arc<dyn LessonGenerator>,
        notifier: Arc<dyn LessonNotifier>,
        config: IngestConfig,
    ) -> Self {
        Self {
            videos,
            lessons,
            questions,
            users,
            source,
            transcripts,
            generator,
            notifier,
            config,
        }
    }

    /// Run one ingestion batch and return its summary.
    ///
    /// The recency cutoff is the most recent stored publish timestamp,
    /// fixed once per batch: each candidate is compared to that original
    /// cutoff, never to a moving watermark, so out-of-order results
    /// within one batch cannot cause gaps. An empty store disables the
    /// gate so the first run accepts everything the lister returns.
    pub async fn run_batch(&self) -> Result<IngestSummary> {
        let start = Instant::now();
        let cutoff = self.videos.latest_published_at().await?;
        let candidates = self.source.latest_completed(self.config.fetch_limit).await?;

        info!(
            subsystem = "ingest",
            component = "pipeline",
            op = "run_batch",
            result_count = candidates.len(),
            cutoff = ?cutoff,
            "Starting ingestion batch"
        );

        let mut summary = IngestSummary {
            discovered: candidates.len(),
            ..Default::default()
        };

        for candidate in candidates {
            if let Some(cutoff) = cutoff {
                if candidate.published_at <= cutoff {
                    summary.skipped_stale += 1;
                    continue;
                }
            }

            // The conditional insert is the dedup check and the claim in
            // one step: of two racing runs, exactly one gets a row back.
            let claimed = match self.videos.claim(candidate.clone().into()).await {
                Ok(Some(video)) => video,
                Ok(None) => {
                    summary.skipped_existing += 1;
                    continue;
                }
                Err(e) => {
                    warn!(
                        subsystem = "ingest",
                        component = "pipeline",
                        youtube_id = %candidate.youtube_id,
                        error = %e,
                        "Failed to claim video"
                    );
                    summary.persistence_failures += 1;
                    continue;
                }
            };
            summary.new_videos += 1;

            info!(
                subsystem = "ingest",
                component = "pipeline",
                youtube_id = %claimed.youtube_id,
                video_id = %claimed.id,
                "Claimed new video"
            );

            match self.run_video(&claimed).await {
                VideoOutcome::AlreadyProcessed => {}
                VideoOutcome::TranscriptUnavailable => summary.skipped_no_transcript += 1,
                VideoOutcome::GenerationFailed => summary.generation_failures += 1,
                VideoOutcome::PersistenceFailed => summary.persistence_failures += 1,
                VideoOutcome::Processed { digest, delivery } => {
                    summary.lessons_created += 1;
                    summary.emails_sent += delivery.sent;
                    summary.emails_failed += delivery.failed;
                    summary.lessons.push(digest);
                }
            }
        }

        info!(
            subsystem = "ingest",
            component = "pipeline",
            op = "run_batch",
            discovered = summary.discovered,
            new_videos = summary.new_videos,
            lessons_created = summary.lessons_created,
            emails_sent = summary.emails_sent,
            emails_failed = summary.emails_failed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Ingestion batch complete"
        );
        Ok(summary)
    }

    /// Process one existing video by row id (the manual re-drive path).
    pub async fn process_video(&self, video_id: Uuid) -> Result<VideoOutcome> {
        let video = self
            .videos
            .get(video_id)
            .await?
            .ok_or(Error::VideoNotFound(video_id))?;
        if video.processed {
            return Ok(VideoOutcome::AlreadyProcessed);
        }
        Ok(self.run_video(&video).await)
    }

    /// Run the transcript → generation → persistence → notification steps
    /// for one unprocessed video.
    async fn run_video(&self, video: &Video) -> VideoOutcome {
        // Reuse a previously attached transcript before re-fetching.
        let (transcript, already_attached) = match &video.transcript {
            Some(t) if t.chars().count() >= self.config.transcript_min_chars => {
                (t.clone(), true)
            }
            _ => match self.transcripts.fetch_transcript(&video.youtube_id).await {
                Ok(t) => (t, false),
                Err(e) => {
                    info!(
                        subsystem = "ingest",
                        component = "pipeline",
                        youtube_id = %video.youtube_id,
                        error = %e,
                        "Transcript fetch failed; leaving video unprocessed"
                    );
                    return VideoOutcome::TranscriptUnavailable;
                }
            },
        };

        // Quality gate, not an error path: a short transcript is never
        // attached and the video stays unprocessed.
        if transcript.chars().count() < self.config.transcript_min_chars {
            info!(
                subsystem = "ingest",
                component = "pipeline",
                youtube_id = %video.youtube_id,
                transcript_len = transcript.len(),
                "Transcript below length threshold; skipping"
            );
            return VideoOutcome::TranscriptUnavailable;
        }

        if !already_attached {
            if let Err(e) = self.videos.attach_transcript(video.id, &transcript).await {
                warn!(
                    subsystem = "ingest",
                    component = "pipeline",
                    video_id = %video.id,
                    error = %e,
                    "Failed to persist transcript"
                );
                return VideoOutcome::PersistenceFailed;
            }
        }

        let content = match self
            .generator
            .generate(&transcript, &video.title, &video.description)
            .await
        {
            Ok(content) => content,
            Err(e) => {
                warn!(
                    subsystem = "ingest",
                    component = "pipeline",
                    youtube_id = %video.youtube_id,
                    error = %e,
                    "Content generation failed; video stays unprocessed"
                );
                return VideoOutcome::GenerationFailed;
            }
        };

        // Parent before children: lesson, then its question batch, then
        // the processed flag.
        let lesson_title = if content.lesson_title.trim().is_empty() {
            video.title.clone()
        } else {
            content.lesson_title.clone()
        };
        let lesson = match self
            .lessons
            .insert(NewLesson {
                video_id: video.id,
                title: lesson_title,
                summary: content.summary.clone(),
                key_themes: content.key_themes.clone(),
                scripture_references: content.scripture_references.clone(),
                is_published: true,
                order_index: 0,
            })
            .await
        {
            Ok(lesson) => lesson,
            Err(e) => {
                warn!(
                    subsystem = "ingest",
                    component = "pipeline",
                    video_id = %video.id,
                    error = %e,
                    "Failed to insert lesson"
                );
                return VideoOutcome::PersistenceFailed;
            }
        };

        let question_count = content.questions.len();
        if let Err(e) = self
            .questions
            .insert_batch(content.to_new_questions(lesson.id))
            .await
        {
            warn!(
                subsystem = "ingest",
                component = "pipeline",
                lesson_id = %lesson.id,
                error = %e,
                "Failed to insert question batch"
            );
            return VideoOutcome::PersistenceFailed;
        }

        if let Err(e) = self.videos.mark_processed(video.id).await {
            warn!(
                subsystem = "ingest",
                component = "pipeline",
                video_id = %video.id,
                error = %e,
                "Failed to mark video processed"
            );
            return VideoOutcome::PersistenceFailed;
        }

        info!(
            subsystem = "ingest",
            component = "pipeline",
            op = "process_video",
            video_id = %video.id,
            lesson_id = %lesson.id,
            result_count = question_count,
            "Lesson persisted"
        );

        // Post-persistence hook: delivery failures are structurally
        // incapable of affecting persisted state.
        let delivery = self.notify(&lesson, video).await;

        VideoOutcome::Processed {
            digest: LessonDigest {
                lesson_id: lesson.id,
                title: lesson.title.clone(),
                question_count,
            },
            delivery,
        }
    }

    /// Best-effort new-lesson notification to every registered user.
    async fn notify(&self, lesson: &Lesson, video: &Video) -> DeliveryReport {
        let recipients = match self.users.list_emails().await {
            Ok(recipients) => recipients,
            Err(e) => {
                warn!(
                    subsystem = "ingest",
                    component = "pipeline",
                    lesson_id = %lesson.id,
                    error = %e,
                    "Failed to list notification recipients"
                );
                return DeliveryReport::default();
            }
        };
        if recipients.is_empty() {
            return DeliveryReport::default();
        }

        self.notifier
            .notify_all(
                &recipients,
                &NewLessonEmail {
                    lesson_id: lesson.id,
                    lesson_title: lesson.title.clone(),
                    summary: lesson.summary.clone(),
                    video_title: video.title.clone(),
                    published_at: video.published_at,
                    app_url: self.config.app_url.clone(),
                },
            )
            .await
    }
}
