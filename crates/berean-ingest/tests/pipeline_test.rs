//! Orchestrator behavior tests over in-memory collaborators.

use std::sync::Arc;

use chrono::{Duration, Utc};

use berean_core::{Error, SourceVideo, TranscriptSource, VideoRepository, VideoSource};
use berean_inference::mock::MockLessonGenerator;
use berean_ingest::testing::{
    FailingVideoSource, MemoryStore, RecordingNotifier, StaticTranscripts, StaticVideoSource,
};
use berean_ingest::{IngestConfig, IngestPipeline, VideoOutcome};

fn long_transcript() -> String {
    "In the beginning God created the heavens and the earth. ".repeat(5)
}

fn source_video(youtube_id: &str, title: &str, hours_ago: i64) -> SourceVideo {
    SourceVideo {
        youtube_id: youtube_id.to_string(),
        title: title.to_string(),
        description: format!("Recording of {title}"),
        published_at: Utc::now() - Duration::hours(hours_ago),
        thumbnail_url: format!("https://i.ytimg.com/vi/{youtube_id}/hqdefault.jpg"),
        duration_seconds: 3600,
    }
}

fn pipeline(
    store: &MemoryStore,
    source: Arc<dyn VideoSource>,
    transcripts: Arc<dyn TranscriptSource>,
    generator: Arc<MockLessonGenerator>,
    notifier: &RecordingNotifier,
) -> IngestPipeline {
    IngestPipeline::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        source,
        transcripts,
        generator,
        Arc::new(notifier.clone()),
        IngestConfig::default(),
    )
}

#[tokio::test]
async fn bootstrap_run_accepts_all_candidates_on_empty_store() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![
            source_video("yt-old", "Last Year's Sermon", 24 * 365),
            source_video("yt-new", "Yesterday's Sermon", 24),
        ])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.new_videos, 2);
    assert_eq!(summary.lessons_created, 2);
    assert_eq!(summary.skipped_stale, 0);
    assert_eq!(store.lessons().len(), 2);
    assert!(store.videos().iter().all(|v| v.processed));
}

#[tokio::test]
async fn rerun_with_same_candidates_creates_nothing() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let source: Arc<dyn VideoSource> = Arc::new(StaticVideoSource::new(vec![
        source_video("yt-a", "Sermon A", 48),
        source_video("yt-b", "Sermon B", 24),
    ]));
    let pipeline = pipeline(
        &store,
        source,
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let first = pipeline.run_batch().await.unwrap();
    assert_eq!(first.lessons_created, 2);

    let second = pipeline.run_batch().await.unwrap();
    assert_eq!(second.new_videos, 0);
    assert_eq!(second.lessons_created, 0);
    // Stored candidates fall at or before the cutoff on the second run.
    assert_eq!(second.skipped_stale, 2);
    assert_eq!(store.videos().len(), 2);
    assert_eq!(store.lessons().len(), 2);
}

#[tokio::test]
async fn recency_cutoff_skips_candidates_not_strictly_newer() {
    let store = MemoryStore::new();
    let stored = source_video("yt-stored", "Stored Sermon", 24);
    store.seed_video(&stored, true);

    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![
            source_video("yt-newer", "Newer Sermon", 1),
            source_video("yt-older", "Older Sermon", 48),
            stored.clone(),
        ])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.new_videos, 1);
    assert_eq!(summary.lessons_created, 1);
    assert_eq!(summary.skipped_stale, 2);
    assert!(store
        .videos()
        .iter()
        .any(|v| v.youtube_id == "yt-newer" && v.processed));
    assert!(!store.videos().iter().any(|v| v.youtube_id == "yt-older"));
}

#[tokio::test]
async fn processed_lesson_carries_nine_questions_in_dense_order() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![source_video(
            "yt-a", "Sermon A", 24,
        )])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    pipeline.run_batch().await.unwrap();

    let lessons = store.lessons();
    assert_eq!(lessons.len(), 1);
    let questions = store.questions();
    assert_eq!(questions.len(), 9);
    let mut order: Vec<i32> = questions.iter().map(|q| q.order_index).collect();
    order.sort_unstable();
    assert_eq!(order, (0..9).collect::<Vec<i32>>());
    assert!(questions.iter().all(|q| q.lesson_id == lessons[0].id));
}

#[tokio::test]
async fn generation_failure_does_not_poison_the_rest_of_the_batch() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![
            source_video("yt-a", "Sermon A", 72),
            source_video("yt-b", "Sermon B", 48),
            source_video("yt-c", "Sermon C", 24),
        ])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new().failing_for("Sermon B")),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.new_videos, 3);
    assert_eq!(summary.lessons_created, 2);
    assert_eq!(summary.generation_failures, 1);

    // The failed video keeps its transcript for a later manual re-drive.
    let failed = store
        .videos()
        .into_iter()
        .find(|v| v.youtube_id == "yt-b")
        .unwrap();
    assert!(!failed.processed);
    assert!(failed.transcript.is_some());
}

#[tokio::test]
async fn short_transcript_is_skipped_without_being_attached() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let short = "a".repeat(99);
    assert_eq!(short.chars().count(), 99);
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![source_video(
            "yt-short",
            "Short Sermon",
            24,
        )])),
        Arc::new(StaticTranscripts::new(&short)),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.skipped_no_transcript, 1);
    assert_eq!(summary.lessons_created, 0);
    let video = store.videos().into_iter().next().unwrap();
    assert!(!video.processed);
    assert!(video.transcript.is_none());
}

#[tokio::test]
async fn transcript_fetch_failure_leaves_video_claimable_for_redrive() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let transcripts = StaticTranscripts::new(&long_transcript()).with_override(
        "yt-b",
        Err(Error::TranscriptUnavailable("yt-b".to_string())),
    );
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![
            source_video("yt-a", "Sermon A", 48),
            source_video("yt-b", "Sermon B", 24),
        ])),
        Arc::new(transcripts),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.lessons_created, 1);
    assert_eq!(summary.skipped_no_transcript, 1);
    let unprocessed: Vec<_> = store
        .videos()
        .into_iter()
        .filter(|v| !v.processed)
        .collect();
    assert_eq!(unprocessed.len(), 1);
    assert_eq!(unprocessed[0].youtube_id, "yt-b");
}

#[tokio::test]
async fn lister_failure_aborts_the_batch_before_any_write() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(FailingVideoSource),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let err = pipeline.run_batch().await.unwrap_err();
    assert!(matches!(err, Error::SourceUnavailable(_)));
    assert!(store.videos().is_empty());
    assert!(store.lessons().is_empty());
}

#[tokio::test]
async fn notification_fans_out_to_registered_users_after_persistence() {
    let store = MemoryStore::with_users(&["a@example.com", "b@example.com"]);
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![source_video(
            "yt-a", "Sermon A", 24,
        )])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();

    assert_eq!(summary.emails_sent, 2);
    assert_eq!(summary.emails_failed, 0);
    let calls = notifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.len(), 2);
    // The advertised lesson exists and belongs to a processed video.
    let lesson_id = calls[0].1.lesson_id;
    let lesson = store
        .lessons()
        .into_iter()
        .find(|l| l.id == lesson_id)
        .unwrap();
    let video = store
        .videos()
        .into_iter()
        .find(|v| v.id == lesson.video_id)
        .unwrap();
    assert!(video.processed);
}

#[tokio::test]
async fn no_registered_users_means_no_notifier_call() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(vec![source_video(
            "yt-a", "Sermon A", 24,
        )])),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let summary = pipeline.run_batch().await.unwrap();
    assert_eq!(summary.emails_sent, 0);
    assert!(notifier.calls().is_empty());
}

#[tokio::test]
async fn process_video_redrives_an_unprocessed_video() {
    let store = MemoryStore::new();
    let video = store.seed_video(&source_video("yt-a", "Sermon A", 24), false);

    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(Vec::new())),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let outcome = pipeline.process_video(video.id).await.unwrap();
    assert!(matches!(outcome, VideoOutcome::Processed { .. }));
    assert!(store.videos()[0].processed);
    assert_eq!(store.lessons().len(), 1);
}

#[tokio::test]
async fn process_video_is_a_noop_when_already_processed() {
    let store = MemoryStore::new();
    let video = store.seed_video(&source_video("yt-a", "Sermon A", 24), true);

    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(Vec::new())),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let outcome = pipeline.process_video(video.id).await.unwrap();
    assert!(matches!(outcome, VideoOutcome::AlreadyProcessed));
    assert!(store.lessons().is_empty());
}

#[tokio::test]
async fn process_video_rejects_an_unknown_id() {
    let store = MemoryStore::new();
    let notifier = RecordingNotifier::new();
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(Vec::new())),
        Arc::new(StaticTranscripts::new(&long_transcript())),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let missing = uuid::Uuid::new_v4();
    let err = pipeline.process_video(missing).await.unwrap_err();
    assert!(matches!(err, Error::VideoNotFound(id) if id == missing));
}

#[tokio::test]
async fn attached_transcript_is_reused_without_refetching() {
    let store = MemoryStore::new();
    let video = store.seed_video(&source_video("yt-a", "Sermon A", 24), false);
    store
        .attach_transcript(video.id, &long_transcript())
        .await
        .unwrap();

    let notifier = RecordingNotifier::new();
    // Fetching would fail, so success proves the stored transcript was used.
    let transcripts = StaticTranscripts::new("").with_override(
        "yt-a",
        Err(Error::TranscriptUnavailable("yt-a".to_string())),
    );
    let pipeline = pipeline(
        &store,
        Arc::new(StaticVideoSource::new(Vec::new())),
        Arc::new(transcripts),
        Arc::new(MockLessonGenerator::new()),
        &notifier,
    );

    let outcome = pipeline.process_video(video.id).await.unwrap();
    assert!(matches!(outcome, VideoOutcome::Processed { .. }));
}
