//! HTTP handlers and router for the berean API.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use berean_core::{
    CompleteLessonRequest, Error, LessonRepository, ProgressRepository, QuestionRepository,
    RecordAttemptRequest, SaveNotesRequest, VideoRepository,
};
use berean_db::Database;
use berean_ingest::{IngestPipeline, VideoOutcome};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub pipeline: Arc<IngestPipeline>,
    /// Bearer secret for the cron trigger; required in production.
    pub cron_secret: Option<String>,
    /// Whether the cron gate is enforced (`APP_ENV=production`).
    pub production: bool,
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// Wrapper mapping domain errors onto HTTP responses.
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::SourceUnavailable(_) => StatusCode::BAD_GATEWAY,
            Error::NotFound(_) | Error::VideoNotFound(_) | Error::LessonNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Error::InvalidInput(_) | Error::TranscriptUnavailable(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "Request failed");
        }
        (status, Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

// =============================================================================
// ROUTER
// =============================================================================

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/admin/ingest", post(admin_ingest))
        .route("/api/cron/ingest", get(cron_ingest))
        .route("/api/videos", get(list_videos))
        .route("/api/videos/:id/process", post(process_video))
        .route("/api/lessons", get(list_lessons))
        .route("/api/lessons/:id", get(get_lesson))
        .route("/api/lessons/:id/questions", get(lesson_questions))
        .route(
            "/api/user/progress",
            get(get_progress).post(record_progress),
        )
        .route("/api/user/complete-lesson", post(complete_lesson))
        .route("/api/user/stats", get(user_stats))
        .route("/api/user/notes", get(get_notes).post(save_notes))
        .with_state(state)
}

// =============================================================================
// HEALTH
// =============================================================================

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "berean-api" }))
}

// =============================================================================
// INGESTION TRIGGERS
// =============================================================================

/// Run one ingestion batch synchronously.
///
/// Partial failure still answers 200 with the summary; only total lister
/// failure maps to an error status.
async fn admin_ingest(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let summary = state.pipeline.run_batch().await?;
    Ok(Json(summary))
}

/// Scheduled ingestion trigger, bearer-gated in production.
async fn cron_ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    authorize_cron(
        state.production,
        state.cron_secret.as_deref(),
        headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
    )?;
    let summary = state.pipeline.run_batch().await?;
    Ok(Json(summary))
}

/// Enforce the cron bearer gate. Outside production the gate is open so
/// local runs need no secret.
fn authorize_cron(
    production: bool,
    secret: Option<&str>,
    authorization: Option<&str>,
) -> Result<(), ApiError> {
    if !production {
        return Ok(());
    }
    let secret = secret.ok_or_else(|| {
        ApiError(Error::Unauthorized(
            "cron secret not configured".to_string(),
        ))
    })?;
    match authorization {
        Some(header) if header == format!("Bearer {secret}") => Ok(()),
        _ => Err(ApiError(Error::Unauthorized(
            "invalid cron credentials".to_string(),
        ))),
    }
}

/// Drive one existing video through transcript, generation, persistence,
/// and notification.
async fn process_video(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    match state.pipeline.process_video(id).await? {
        VideoOutcome::AlreadyProcessed => Ok(Json(json!({
            "status": "already_processed",
            "video_id": id,
        }))),
        VideoOutcome::TranscriptUnavailable => {
            Err(ApiError(Error::TranscriptUnavailable(id.to_string())))
        }
        VideoOutcome::GenerationFailed => Err(ApiError(Error::GenerationMalformed(
            "lesson generation failed".to_string(),
        ))),
        VideoOutcome::PersistenceFailed => Err(ApiError(Error::Internal(
            "failed to persist lesson".to_string(),
        ))),
        VideoOutcome::Processed { digest, delivery } => {
            info!(video_id = %id, lesson_id = %digest.lesson_id, "Video processed on demand");
            Ok(Json(json!({
                "status": "processed",
                "video_id": id,
                "lesson_id": digest.lesson_id,
                "lesson_title": digest.title,
                "question_count": digest.question_count,
                "emails_sent": delivery.sent,
                "emails_failed": delivery.failed,
            })))
        }
    }
}

// =============================================================================
// VIDEOS AND LESSONS
// =============================================================================

#[derive(Deserialize)]
struct ListVideosQuery {
    limit: Option<i64>,
}

async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListVideosQuery>,
) -> ApiResult<impl IntoResponse> {
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let videos = state.db.videos.list_recent(limit).await?;
    Ok(Json(videos))
}

async fn list_lessons(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let lessons = state.db.lessons.list_published().await?;
    Ok(Json(lessons))
}

async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let lesson = state
        .db
        .lessons
        .get(id)
        .await?
        .ok_or(Error::LessonNotFound(id))?;
    Ok(Json(lesson))
}

async fn lesson_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    state
        .db
        .lessons
        .get(id)
        .await?
        .ok_or(Error::LessonNotFound(id))?;
    let questions = state.db.questions.list_by_lesson(id).await?;
    Ok(Json(questions))
}

// =============================================================================
// USER PROGRESS
// =============================================================================

#[derive(Deserialize)]
struct ProgressQuery {
    user_id: Uuid,
    lesson_id: Uuid,
}

async fn get_progress(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<impl IntoResponse> {
    let progress = state
        .db
        .progress
        .get_progress(query.user_id, query.lesson_id)
        .await?;
    Ok(Json(progress))
}

async fn record_progress(
    State(state): State<AppState>,
    Json(req): Json<RecordAttemptRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.xp_earned < 0 {
        return Err(ApiError(Error::InvalidInput(
            "xp_earned must be non-negative".to_string(),
        )));
    }
    let progress = state.db.progress.record_attempt(req).await?;
    Ok(Json(progress))
}

async fn complete_lesson(
    State(state): State<AppState>,
    Json(req): Json<CompleteLessonRequest>,
) -> ApiResult<impl IntoResponse> {
    if !(0..=100).contains(&req.score) {
        return Err(ApiError(Error::InvalidInput(
            "score must be between 0 and 100".to_string(),
        )));
    }
    let completion = state.db.progress.complete_lesson(req).await?;
    Ok(Json(completion))
}

#[derive(Deserialize)]
struct StatsQuery {
    user_id: Uuid,
}

async fn user_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<impl IntoResponse> {
    let stats = state.db.progress.get_or_create_stats(query.user_id).await?;
    Ok(Json(stats))
}

// =============================================================================
// NOTES
// =============================================================================

async fn get_notes(
    State(state): State<AppState>,
    Query(query): Query<ProgressQuery>,
) -> ApiResult<impl IntoResponse> {
    // Absent notes are a normal outcome, answered as an explicit null.
    let note = state
        .db
        .progress
        .get_notes(query.user_id, query.lesson_id)
        .await?;
    Ok(Json(json!({ "notes": note })))
}

async fn save_notes(
    State(state): State<AppState>,
    Json(req): Json<SaveNotesRequest>,
) -> ApiResult<impl IntoResponse> {
    let note = state.db.progress.save_notes(req).await?;
    Ok(Json(note))
}
