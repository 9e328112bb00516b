//! berean-api - HTTP API server for berean

mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Request;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use berean_core::{
    LessonGenerator, LessonNotifier, TranscriptSource, UserRepository, VideoSource,
};
use berean_db::{
    Database, PgLessonRepository, PgQuestionRepository, PgUserRepository, PgVideoRepository,
};
use berean_inference::OpenAiLessonGenerator;
use berean_ingest::{
    DisabledNotifier, EmailNotifier, HttpTranscriptSource, IngestConfig, IngestPipeline,
    PlaceholderTranscripts, YouTubeClient,
};

use handlers::AppState;

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful
/// for log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "berean_api=debug,berean_ingest=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    // Configuration from environment
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/berean".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse()?;
    let production = std::env::var("APP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false);
    let cron_secret = std::env::var("CRON_SECRET").ok();

    // Database
    let db = Database::connect(&database_url).await?;
    db.migrate().await?;
    info!("Database connected and migrated");

    // Ingestion collaborators
    let source: Arc<dyn VideoSource> = Arc::new(YouTubeClient::from_env()?);
    let transcripts: Arc<dyn TranscriptSource> = match HttpTranscriptSource::from_env() {
        Ok(source) => Arc::new(source),
        Err(_) => {
            info!("TRANSCRIPT_SERVICE_URL not set; using placeholder transcripts");
            Arc::new(PlaceholderTranscripts)
        }
    };
    let generator: Arc<dyn LessonGenerator> = Arc::new(OpenAiLessonGenerator::from_env()?);
    let notifier: Arc<dyn LessonNotifier> = match EmailNotifier::from_env() {
        Ok(notifier) => Arc::new(notifier),
        Err(_) => {
            info!("RESEND_API_KEY not set; email notifications disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let users: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(db.pool.clone()));
    let pipeline = Arc::new(IngestPipeline::new(
        Arc::new(PgVideoRepository::new(db.pool.clone())),
        Arc::new(PgLessonRepository::new(db.pool.clone())),
        Arc::new(PgQuestionRepository::new(db.pool.clone())),
        users,
        source,
        transcripts,
        generator,
        notifier,
        IngestConfig::from_env(),
    ));

    let state = AppState {
        db,
        pipeline,
        cron_secret,
        production,
    };

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
