//! Video repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use uuid::Uuid;

use berean_core::{NewVideo, Result, Video, VideoRepository};

/// PostgreSQL implementation of VideoRepository.
pub struct PgVideoRepository {
    pool: Pool<Postgres>,
}

impl PgVideoRepository {
    /// Create a new PgVideoRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    async fn claim(&self, video: NewVideo) -> Result<Option<Video>> {
        // ON CONFLICT DO NOTHING makes the insert itself the dedup check:
        // of two racing runs, exactly one gets a row back.
        let row = sqlx::query_as::<_, Video>(
            r#"
            INSERT INTO videos
                (youtube_id, title, description, published_at, thumbnail_url,
                 duration_seconds, processed)
            VALUES ($1, $2, $3, $4, $5, $6, FALSE)
            ON CONFLICT (youtube_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(&video.youtube_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(video.published_at)
        .bind(&video.thumbnail_url)
        .bind(video.duration_seconds)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_youtube_id(&self, youtube_id: &str) -> Result<Option<Video>> {
        let row = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE youtube_id = $1")
            .bind(youtube_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT MAX(published_at) AS latest FROM videos")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("latest")?)
    }

    async fn attach_transcript(&self, id: Uuid, transcript: &str) -> Result<()> {
        sqlx::query("UPDATE videos SET transcript = $2 WHERE id = $1")
            .bind(id)
            .bind(transcript)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn mark_processed(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE videos SET processed = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos ORDER BY published_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_unprocessed(&self) -> Result<Vec<Video>> {
        let rows = sqlx::query_as::<_, Video>(
            "SELECT * FROM videos WHERE NOT processed ORDER BY published_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
