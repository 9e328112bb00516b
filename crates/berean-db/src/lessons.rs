//! Lesson repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use berean_core::{Lesson, LessonRepository, NewLesson, Result};

/// PostgreSQL implementation of LessonRepository.
pub struct PgLessonRepository {
    pool: Pool<Postgres>,
}

impl PgLessonRepository {
    /// Create a new PgLessonRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LessonRepository for PgLessonRepository {
    async fn insert(&self, lesson: NewLesson) -> Result<Lesson> {
        let row = sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons
                (video_id, title, summary, key_themes, scripture_references,
                 is_published, order_index)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(lesson.video_id)
        .bind(&lesson.title)
        .bind(&lesson.summary)
        .bind(&lesson.key_themes)
        .bind(&lesson.scripture_references)
        .bind(lesson.is_published)
        .bind(lesson.order_index)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Lesson>> {
        let row = sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_published(&self) -> Result<Vec<Lesson>> {
        let rows = sqlx::query_as::<_, Lesson>(
            "SELECT * FROM lessons WHERE is_published ORDER BY order_index, created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
