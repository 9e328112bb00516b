//! Question repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use berean_core::{NewQuestion, Question, QuestionRepository, Result};

/// PostgreSQL implementation of QuestionRepository.
pub struct PgQuestionRepository {
    pool: Pool<Postgres>,
}

impl PgQuestionRepository {
    /// Create a new PgQuestionRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuestionRepository for PgQuestionRepository {
    async fn insert_batch(&self, questions: Vec<NewQuestion>) -> Result<Vec<Question>> {
        if questions.is_empty() {
            return Ok(vec![]);
        }

        // One transaction per lesson's question set: parents are already
        // inserted, so an interruption here leaves no orphaned children.
        let mut tx = self.pool.begin().await?;
        let mut inserted = Vec::with_capacity(questions.len());

        for q in &questions {
            let row = sqlx::query_as::<_, Question>(
                r#"
                INSERT INTO questions
                    (lesson_id, question_type, question_text, options,
                     correct_answer, explanation, xp_value, order_index)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
                "#,
            )
            .bind(q.lesson_id)
            .bind(q.question_type)
            .bind(&q.question_text)
            .bind(&q.options)
            .bind(&q.correct_answer)
            .bind(&q.explanation)
            .bind(q.xp_value)
            .bind(q.order_index)
            .fetch_one(&mut *tx)
            .await?;
            inserted.push(row);
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn list_by_lesson(&self, lesson_id: Uuid) -> Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            "SELECT * FROM questions WHERE lesson_id = $1 ORDER BY order_index",
        )
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
