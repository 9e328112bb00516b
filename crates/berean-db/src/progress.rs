//! User progress, stats, completion, and notes repository implementation.
//!
//! Quiz-side write targets: attempt upserts keyed by (user, question),
//! best-score lesson completions, streak/XP arithmetic, and free-text
//! notes keyed by (user, lesson).

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use berean_core::{
    CompleteLessonRequest, LessonCompletion, LessonNote, ProgressRepository,
    RecordAttemptRequest, Result, SaveNotesRequest, UserProgress, UserStats,
};

/// PostgreSQL implementation of ProgressRepository.
pub struct PgProgressRepository {
    pool: Pool<Postgres>,
}

impl PgProgressRepository {
    /// Create a new PgProgressRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Next streak value given the last activity date.
///
/// Same-day activity keeps the streak, the next day extends it, and any
/// longer gap resets to 1.
pub fn next_streak(current: i32, last_activity: Option<NaiveDate>, today: NaiveDate) -> i32 {
    match last_activity {
        None => 1,
        Some(last) => match (today - last).num_days() {
            0 => current.max(1),
            1 => current + 1,
            _ => 1,
        },
    }
}

#[async_trait]
impl ProgressRepository for PgProgressRepository {
    async fn record_attempt(&self, req: RecordAttemptRequest) -> Result<UserProgress> {
        let progress = sqlx::query_as::<_, UserProgress>(
            r#"
            INSERT INTO user_progress
                (user_id, lesson_id, question_id, is_correct, attempts, completed_at)
            VALUES ($1, $2, $3, $4, 1, CASE WHEN $4 THEN now() ELSE NULL END)
            ON CONFLICT (user_id, question_id) DO UPDATE SET
                is_correct = EXCLUDED.is_correct,
                attempts = user_progress.attempts + 1,
                completed_at = CASE
                    WHEN EXCLUDED.is_correct THEN now()
                    ELSE user_progress.completed_at
                END
            RETURNING *
            "#,
        )
        .bind(req.user_id)
        .bind(req.lesson_id)
        .bind(req.question_id)
        .bind(req.is_correct)
        .fetch_one(&self.pool)
        .await?;

        if req.is_correct && req.xp_earned > 0 {
            let today = Utc::now().date_naive();
            sqlx::query(
                r#"
                INSERT INTO user_stats
                    (user_id, total_xp, questions_answered, current_streak,
                     longest_streak, last_activity_date)
                VALUES ($1, $2, 1, 1, 1, $3)
                ON CONFLICT (user_id) DO UPDATE SET
                    total_xp = user_stats.total_xp + EXCLUDED.total_xp,
                    questions_answered = user_stats.questions_answered + 1,
                    last_activity_date = EXCLUDED.last_activity_date
                "#,
            )
            .bind(req.user_id)
            .bind(req.xp_earned)
            .bind(today)
            .execute(&self.pool)
            .await?;
        }

        Ok(progress)
    }

    async fn complete_lesson(&self, req: CompleteLessonRequest) -> Result<LessonCompletion> {
        let mut tx = self.pool.begin().await?;

        let existing = sqlx::query_as::<_, LessonCompletion>(
            "SELECT * FROM lesson_completions WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(req.user_id)
        .bind(req.lesson_id)
        .fetch_optional(&mut *tx)
        .await?;

        let completion = match existing {
            Some(existing) if req.score > existing.score => {
                sqlx::query_as::<_, LessonCompletion>(
                    r#"
                    UPDATE lesson_completions
                    SET score = $2, total_xp_earned = $3, completed_at = now()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(existing.id)
                .bind(req.score)
                .bind(req.total_xp_earned)
                .fetch_one(&mut *tx)
                .await?
            }
            Some(existing) => existing,
            None => {
                let inserted = sqlx::query_as::<_, LessonCompletion>(
                    r#"
                    INSERT INTO lesson_completions
                        (user_id, lesson_id, score, total_xp_earned)
                    VALUES ($1, $2, $3, $4)
                    RETURNING *
                    "#,
                )
                .bind(req.user_id)
                .bind(req.lesson_id)
                .bind(req.score)
                .bind(req.total_xp_earned)
                .fetch_one(&mut *tx)
                .await?;

                // First completion of this lesson counts toward the total.
                sqlx::query(
                    r#"
                    INSERT INTO user_stats (user_id, lessons_completed)
                    VALUES ($1, 1)
                    ON CONFLICT (user_id) DO UPDATE SET
                        lessons_completed = user_stats.lessons_completed + 1
                    "#,
                )
                .bind(req.user_id)
                .execute(&mut *tx)
                .await?;

                inserted
            }
        };

        // Streak update on every completion attempt.
        let stats = sqlx::query_as::<_, UserStats>(
            "SELECT * FROM user_stats WHERE user_id = $1",
        )
        .bind(req.user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(stats) = stats {
            let today = Utc::now().date_naive();
            let streak = next_streak(stats.current_streak, stats.last_activity_date, today);
            sqlx::query(
                r#"
                UPDATE user_stats
                SET current_streak = $2,
                    longest_streak = GREATEST(longest_streak, $2),
                    last_activity_date = $3
                WHERE user_id = $1
                "#,
            )
            .bind(req.user_id)
            .bind(streak)
            .bind(today)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(completion)
    }

    async fn get_progress(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Vec<UserProgress>> {
        let rows = sqlx::query_as::<_, UserProgress>(
            "SELECT * FROM user_progress WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_or_create_stats(&self, user_id: Uuid) -> Result<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            INSERT INTO user_stats (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn save_notes(&self, req: SaveNotesRequest) -> Result<LessonNote> {
        let note = sqlx::query_as::<_, LessonNote>(
            r#"
            INSERT INTO lesson_notes (user_id, lesson_id, notes, updated_at)
            VALUES ($1, $2, $3, now())
            ON CONFLICT (user_id, lesson_id) DO UPDATE SET
                notes = EXCLUDED.notes,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(req.user_id)
        .bind(req.lesson_id)
        .bind(&req.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    async fn get_notes(&self, user_id: Uuid, lesson_id: Uuid) -> Result<Option<LessonNote>> {
        let note = sqlx::query_as::<_, LessonNote>(
            "SELECT * FROM lesson_notes WHERE user_id = $1 AND lesson_id = $2",
        )
        .bind(user_id)
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }
}
