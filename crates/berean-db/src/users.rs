//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};

use berean_core::{Result, UserRepository};

/// PostgreSQL implementation of UserRepository.
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn list_emails(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT email FROM users ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("email"))
            .collect())
    }
}
