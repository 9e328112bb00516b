//! # berean-db
//!
//! PostgreSQL database layer for berean.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for videos, lessons, questions, and
//!   per-user progress state
//!
//! ## Example
//!
//! ```rust,ignore
//! use berean_db::Database;
//! use berean_core::VideoRepository;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/berean").await?;
//!     let unprocessed = db.videos.list_unprocessed().await?;
//!     println!("{} videos awaiting processing", unprocessed.len());
//!     Ok(())
//! }
//! ```

pub mod lessons;
pub mod pool;
pub mod progress;
pub mod questions;
pub mod users;
pub mod videos;

// Re-export core types
pub use berean_core::*;

// Re-export repository implementations
pub use lessons::PgLessonRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use progress::PgProgressRepository;
pub use questions::PgQuestionRepository;
pub use users::PgUserRepository;
pub use videos::PgVideoRepository;

/// Combined database context with all repositories.
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Source video repository.
    pub videos: PgVideoRepository,
    /// Lesson repository.
    pub lessons: PgLessonRepository,
    /// Question repository.
    pub questions: PgQuestionRepository,
    /// User progress/stats/completions/notes repository.
    pub progress: PgProgressRepository,
    /// Registered user repository.
    pub users: PgUserRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            videos: PgVideoRepository::new(pool.clone()),
            lessons: PgLessonRepository::new(pool.clone()),
            questions: PgQuestionRepository::new(pool.clone()),
            progress: PgProgressRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}
