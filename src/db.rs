use std::time::Duration;

use log::{debug, info, warn};
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseConfig;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

pub type DbResult<T> = Result<T, DatabaseError>;

/// Represents an established database connection pool
///
/// Cloning is cheap and every clone shares the same pool; queries check a
/// connection out for their own duration only.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool from configuration
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        info!("Initializing database connection");
        debug!(
            "Database configuration: max_conn={}, min_conn={}, timeout={}s",
            config.max_connections, config.min_connections, config.acquire_timeout_seconds
        );

        // Create the connection pool
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_seconds))
            .connect(&config.url)
            .await
            .map_err(|e| {
                warn!("Failed to connect to database: {}", e);
                DatabaseError::ConnectionError(e)
            })?;

        info!("Successfully connected to database");

        Ok(Self { pool })
    }

    /// Wrap an existing pool
    #[cfg(test)]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run the embedded migrations; safe to call on every start
    pub async fn migrate(&self) -> DbResult<()> {
        info!("Running database migrations");

        match sqlx::migrate!("./migrations").run(&self.pool).await {
            Ok(()) => {
                info!("Database migrations completed");
                Ok(())
            }
            Err(e) => {
                warn!("Database migration error: {}", e);
                Err(DatabaseError::MigrationError(e))
            }
        }
    }

    /// Gracefully close the database connection pool
    ///
    /// Resolves once every checked-out connection has been returned and closed.
    pub async fn shutdown(&self) {
        info!("Shutting down database connection pool...");

        let open_connections = self.pool.size();
        let idle_connections = self.pool.num_idle();

        self.pool.close().await;

        info!(
            "Database connection pool closed. Stats: {} open, {} idle connections released",
            open_connections, idle_connections
        );
    }

    #[cfg(test)]
    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_migrate_is_idempotent(pool: PgPool) {
        let db = Database::from_pool(pool);

        db.migrate().await.expect("first migration run");
        db.migrate().await.expect("second migration run");

        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_name = 'users')",
        )
        .fetch_one(db.get_pool())
        .await
        .unwrap();
        assert!(exists);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_migrate_keeps_existing_table(pool: PgPool) {
        sqlx::query(
            "CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL, \
             email TEXT NOT NULL UNIQUE, created_at TIMESTAMPTZ NOT NULL DEFAULT NOW())",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO users (name, email) VALUES ('Kept', 'kept@example.com')")
            .execute(&pool)
            .await
            .unwrap();

        let db = Database::from_pool(pool);
        db.migrate().await.expect("migration over existing schema");

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.get_pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_shutdown_closes_pool(pool: PgPool) {
        let db = Database::from_pool(pool);
        db.shutdown().await;
        assert!(db.is_closed());
    }
}
