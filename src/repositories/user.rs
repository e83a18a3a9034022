// src/repositories/user.rs - Data access
use async_trait::async_trait;
use log::{debug, error};
use sqlx::PgPool;

use crate::db::Database;
use crate::errors::RepositoryError;
use crate::models::{NewUser, User};

type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    /// Inserts a user and returns the stored row
    ///
    /// ### Errors
    /// * `RepositoryError::Conflict` - If the email is already taken
    /// * `RepositoryError::Database` - If a database error occurs
    async fn insert(&self, user: &NewUser) -> Result<User>;

    /// Finds a user by id, `None` if no row matches
    async fn find_by_id(&self, id: i32) -> Result<Option<User>>;

    /// Finds a user by email, `None` if no row matches
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns every user in insertion order
    async fn find_all(&self) -> Result<Vec<User>>;

    /// Deletes a user by id
    ///
    /// ### Returns
    /// * `Result<bool>` - `true` if a row was removed
    async fn delete_by_id(&self, id: i32) -> Result<bool>;
}

// Implementation using actual database.
// `created_at` is cast on every read: tables created before the migrations
// existed hold a `TIMESTAMP` column, which does not decode as `DateTime<Utc>`.
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.get_pool().clone(),
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at::timestamptz AS created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to insert user: {}", e);
            RepositoryError::from(e)
        })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at::timestamptz AS created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at::timestamptz AS created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, created_at::timestamptz AS created_at
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::from)
    }

    async fn delete_by_id(&self, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(RepositoryError::from)?;

        debug!("Deleted {} user row(s) with id {}", result.rows_affected(), id);

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn repository(pool: PgPool) -> UserRepository {
        UserRepository::new(&Database::from_pool(pool))
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_insert_assigns_id_and_timestamp(pool: PgPool) {
        let repo = repository(pool);
        let before = Utc::now();

        let user = repo
            .insert(&NewUser::new("John Doe", "john@example.com"))
            .await
            .unwrap();

        assert!(user.id > 0);
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john@example.com");
        // Database and test clocks may differ by a little.
        assert!(user.created_at >= before - chrono::Duration::seconds(1));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_duplicate_email_is_conflict_and_keeps_first(pool: PgPool) {
        let repo = repository(pool);
        let first = repo
            .insert(&NewUser::new("Jane Doe", "jane@example.com"))
            .await
            .unwrap();

        let second = repo
            .insert(&NewUser::new("Impostor", "jane@example.com"))
            .await;

        assert!(matches!(second, Err(RepositoryError::Conflict(_))));
        let stored = repo.find_by_id(first.id).await.unwrap();
        assert_eq!(stored, Some(first));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_find_by_unknown_id_is_none(pool: PgPool) {
        let repo = repository(pool);
        assert_eq!(repo.find_by_id(99999).await.unwrap(), None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_find_by_email(pool: PgPool) {
        let repo = repository(pool);
        let created = repo
            .insert(&NewUser::new("Bob Smith", "bob@example.com"))
            .await
            .unwrap();

        let found = repo.find_by_email("bob@example.com").await.unwrap();

        assert_eq!(found, Some(created));
        assert_eq!(repo.find_by_email("nobody@example.com").await.unwrap(), None);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_find_all_in_insertion_order(pool: PgPool) {
        let repo = repository(pool);
        for i in 1..=3 {
            repo.insert(&NewUser::new(format!("User {}", i), format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        let names: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.name)
            .collect();

        assert_eq!(names, vec!["User 1", "User 2", "User 3"]);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_delete_reports_removal_once(pool: PgPool) {
        let repo = repository(pool);
        let user = repo
            .insert(&NewUser::new("Delete Me", "delete@example.com"))
            .await
            .unwrap();

        assert!(repo.delete_by_id(user.id).await.unwrap());
        assert!(!repo.delete_by_id(user.id).await.unwrap());
        assert_eq!(repo.find_by_id(user.id).await.unwrap(), None);
    }

    #[sqlx::test(migrations = false)]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn test_reads_table_with_plain_timestamp_column(pool: PgPool) {
        sqlx::query(
            "CREATE TABLE users (id SERIAL PRIMARY KEY, name TEXT NOT NULL, \
             email TEXT NOT NULL UNIQUE, created_at TIMESTAMP DEFAULT NOW())",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO users (name, email) VALUES ('Old Row', 'old@example.com')")
            .execute(&pool)
            .await
            .unwrap();

        let db = Database::from_pool(pool);
        db.migrate().await.expect("migration over legacy schema");
        let repo = UserRepository::new(&db);

        let created = repo
            .insert(&NewUser::new("New Row", "new@example.com"))
            .await
            .unwrap();
        let users = repo.find_all().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name, "Old Row");
        assert_eq!(users[1], created);
    }
}
