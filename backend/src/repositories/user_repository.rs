//! Database repository for user credentials.
//!
//! The rest of the service only sees the [`CredentialRepository`] trait: a
//! lookup by email and an insert that reports duplicates as `None`.

use crate::database::models::{NewCredential, StoredCredential, UserId};
use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;

/// Narrow interface to wherever credentials are persisted.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Retrieves the credential registered under `email`, if any.
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredential>>;

    /// Persists a new credential.
    ///
    /// # Returns
    /// The assigned identity, or `None` if the email is already registered.
    async fn insert(&self, credential: NewCredential) -> Result<Option<UserId>>;
}

/// Repository for user database operations backed by SQLite.
#[derive(Clone)]
pub struct SqliteUserRepository {
    /// Shared SQLite connection pool
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Creates a new SqliteUserRepository instance.
    ///
    /// # Arguments
    /// * `pool` - SQLite connection pool (cheap to clone)
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<StoredCredential>> {
        let credential = sqlx::query_as::<_, StoredCredential>(
            r#"
            SELECT id, email, password_hash
            FROM users WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(credential)
    }

    async fn insert(&self, credential: NewCredential) -> Result<Option<UserId>> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES (?, ?)
            "#,
        )
        .bind(&credential.email)
        .bind(&credential.password_hash)
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(Some(UserId(done.last_insert_rowid() as u64))),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;

    fn credential(email: &str) -> NewCredential {
        NewCredential {
            email: email.to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ01".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_then_find() {
        let db = Database::in_memory().await;
        let repo = SqliteUserRepository::new(db.pool().clone());

        let id = repo.insert(credential("a@x.com")).await.unwrap().unwrap();
        let found = repo.find_by_email("a@x.com").await.unwrap().unwrap();

        assert_eq!(found.user_id(), id);
        assert_eq!(found.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_returns_none() {
        let db = Database::in_memory().await;
        let repo = SqliteUserRepository::new(db.pool().clone());

        assert!(repo.insert(credential("a@x.com")).await.unwrap().is_some());
        assert!(repo.insert(credential("a@x.com")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive() {
        let db = Database::in_memory().await;
        let repo = SqliteUserRepository::new(db.pool().clone());

        repo.insert(credential("a@x.com")).await.unwrap();

        assert!(repo.find_by_email("A@X.COM").await.unwrap().is_none());
        assert!(repo.find_by_email("missing@x.com").await.unwrap().is_none());
    }
}
