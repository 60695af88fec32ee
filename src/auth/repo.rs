use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, UserRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already exists")]
    Duplicate,
    #[error("store call timed out")]
    Timeout,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence contract for user records.
///
/// Implementations must enforce uniqueness of `username` and `email` at insert
/// time, so a lost check-then-insert race still fails with `Duplicate`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;
    /// Connectivity probe.
    async fn ping(&self) -> Result<(), StoreError>;
    fn backend(&self) -> &'static str;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let created = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return StoreError::Duplicate;
                }
            }
            StoreError::Database(e)
        })?;
        Ok(created)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

/// Process-local store keyed by username.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.username) || users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(record.username.clone(), record.clone());
        Ok(record)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
