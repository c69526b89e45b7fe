//! Bearer session management
//!
//! Sessions are opaque random tokens; only the SHA-256 digest ever touches
//! the database, so a leaked database cannot be replayed as credentials.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// A freshly issued session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    /// The plaintext bearer token, returned to the client exactly once
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and resolves bearer session tokens
#[derive(Clone)]
pub struct SessionManager {
    pool: SqlitePool,
    ttl_hours: i64,
}

impl SessionManager {
    pub fn new(pool: SqlitePool, ttl_hours: i64) -> Self {
        Self { pool, ttl_hours }
    }

    /// Issue a new session token for a user
    pub async fn issue(&self, user_id: &str) -> Result<IssuedSession> {
        let token = Uuid::new_v4().to_string();
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.ttl_hours);

        sqlx::query(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(hash_token(&token))
        .bind(user_id)
        .bind(now)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(user_id = %user_id, expires_at = %expires_at, "Issued session");

        Ok(IssuedSession { token, expires_at })
    }

    /// Resolve a presented token to its user id, if valid and unexpired
    pub async fn resolve(&self, token: &str) -> Result<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT user_id FROM sessions WHERE token_hash = ? AND expires_at > ?",
        )
        .bind(hash_token(token))
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(user_id,)| user_id))
    }

    /// Delete expired sessions, returning how many were removed
    pub async fn purge_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
