//! User database operations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::auth::VerifiedIdentity;
use crate::error::{AppError, Result};

/// Local user record, resolved from the external identity provider
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub google_id: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sync_at: Option<DateTime<Utc>>,
}

const USER_COLUMNS: &str =
    "id, email, display_name, photo_url, google_id, is_active, created_at, last_sync_at";

/// User repository
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by id
    pub async fn get(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by external subject identifier
    pub async fn get_by_google_id(&self, google_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_id = ?"
        ))
        .bind(google_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Resolve a verified identity to a local user, creating it on first login
    ///
    /// Profile fields are refreshed from the provider on every login.
    pub async fn find_or_create(&self, identity: &VerifiedIdentity) -> Result<User> {
        if let Some(existing) = self.get_by_google_id(&identity.subject).await? {
            sqlx::query("UPDATE users SET display_name = ?, photo_url = ? WHERE id = ?")
                .bind(&identity.display_name)
                .bind(&identity.photo_url)
                .bind(&existing.id)
                .execute(self.pool)
                .await?;

            return self.get(&existing.id).await?.ok_or_else(|| {
                AppError::Internal("Failed to fetch updated user".to_string())
            });
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, display_name, photo_url, google_id, is_active, created_at)
            VALUES (?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(&id)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(&identity.photo_url)
        .bind(&identity.subject)
        .bind(now)
        .execute(self.pool)
        .await?;

        tracing::info!(user_id = %id, email = %identity.email, "Created user");

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created user".to_string()))
    }

    /// Record the time of the user's latest successful sync batch
    pub async fn touch_last_sync(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE users SET last_sync_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use tempfile::TempDir;

    fn identity() -> VerifiedIdentity {
        VerifiedIdentity {
            subject: "google-sub-1".to_string(),
            email: "worker@example.com".to_string(),
            display_name: "Worker One".to_string(),
            photo_url: None,
        }
    }

    #[tokio::test]
    async fn find_or_create_is_stable_across_logins() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/users.db", dir.path().display());
        let pool = create_pool(&url).await.unwrap();
        let repo = UserRepository::new(&pool);

        let created = repo.find_or_create(&identity()).await.unwrap();
        assert_eq!(created.email, "worker@example.com");
        assert!(created.is_active);

        let mut renamed = identity();
        renamed.display_name = "Worker 1".to_string();
        let again = repo.find_or_create(&renamed).await.unwrap();

        assert_eq!(again.id, created.id);
        assert_eq!(again.display_name, "Worker 1");
    }

    #[tokio::test]
    async fn touch_last_sync_sets_timestamp() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/users.db", dir.path().display());
        let pool = create_pool(&url).await.unwrap();
        let repo = UserRepository::new(&pool);

        let user = repo.find_or_create(&identity()).await.unwrap();
        assert!(user.last_sync_at.is_none());

        repo.touch_last_sync(&user.id).await.unwrap();
        let user = repo.get(&user.id).await.unwrap().unwrap();
        assert!(user.last_sync_at.is_some());
    }
}
