//! Leave request database operations
//!
//! Unconditional CRUD, no merge semantics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{AppError, Result};

/// A leave request
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: String,
    pub user_id: String,
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Create leave request payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    pub leave_type: String,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    #[serde(default)]
    pub reason: Option<String>,
}

const LEAVE_COLUMNS: &str =
    "id, user_id, leave_type, from_date, to_date, reason, status, created_at";

/// Leave request repository
pub struct LeaveRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LeaveRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a specific leave request
    pub async fn get(&self, id: &str) -> Result<Option<LeaveRequest>> {
        let request = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(request)
    }

    /// List leave requests for a user, newest first
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<LeaveRequest>> {
        let requests = sqlx::query_as::<_, LeaveRequest>(&format!(
            "SELECT {LEAVE_COLUMNS} FROM leave_requests WHERE user_id = ? ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(requests)
    }

    /// Create a new leave request in `pending` status
    pub async fn create(&self, user_id: &str, data: &CreateLeaveRequest) -> Result<LeaveRequest> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            r#"
            INSERT INTO leave_requests (id, user_id, leave_type, from_date, to_date, reason, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(&id)
        .bind(user_id)
        .bind(&data.leave_type)
        .bind(data.from_date)
        .bind(data.to_date)
        .bind(&data.reason)
        .bind(Utc::now())
        .execute(self.pool)
        .await?;

        self.get(&id)
            .await?
            .ok_or_else(|| AppError::Internal("Failed to fetch created leave request".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_and_list() {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/leave.db", dir.path().display());
        let pool = create_pool(&url).await.unwrap();
        let repo = LeaveRepository::new(&pool);

        let data = CreateLeaveRequest {
            leave_type: "vacation".to_string(),
            from_date: NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            to_date: NaiveDate::from_ymd_opt(2026, 4, 5).unwrap(),
            reason: Some("family trip".to_string()),
        };

        let created = repo.create("u-1", &data).await.unwrap();
        assert_eq!(created.status, "pending");

        let listed = repo.list_for_user("u-1").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, created.id);

        assert!(repo.list_for_user("u-2").await.unwrap().is_empty());
    }
}
