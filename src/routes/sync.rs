//! Attendance sync API routes
//!
//! The write path accepts a batch of device-recorded events and reconciles
//! them with stored state; the read path serves an owner's events within a
//! time window. Ownership always comes from the session, so the routes are
//! thin wrappers around the sync engine.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::db::{SqliteEventStore, UserRepository};
use crate::error::Result;
use crate::state::AppState;
use crate::sync::{
    AttendanceEvent, EventStore, SyncCoordinator, SyncReport, SyncedRecord, MAX_QUERY_RESULTS,
};

/// Create the sync router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sync-logs", post(sync_logs))
        .route("/attendance-logs", get(list_logs))
}

/// Batch sync request
///
/// `logs` elements stay raw JSON here: each record is decoded individually
/// by the coordinator so one malformed entry fails alone. A body where
/// `logs` is missing or not an array is rejected wholesale before any
/// record is processed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    pub logs: Vec<Value>,
    /// Device clock at upload time, informational only
    #[serde(default)]
    pub client_timestamp: Option<DateTime<Utc>>,
}

/// Batch sync response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub success: bool,
    pub synced_records: Vec<SyncedRecord>,
    pub failed_record_ids: Vec<String>,
    pub server_timestamp: DateTime<Utc>,
    pub message: String,
}

impl SyncResponse {
    fn from_report(report: SyncReport, total: usize) -> Self {
        let message = format!("Synced {}/{} records", report.synced_records.len(), total);
        Self {
            success: true,
            synced_records: report.synced_records,
            failed_record_ids: report.failed_record_ids,
            server_timestamp: report.server_timestamp,
            message,
        }
    }
}

/// POST /sync-logs
///
/// Batch sync attendance logs with last-write-wins conflict resolution.
async fn sync_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<SyncRequest>,
) -> Result<Json<SyncResponse>> {
    let total = request.logs.len();

    let coordinator = SyncCoordinator::new(SqliteEventStore::new(state.db()));
    let report = coordinator.process_batch(&auth.user_id, &request.logs).await;

    if !report.synced_records.is_empty() {
        UserRepository::new(state.db())
            .touch_last_sync(&auth.user_id)
            .await?;
    }

    Ok(Json(SyncResponse::from_report(report, total)))
}

/// Query parameters for the attendance log listing
#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    /// Inclusive lower bound on the device timestamp
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the device timestamp
    pub to: Option<DateTime<Utc>>,
}

/// Attendance log listing response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogsResponse {
    pub success: bool,
    pub logs: Vec<AttendanceEvent>,
    pub count: usize,
}

/// GET /attendance-logs
///
/// Attendance logs for the authenticated user, newest first, capped at
/// [`MAX_QUERY_RESULTS`] entries.
async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>> {
    let store = SqliteEventStore::new(state.db());
    let logs = store
        .list_for_user(&auth.user_id, query.from, query.to, MAX_QUERY_RESULTS)
        .await?;

    Ok(Json(LogsResponse {
        success: true,
        count: logs.len(),
        logs,
    }))
}
