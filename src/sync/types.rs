//! Types for the attendance sync protocol

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of records returned by the attendance log query
pub const MAX_QUERY_RESULTS: i64 = 1000;

// ============================================================================
// Domain Types
// ============================================================================

/// Kind of attendance action recorded on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub enum ActionKind {
    ClockIn,
    ClockOut,
    Break,
}

/// A stored attendance event
///
/// One row per logical event. `client_id` is the client-generated
/// idempotency token; the store enforces its uniqueness. `user_id` is
/// assigned from the authenticated session and immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEvent {
    /// Server-assigned id, stable across overwrites
    pub id: String,
    pub user_id: String,
    pub client_id: String,
    pub action: ActionKind,
    /// Device time of the action, authoritative for merge ordering
    pub client_timestamp: DateTime<Utc>,
    /// Server acceptance time, re-assigned on every accepted write
    pub server_timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub within_geofence: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_from_geofence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Wire Types
// ============================================================================

/// One attendance record as submitted by a device
///
/// `userId` is deliberately absent: ownership always comes from the
/// authenticated session, never from the payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInput {
    pub client_id: String,
    pub action: ActionKind,
    pub client_timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub within_geofence: bool,
    #[serde(default)]
    pub distance_from_geofence: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub network_type: Option<String>,
}

impl EventInput {
    /// Decode and validate one raw batch element
    ///
    /// Each element is decoded individually so a malformed record fails on
    /// its own instead of rejecting the whole batch.
    pub fn parse(raw: &Value) -> Result<Self, SyncError> {
        let input: EventInput = serde_json::from_value(raw.clone())
            .map_err(|e| SyncError::ShapeValidation(e.to_string()))?;

        if input.client_id.is_empty() {
            return Err(SyncError::ShapeValidation(
                "clientId must be non-empty".to_string(),
            ));
        }

        Ok(input)
    }

    /// Build the stored event for this input
    ///
    /// The caller assigns ownership and a candidate server id; when the
    /// token already exists, the store preserves the original id and
    /// creation time.
    pub fn into_event(self, user_id: &str, id: String, now: DateTime<Utc>) -> AttendanceEvent {
        AttendanceEvent {
            id,
            user_id: user_id.to_string(),
            client_id: self.client_id,
            action: self.action,
            client_timestamp: self.client_timestamp,
            server_timestamp: now,
            latitude: self.latitude,
            longitude: self.longitude,
            accuracy: self.accuracy,
            within_geofence: self.within_geofence,
            distance_from_geofence: self.distance_from_geofence,
            notes: self.notes,
            device_id: self.device_id,
            network_type: self.network_type,
            created_at: now,
        }
    }
}

/// Extract the `clientId` of a raw batch element for failure reporting
///
/// Falls back to an empty string so every failed record still produces an
/// entry in `failedRecordIds`.
pub fn client_id_of(raw: &Value) -> String {
    raw.get("clientId")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Per-record success entry in a sync response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncedRecord {
    pub client_id: String,
    pub server_id: String,
    pub server_timestamp: DateTime<Utc>,
}

/// Outcome of one batch sync
///
/// Successes and failures are collected independently; one record's failure
/// never short-circuits its siblings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced_records: Vec<SyncedRecord>,
    pub failed_record_ids: Vec<String>,
    pub server_timestamp: DateTime<Utc>,
}

// ============================================================================
// Errors
// ============================================================================

/// Per-record sync failure
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Invalid record shape: {0}")]
    ShapeValidation(String),

    #[error("Idempotency token already belongs to another user")]
    OwnerMismatch,

    #[error("Storage unavailable: {0}")]
    Storage(String),
}
