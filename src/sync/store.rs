//! Event store abstraction
//!
//! The idempotency index: maps one client id to at most one stored event.
//! Implementations own the atomicity of the lookup-then-install sequence;
//! callers never see a check-then-act window. An in-memory implementation
//! lives here for engine tests, the SQLite one in `crate::db::events`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::types::AttendanceEvent;

/// Storage failure surfaced to the sync engine
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The stored record for this token belongs to a different user
    #[error("Stored record belongs to a different user")]
    OwnerMismatch,

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for super::types::SyncError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::OwnerMismatch => Self::OwnerMismatch,
            StoreError::Unavailable(msg) => Self::Storage(msg),
        }
    }
}

/// Keyed store for attendance events, unique per client id
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up the stored event for a client id, no side effects
    async fn find_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<AttendanceEvent>, StoreError>;

    /// Atomically install or replace the event for its client id
    ///
    /// A replacement only lands when the incoming `client_timestamp` is
    /// strictly newer than the stored one and the owner matches; the
    /// stored `id`, `user_id` and `created_at` always survive. Returns the
    /// post-state row, so concurrent writers all observe the record that
    /// actually won. Fails with [`StoreError::OwnerMismatch`] when the
    /// stored record belongs to another user.
    async fn upsert(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError>;

    /// List events for one user, newest first by `client_timestamp`
    ///
    /// Bounds are inclusive on both ends when present.
    async fn list_for_user(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AttendanceEvent>, StoreError>;
}

/// In-memory event store
///
/// Same contract as the SQLite store, backed by a `RwLock`ed map. Used by
/// the engine unit tests so each case gets an isolated store.
#[derive(Default)]
pub struct MemoryEventStore {
    events: RwLock<HashMap<String, AttendanceEvent>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored events
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn find_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        Ok(self.events.read().await.get(client_id).cloned())
    }

    async fn upsert(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        let mut events = self.events.write().await;

        if let Some(stored) = events.get_mut(&event.client_id) {
            if stored.user_id != event.user_id {
                return Err(StoreError::OwnerMismatch);
            }

            if event.client_timestamp > stored.client_timestamp {
                let mut replacement = event;
                replacement.id = stored.id.clone();
                replacement.created_at = stored.created_at;
                *stored = replacement;
            }

            return Ok(stored.clone());
        }

        events.insert(event.client_id.clone(), event.clone());
        Ok(event)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let events = self.events.read().await;

        let mut matching: Vec<AttendanceEvent> = events
            .values()
            .filter(|e| e.user_id == user_id)
            .filter(|e| from.map_or(true, |f| e.client_timestamp >= f))
            .filter(|e| to.map_or(true, |t| e.client_timestamp <= t))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.client_timestamp.cmp(&a.client_timestamp));
        matching.truncate(limit.max(0) as usize);

        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::types::ActionKind;
    use chrono::TimeZone;

    fn at(secs: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap() + chrono::Duration::seconds(secs as i64)
    }

    fn event(client_id: &str, user_id: &str, id: &str, ts: DateTime<Utc>) -> AttendanceEvent {
        AttendanceEvent {
            id: id.to_string(),
            user_id: user_id.to_string(),
            client_id: client_id.to_string(),
            action: ActionKind::ClockIn,
            client_timestamp: ts,
            server_timestamp: ts,
            latitude: 37.7749,
            longitude: -122.4194,
            accuracy: 10.0,
            within_geofence: true,
            distance_from_geofence: None,
            notes: None,
            device_id: None,
            network_type: None,
            created_at: ts,
        }
    }

    #[tokio::test]
    async fn upsert_inserts_when_absent() {
        let store = MemoryEventStore::new();
        let stored = store.upsert(event("c-1", "u-1", "s-1", at(0))).await.unwrap();

        assert_eq!(stored.id, "s-1");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_replaces_only_when_strictly_newer() {
        let store = MemoryEventStore::new();
        store.upsert(event("c-1", "u-1", "s-1", at(10))).await.unwrap();

        // Older write is a no-op; the stored row comes back
        let stored = store.upsert(event("c-1", "u-1", "s-2", at(5))).await.unwrap();
        assert_eq!(stored.id, "s-1");
        assert_eq!(stored.client_timestamp, at(10));

        // Equal timestamp is also a no-op
        let stored = store.upsert(event("c-1", "u-1", "s-3", at(10))).await.unwrap();
        assert_eq!(stored.id, "s-1");

        // Strictly newer replaces in place, keeping the original id
        let stored = store.upsert(event("c-1", "u-1", "s-4", at(20))).await.unwrap();
        assert_eq!(stored.id, "s-1");
        assert_eq!(stored.client_timestamp, at(20));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn upsert_rejects_foreign_owner() {
        let store = MemoryEventStore::new();
        store.upsert(event("c-1", "u-1", "s-1", at(0))).await.unwrap();

        let err = store
            .upsert(event("c-1", "u-2", "s-2", at(60)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OwnerMismatch));

        // Stored record is untouched
        let stored = store.find_by_client_id("c-1").await.unwrap().unwrap();
        assert_eq!(stored.user_id, "u-1");
        assert_eq!(stored.client_timestamp, at(0));
    }

    #[tokio::test]
    async fn list_filters_window_and_orders_descending() {
        let store = MemoryEventStore::new();
        for (i, secs) in [0u32, 10, 20, 30].iter().enumerate() {
            store
                .upsert(event(&format!("c-{i}"), "u-1", &format!("s-{i}"), at(*secs)))
                .await
                .unwrap();
        }
        store.upsert(event("c-x", "u-2", "s-x", at(15))).await.unwrap();

        let listed = store
            .list_for_user("u-1", Some(at(10)), Some(at(20)), 100)
            .await
            .unwrap();

        let times: Vec<_> = listed.iter().map(|e| e.client_timestamp).collect();
        assert_eq!(times, vec![at(20), at(10)]);
    }

    #[tokio::test]
    async fn list_caps_result_count() {
        let store = MemoryEventStore::new();
        for i in 0..5u32 {
            store
                .upsert(event(&format!("c-{i}"), "u-1", &format!("s-{i}"), at(i)))
                .await
                .unwrap();
        }

        let listed = store.list_for_user("u-1", None, None, 3).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0].client_timestamp, at(4));
    }
}
