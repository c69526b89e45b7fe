//! SQLite-backed attendance event store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::sync::{AttendanceEvent, EventStore, StoreError};

const EVENT_COLUMNS: &str = "id, user_id, client_id, action, client_timestamp, server_timestamp, \
     latitude, longitude, accuracy, within_geofence, distance_from_geofence, \
     notes, device_id, network_type, created_at";

/// Event store backed by the `attendance_events` table
pub struct SqliteEventStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SqliteEventStore<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_error(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl EventStore for SqliteEventStore<'_> {
    async fn find_by_client_id(
        &self,
        client_id: &str,
    ) -> Result<Option<AttendanceEvent>, StoreError> {
        let event = sqlx::query_as::<_, AttendanceEvent>(&format!(
            "SELECT {EVENT_COLUMNS} FROM attendance_events WHERE client_id = ?"
        ))
        .bind(client_id)
        .fetch_optional(self.pool)
        .await
        .map_err(storage_error)?;

        Ok(event)
    }

    async fn upsert(&self, event: AttendanceEvent) -> Result<AttendanceEvent, StoreError> {
        // Single conditional insert-or-replace keyed by the unique client_id.
        // Concurrent batches racing on one token both run this statement;
        // the WHERE guard makes only a strictly-newer same-owner write land,
        // and id/user_id/created_at survive from the first insert.
        sqlx::query(
            r#"
            INSERT INTO attendance_events (
                id, user_id, client_id, action, client_timestamp, server_timestamp,
                latitude, longitude, accuracy, within_geofence, distance_from_geofence,
                notes, device_id, network_type, created_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(client_id) DO UPDATE SET
                action = excluded.action,
                client_timestamp = excluded.client_timestamp,
                server_timestamp = excluded.server_timestamp,
                latitude = excluded.latitude,
                longitude = excluded.longitude,
                accuracy = excluded.accuracy,
                within_geofence = excluded.within_geofence,
                distance_from_geofence = excluded.distance_from_geofence,
                notes = excluded.notes,
                device_id = excluded.device_id,
                network_type = excluded.network_type
            WHERE excluded.client_timestamp > attendance_events.client_timestamp
              AND attendance_events.user_id = excluded.user_id
            "#,
        )
        .bind(&event.id)
        .bind(&event.user_id)
        .bind(&event.client_id)
        .bind(event.action)
        .bind(event.client_timestamp)
        .bind(event.server_timestamp)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.accuracy)
        .bind(event.within_geofence)
        .bind(event.distance_from_geofence)
        .bind(&event.notes)
        .bind(&event.device_id)
        .bind(&event.network_type)
        .bind(event.created_at)
        .execute(self.pool)
        .await
        .map_err(storage_error)?;

        let stored = self
            .find_by_client_id(&event.client_id)
            .await?
            .ok_or_else(|| StoreError::Unavailable("record missing after upsert".to_string()))?;

        if stored.user_id != event.user_id {
            return Err(StoreError::OwnerMismatch);
        }

        Ok(stored)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<AttendanceEvent>, StoreError> {
        let events = sqlx::query_as::<_, AttendanceEvent>(&format!(
            r#"
            SELECT {EVENT_COLUMNS}
            FROM attendance_events
            WHERE user_id = ?
              AND (? IS NULL OR client_timestamp >= ?)
              AND (? IS NULL OR client_timestamp <= ?)
            ORDER BY client_timestamp DESC
            LIMIT ?
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(storage_error)?;

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_pool;
    use crate::sync::ActionKind;
    use chrono::TimeZone;
    use tempfile::TempDir;

    async fn test_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}/events.db", dir.path().display());
        let pool = create_pool(&url).await.unwrap();
        (dir, pool)
    }

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
            distance_from_geofence: Some(-4.2),
            notes: Some("door A".to_string()),
            device_id: Some("device-1".to_string()),
            network_type: Some("wifi".to_string()),
            created_at: ts,
        }
    }

    #[tokio::test]
    async fn round_trips_all_fields() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteEventStore::new(&pool);

        let stored = store.upsert(event("c-1", "u-1", "s-1", at(0))).await.unwrap();
        assert_eq!(stored.action, ActionKind::ClockIn);
        assert_eq!(stored.distance_from_geofence, Some(-4.2));
        assert_eq!(stored.notes.as_deref(), Some("door A"));
        assert!(stored.within_geofence);
        assert_eq!(stored.client_timestamp, at(0));
    }

    #[tokio::test]
    async fn upsert_guard_applies_only_strictly_newer_writes() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteEventStore::new(&pool);

        store.upsert(event("c-1", "u-1", "s-1", at(10))).await.unwrap();

        let stored = store.upsert(event("c-1", "u-1", "s-2", at(5))).await.unwrap();
        assert_eq!(stored.id, "s-1");
        assert_eq!(stored.client_timestamp, at(10));

        let stored = store.upsert(event("c-1", "u-1", "s-3", at(10))).await.unwrap();
        assert_eq!(stored.id, "s-1");

        let stored = store.upsert(event("c-1", "u-1", "s-4", at(60))).await.unwrap();
        assert_eq!(stored.id, "s-1");
        assert_eq!(stored.client_timestamp, at(60));
    }

    #[tokio::test]
    async fn upsert_rejects_foreign_owner() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteEventStore::new(&pool);

        store.upsert(event("c-1", "u-1", "s-1", at(0))).await.unwrap();
        let err = store
            .upsert(event("c-1", "u-2", "s-2", at(60)))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::OwnerMismatch));

        let stored = store.find_by_client_id("c-1").await.unwrap().unwrap();
        assert_eq!(stored.user_id, "u-1");
        assert_eq!(stored.client_timestamp, at(0));
    }

    #[tokio::test]
    async fn list_window_is_inclusive_and_descending() {
        let (_dir, pool) = test_pool().await;
        let store = SqliteEventStore::new(&pool);

        for (i, secs) in [0u32, 10, 20, 30].iter().enumerate() {
            store
                .upsert(event(&format!("c-{i}"), "u-1", &format!("s-{i}"), at(*secs)))
                .await
                .unwrap();
        }

        let listed = store
            .list_for_user("u-1", Some(at(10)), Some(at(20)), 100)
            .await
            .unwrap();
        let times: Vec<_> = listed.iter().map(|e| e.client_timestamp).collect();
        assert_eq!(times, vec![at(20), at(10)]);

        let capped = store.list_for_user("u-1", None, None, 2).await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].client_timestamp, at(30));
    }
}
