//! Geofence reference data
//!
//! This server performs no geofence math: definitions are served to devices,
//! which compute `withinGeofence` locally before syncing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::config::GeofenceConfig;
use crate::error::Result;

/// A named circular geofence
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Geofence {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Geofence repository
pub struct GeofenceRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> GeofenceRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List all geofence definitions
    pub async fn list(&self) -> Result<Vec<Geofence>> {
        let geofences = sqlx::query_as::<_, Geofence>(
            r#"
            SELECT id, name, latitude, longitude, radius_meters, created_at, updated_at
            FROM geofences
            ORDER BY name ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(geofences)
    }

    /// Seed the configured office geofence when the table is empty
    pub async fn seed_default(&self, config: &GeofenceConfig) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM geofences")
            .fetch_one(self.pool)
            .await?;

        if count > 0 {
            return Ok(());
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO geofences (id, name, latitude, longitude, radius_meters, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&config.office_name)
        .bind(config.office_latitude)
        .bind(config.office_longitude)
        .bind(config.office_radius_meters)
        .bind(now)
        .bind(now)
        .execute(self.pool)
        .await?;

        tracing::info!(name = %config.office_name, "Seeded default geofence");

        Ok(())
    }
}
