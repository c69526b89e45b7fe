//! Geofence API routes
//!
//! Serves geofence reference data to devices; the classification of a
//! position against these definitions happens on the device.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::{Geofence, GeofenceRepository};
use crate::error::Result;
use crate::state::AppState;

/// Create the geofences router
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_geofences))
}

/// Geofence listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofencesResponse {
    pub success: bool,
    pub geofences: Vec<Geofence>,
}

/// GET /
async fn list_geofences(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<GeofencesResponse>> {
    let geofences = GeofenceRepository::new(state.db()).list().await?;

    Ok(Json(GeofencesResponse {
        success: true,
        geofences,
    }))
}
