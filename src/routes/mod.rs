//! Route modules for the Punchcard server

pub mod auth;
pub mod geofences;
pub mod leave;
pub mod sync;
pub mod users;

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check(State(_state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Assemble the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth::router())
        .nest("/api/users", users::router())
        .nest("/api/geofences", geofences::router())
        .nest("/api/leave-requests", leave::router())
        .nest("/api", sync::router())
        .with_state(state)
}
