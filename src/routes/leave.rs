//! Leave request API routes

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::{CreateLeaveRequest, LeaveRepository, LeaveRequest};
use crate::error::Result;
use crate::state::AppState;

/// Create the leave requests router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_request))
        .route("/", get(list_requests))
}

/// Single leave request response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveResponse {
    pub success: bool,
    pub message: String,
    pub request: LeaveRequest,
}

/// Leave request listing response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveListResponse {
    pub success: bool,
    pub requests: Vec<LeaveRequest>,
}

/// POST /
async fn create_request(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(data): Json<CreateLeaveRequest>,
) -> Result<Json<LeaveResponse>> {
    let request = LeaveRepository::new(state.db())
        .create(&auth.user_id, &data)
        .await?;

    Ok(Json(LeaveResponse {
        success: true,
        message: "Leave request submitted".to_string(),
        request,
    }))
}

/// GET /
async fn list_requests(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<LeaveListResponse>> {
    let requests = LeaveRepository::new(state.db())
        .list_for_user(&auth.user_id)
        .await?;

    Ok(Json(LeaveListResponse {
        success: true,
        requests,
    }))
}
