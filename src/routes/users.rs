//! User profile API routes

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::auth::AuthUser;
use crate::db::{User, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the users router
pub fn router() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

/// Profile response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub success: bool,
    #[serde(flatten)]
    pub user: User,
}

/// GET /profile
async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>> {
    let user = UserRepository::new(state.db())
        .get(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user,
    }))
}
