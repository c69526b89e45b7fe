//! Authentication API routes

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};

use crate::auth::IdentityError;
use crate::db::{User, UserRepository};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the auth router
pub fn router() -> Router<AppState> {
    Router::new().route("/google-verify", post(google_verify))
}

/// Credential exchange request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleVerifyRequest {
    pub id_token: String,
}

/// Credential exchange response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub success: bool,
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: User,
}

/// POST /google-verify
///
/// Verify an external ID token, resolve or create the local user, and
/// issue a session token.
async fn google_verify(
    State(state): State<AppState>,
    Json(request): Json<GoogleVerifyRequest>,
) -> Result<Json<AuthResponse>> {
    if request.id_token.is_empty() {
        return Err(AppError::BadRequest("ID token is required".to_string()));
    }

    let identity = state
        .identity()
        .verify(&request.id_token)
        .await
        .map_err(|e| match e {
            IdentityError::Rejected(_) => AppError::Unauthorized("Invalid ID token".to_string()),
            IdentityError::Provider(msg) => AppError::Internal(msg),
        })?;

    let user = UserRepository::new(state.db()).find_or_create(&identity).await?;
    let session = state.sessions().issue(&user.id).await?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok(Json(AuthResponse {
        success: true,
        token: session.token,
        user,
    }))
}
