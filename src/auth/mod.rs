//! Authentication: external identity verification and bearer sessions

mod identity;
mod session;

pub use identity::{GoogleIdentityVerifier, IdentityError, IdentityVerifier, VerifiedIdentity};
pub use session::{IssuedSession, SessionManager};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

/// Authenticated caller, extracted from the `Authorization` header
///
/// Everything downstream of this extractor trusts `user_id`; client
/// payloads never carry ownership.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected a bearer token".to_string()))?;

        let user_id = state
            .sessions()
            .resolve(token)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired session".to_string()))?;

        Ok(AuthUser { user_id })
    }
}
