//! External identity verification
//!
//! The server never checks passwords. Devices obtain an ID token from the
//! identity provider and exchange it here for a local session; the verifier
//! is a trait so tests can stub the provider out.

use async_trait::async_trait;
use serde::Deserialize;

/// Error type for identity verification
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The credential was rejected by the provider or failed validation
    #[error("Invalid identity credential: {0}")]
    Rejected(String),

    /// The provider could not be reached
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Profile resolved from a verified external credential
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Stable subject identifier at the provider
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// Verifies an opaque external credential into a stable identity
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Google ID token verifier using the tokeninfo endpoint
pub struct GoogleIdentityVerifier {
    http: reqwest::Client,
    client_id: String,
}

const TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";

/// Relevant claims of a Google tokeninfo response
#[derive(Debug, Deserialize)]
struct TokenInfo {
    aud: String,
    sub: String,
    email: String,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleIdentityVerifier {
    pub fn new(client_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id,
        }
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdentityVerifier {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        let response = self
            .http
            .get(TOKENINFO_URL)
            .query(&[("id_token", credential)])
            .send()
            .await
            .map_err(|e| IdentityError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::Rejected(format!(
                "tokeninfo returned {}",
                response.status()
            )));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| IdentityError::Rejected(e.to_string()))?;

        // The token must have been issued for this application
        if info.aud != self.client_id {
            return Err(IdentityError::Rejected("audience mismatch".to_string()));
        }

        Ok(VerifiedIdentity {
            display_name: info.name.unwrap_or_else(|| info.email.clone()),
            subject: info.sub,
            email: info.email,
            photo_url: info.picture,
        })
    }
}
