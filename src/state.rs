//! Application state management

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::{IdentityVerifier, SessionManager};
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    db: SqlitePool,
    identity: Arc<dyn IdentityVerifier>,
    sessions: SessionManager,
}

impl AppState {
    /// Create a new application state
    pub fn new(config: Config, db: SqlitePool, identity: Arc<dyn IdentityVerifier>) -> Self {
        let sessions = SessionManager::new(db.clone(), config.auth.session_ttl_hours);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                db,
                identity,
                sessions,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the database pool
    pub fn db(&self) -> &SqlitePool {
        &self.inner.db
    }

    /// Get the identity verifier
    pub fn identity(&self) -> &dyn IdentityVerifier {
        self.inner.identity.as_ref()
    }

    /// Get the session manager
    pub fn sessions(&self) -> &SessionManager {
        &self.inner.sessions
    }
}
