//! Server configuration
//!
//! Loaded from environment variables (with `.env` support via dotenvy in
//! main). Every section has sensible defaults so the server can boot in
//! development without any configuration.

use std::env;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub geofence: GeofenceConfig,
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// OAuth client id expected in the `aud` claim of Google ID tokens
    pub google_client_id: String,
    /// Lifetime of issued session tokens, in hours
    pub session_ttl_hours: i64,
}

/// Default office geofence seeded when the geofences table is empty
#[derive(Debug, Clone)]
pub struct GeofenceConfig {
    pub office_name: String,
    pub office_latitude: f64,
    pub office_longitude: f64,
    pub office_radius_meters: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: "sqlite://punchcard.db".to_string(),
            },
            auth: AuthConfig {
                google_client_id: String::new(),
                session_ttl_hours: 24 * 7,
            },
            geofence: GeofenceConfig {
                office_name: "Main Office".to_string(),
                office_latitude: 37.7749,
                office_longitude: -122.4194,
                office_radius_meters: 100.0,
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Self {
            server: ServerConfig {
                port: parse_var("PORT", defaults.server.port)?,
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
            },
            auth: AuthConfig {
                google_client_id: env::var("GOOGLE_CLIENT_ID")
                    .unwrap_or(defaults.auth.google_client_id),
                session_ttl_hours: parse_var(
                    "SESSION_TTL_HOURS",
                    defaults.auth.session_ttl_hours,
                )?,
            },
            geofence: GeofenceConfig {
                office_name: env::var("OFFICE_NAME").unwrap_or(defaults.geofence.office_name),
                office_latitude: parse_var("OFFICE_LATITUDE", defaults.geofence.office_latitude)?,
                office_longitude: parse_var(
                    "OFFICE_LONGITUDE",
                    defaults.geofence.office_longitude,
                )?,
                office_radius_meters: parse_var(
                    "OFFICE_RADIUS_METERS",
                    defaults.geofence.office_radius_meters,
                )?,
            },
        })
    }
}

/// Parse an environment variable, falling back to a default when unset
fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.database.url.starts_with("sqlite://"));
        assert_eq!(config.auth.session_ttl_hours, 168);
    }
}
