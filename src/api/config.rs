//! Application configuration.
//!
//! Settings are read from the environment (optionally seeded from a `.env`
//! file). Secrets are mandatory in production; with `APP_ENV=development`
//! insecure defaults are used and a warning is logged.

use thiserror::Error;
use tracing::warn;

/// Public agenda feed of cultural events in Catalonia.
pub const DEFAULT_AGENDA_URL: &str =
    "https://analisi.transparenciacatalunya.cat/resource/rhpv-yr4f.json";

/// Every day at 16:00 (sec min hour day month weekday).
pub const DEFAULT_REFRESH_CRON: &str = "0 0 16 * * *";

const DEV_JWT_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable is required in production")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Environment (development/production)
    pub app_env: String,
    /// HTTP port
    pub port: u16,
    /// PostgreSQL URL; in-memory storage when absent
    pub database_url: Option<String>,
    /// HS256 signing secret for API tokens
    pub jwt_secret: String,
    pub agenda_url: String,
    /// Sent as `X-App-Token` to the agenda feed
    pub agenda_app_token: Option<String>,
    pub agenda_refresh_cron: String,
    pub agenda_refresh_on_startup: bool,
    /// Firebase project for push notifications; log-only when absent
    pub firebase_project_id: Option<String>,
    pub rate_limit_per_minute: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_env: "development".to_string(),
            port: 8081,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            agenda_url: DEFAULT_AGENDA_URL.to_string(),
            agenda_app_token: None,
            agenda_refresh_cron: DEFAULT_REFRESH_CRON.to_string(),
            agenda_refresh_on_startup: false,
            firebase_project_id: None,
            rate_limit_per_minute: 600,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match non_empty_var(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let app_env = non_empty_var("APP_ENV").unwrap_or_else(|| "production".to_string());
        let is_development = app_env.to_lowercase() == "development";

        let jwt_secret = match non_empty_var("JWT_SECRET") {
            Some(s) => s,
            None if is_development => {
                warn!(
                    "JWT_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!"
                );
                DEV_JWT_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        if jwt_secret.len() < 32 {
            if is_development {
                warn!("JWT_SECRET is less than 32 characters. Consider using a longer secret.");
            } else {
                return Err(ConfigError::Invalid {
                    name: "JWT_SECRET",
                    reason: "must be at least 32 characters in production".to_string(),
                });
            }
        }

        let agenda_refresh_cron =
            non_empty_var("AGENDA_REFRESH_CRON").unwrap_or_else(|| DEFAULT_REFRESH_CRON.to_string());
        crate::services::refresh_service::parse_schedule(&agenda_refresh_cron).map_err(|e| {
            ConfigError::Invalid {
                name: "AGENDA_REFRESH_CRON",
                reason: e.to_string(),
            }
        })?;

        let agenda_url =
            non_empty_var("AGENDA_URL").unwrap_or_else(|| DEFAULT_AGENDA_URL.to_string());
        url::Url::parse(&agenda_url).map_err(|e| ConfigError::Invalid {
            name: "AGENDA_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            port: parse_var("PORT", 8081)?,
            database_url: non_empty_var("DATABASE_URL"),
            jwt_secret,
            agenda_url,
            agenda_app_token: non_empty_var("AGENDA_APP_TOKEN"),
            agenda_refresh_cron,
            agenda_refresh_on_startup: parse_var("AGENDA_REFRESH_ON_STARTUP", true)?,
            firebase_project_id: non_empty_var("FIREBASE_PROJECT_ID"),
            rate_limit_per_minute: parse_var("RATE_LIMIT_PER_MINUTE", 600)?,
            app_env,
        })
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.app_env.to_lowercase() == "development"
    }
}
