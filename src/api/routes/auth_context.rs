//! Authentication context utilities.
//!
//! Provides the extractor that turns the `API-Token` header into the id of
//! a logged-in user.

use super::app_state::AppState;
use super::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

/// Header carrying the API token issued at login.
pub const API_TOKEN_HEADER: &str = "API-Token";

/// Header carrying the push notification device token at login.
pub const DEVICE_TOKEN_HEADER: &str = "DeviceToken";

/// Authentication context extracted from request
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(API_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                tracing::warn!("No API token provided");
                ApiError::new(StatusCode::UNAUTHORIZED, "API token required")
            })?;

        let user_id = state.users().resolve_token(token).await.map_err(|e| {
            tracing::warn!("API token rejected: {}", e);
            ApiError::from(e)
        })?;

        Ok(AuthContext { user_id })
    }
}
