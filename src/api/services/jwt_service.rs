//! JWT Service for API token generation and validation.
//!
//! API tokens carry the user id and do not expire on their own. A token is
//! only honoured while the matching session row exists, so logging out
//! revokes it.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Authenticated user id
    pub user_id: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT Service configuration
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service with the given secret
    ///
    /// # Arguments
    /// * `secret` - The secret key for signing tokens (should be at least 32 bytes)
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue an API token for a user
    pub fn issue_token(&self, user_id: &str) -> Result<String, String> {
        let claims = Claims {
            user_id: user_id.to_string(),
            iat: Utc::now().timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| format!("Failed to encode API token: {}", e))?;

        debug!("Issued API token for user {}", user_id);
        Ok(token)
    }

    /// Validate an API token signature and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidToken => "Invalid token format".to_string(),
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    "Invalid token signature".to_string()
                }
                _ => format!("Token validation failed: {}", e),
            })
    }
}

/// Shared JWT service for use across the application
pub type SharedJwtService = Arc<JwtService>;
