use super::{empty_if_null, not_blank};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A registered user. The id is chosen by the client (Firebase uid).
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub birth_date: String,
    pub profile_image: Option<String>,
    pub preferred_categories: Option<String>,
    pub is_admin: bool,
}

impl User {
    /// Preferred categories as trimmed, non-empty entries.
    pub fn categories(&self) -> Vec<String> {
        self.preferred_categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Active login of a user.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub device_token: Option<String>,
}

/// Profile view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub name: String,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(custom(function = "not_blank"))]
    pub birth_date: String,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub preferred_categories: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            birth_date: user.birth_date,
            profile_image: user.profile_image,
            preferred_categories: user.preferred_categories,
            is_admin: user.is_admin,
        }
    }
}

/// Registration payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserDto {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub preferred_categories: Option<String>,
    #[serde(default, deserialize_with = "empty_if_null")]
    #[validate(custom(function = "not_blank"))]
    pub birth_date: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Login payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAuthenticationDto {
    pub user_id: String,
}
