//! User accounts, login sessions and profile management.

use super::error::{ServiceError, ServiceResult, on_conflict};
use super::jwt_service::SharedJwtService;
use crate::models::list::{FAVOURITES_LIST_DESCRIPTION, FAVOURITES_LIST_NAME};
use crate::models::{Page, PageRequest, RegisteredUserDto, Session, User, UserDto};
use crate::storage::StorageBackend;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

/// Service for users and their sessions.
#[derive(Clone)]
pub struct UserService {
    storage: Arc<dyn StorageBackend>,
    jwt: SharedJwtService,
}

impl UserService {
    pub fn new(storage: Arc<dyn StorageBackend>, jwt: SharedJwtService) -> Self {
        Self { storage, jwt }
    }

    pub async fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("User {} not found", user_id)))
    }

    /// Resolve an API token to the id of its logged-in user.
    pub async fn resolve_token(&self, token: &str) -> ServiceResult<String> {
        let claims = self
            .jwt
            .validate_token(token)
            .map_err(ServiceError::Unauthorized)?;
        let session = self
            .storage
            .get_session_by_token(token)
            .await?
            .ok_or_else(|| ServiceError::not_found("User not found"))?;
        if session.user_id != claims.user_id {
            warn!(
                "Token claims user {} but session belongs to {}",
                claims.user_id, session.user_id
            );
            return Err(ServiceError::not_found("User not found"));
        }
        Ok(session.user_id)
    }

    pub async fn is_admin(&self, user_id: &str) -> ServiceResult<bool> {
        Ok(self.get_user(user_id).await?.is_admin)
    }

    pub async fn require_admin(&self, user_id: &str) -> ServiceResult<()> {
        if self.is_admin(user_id).await? {
            Ok(())
        } else {
            Err(ServiceError::permission_denied("Permission denied"))
        }
    }

    pub async fn list(&self, page: Option<PageRequest>) -> ServiceResult<Page<UserDto>> {
        let users = self.storage.list_users().await?;
        Ok(Page::paginate(users, page).map(UserDto::from))
    }

    pub async fn profile(&self, user_id: &str) -> ServiceResult<UserDto> {
        Ok(self.get_user(user_id).await?.into())
    }

    /// Register a user and create their favourites list.
    pub async fn register(&self, dto: RegisteredUserDto) -> ServiceResult<RegisteredUserDto> {
        dto.validate()?;
        let id = dto
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ServiceError::not_found("User id can not be null"))?;

        let user = User {
            id: id.clone(),
            name: dto.name.clone(),
            birth_date: dto.birth_date.clone(),
            profile_image: Some(String::new()),
            preferred_categories: dto.preferred_categories.clone(),
            is_admin: dto.is_admin,
        };
        self.storage
            .insert_user(&user)
            .await
            .map_err(on_conflict("User already exists"))?;
        self.storage
            .insert_list(&id, FAVOURITES_LIST_NAME, FAVOURITES_LIST_DESCRIPTION)
            .await?;

        info!("Registered user {}", id);
        Ok(RegisteredUserDto {
            id: Some(id),
            ..dto
        })
    }

    /// Open a session for a user and return its API token.
    pub async fn authenticate(
        &self,
        user_id: &str,
        device_token: Option<String>,
    ) -> ServiceResult<String> {
        self.get_user(user_id).await?;
        if self.storage.get_session_by_user(user_id).await?.is_some() {
            return Err(ServiceError::already_exists("User is already logged in"));
        }

        let token = self
            .jwt
            .issue_token(user_id)
            .map_err(ServiceError::Upstream)?;
        let session = Session {
            user_id: user_id.to_string(),
            token: token.clone(),
            device_token: device_token.filter(|t| !t.is_empty()),
        };
        self.storage
            .insert_session(&session)
            .await
            .map_err(on_conflict("User is already logged in"))?;

        info!("User {} logged in", user_id);
        Ok(token)
    }

    pub async fn logout(&self, user_id: &str) -> ServiceResult<bool> {
        if !self.storage.delete_session(user_id).await? {
            return Err(ServiceError::not_found("User is not logged in"));
        }
        info!("User {} logged out", user_id);
        Ok(true)
    }

    /// Replace the caller's profile. The admin flag is kept from storage.
    pub async fn edit_profile(&self, user_id: &str, dto: UserDto) -> ServiceResult<UserDto> {
        dto.validate()?;
        let current = self.get_user(user_id).await?;
        let user = User {
            id: current.id,
            name: dto.name,
            birth_date: dto.birth_date,
            profile_image: dto.profile_image,
            preferred_categories: dto.preferred_categories,
            is_admin: current.is_admin,
        };
        self.storage.update_user(&user).await?;
        Ok(user.into())
    }

    /// Delete a user together with everything they own.
    pub async fn delete(&self, user_id: &str) -> ServiceResult<bool> {
        self.get_user(user_id).await?;
        let assistances = self.storage.delete_assistances_by_user(user_id).await?;
        let ratings = self.storage.delete_ratings_by_user(user_id).await?;
        let lists = self.storage.delete_lists_by_user(user_id).await?;
        self.storage.delete_session(user_id).await?;
        self.storage.delete_user(user_id).await?;
        info!(
            "Deleted user {} ({} assistances, {} ratings, {} lists)",
            user_id, assistances, ratings, lists
        );
        Ok(self.storage.get_user(user_id).await?.is_none())
    }
}
