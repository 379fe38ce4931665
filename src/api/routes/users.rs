//! User routes: registration, login sessions and profile management.
//!
//! Logging in issues an API token which must be sent back in the
//! `API-Token` header. Tokens stay valid until the user logs out.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
};
use tracing::info;

use super::app_state::AppState;
use super::auth_context::{AuthContext, DEVICE_TOKEN_HEADER};
use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use crate::models::{Page, PaginationParams, RegisteredUserDto, UserAuthenticationDto, UserDto};
use crate::services::notification_service::{NEAR_EVENTS_BODY, NEAR_EVENTS_TITLE};

/// Create the users router
pub fn users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_users)
                .post(register_user)
                .put(edit_profile)
                .delete(delete_user),
        )
        .route("/profile", get(get_profile))
        .route("/authenticate", post(authenticate))
        .route("/logout", post(logout))
        .route("/notifications", get(notify_all))
}

/// GET /users - List every user
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    params(PaginationParams),
    responses((status = 200, description = "Users retrieved", body = UserPage))
)]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<UserDto>>> {
    let page = pagination.page_request()?;
    Ok(Json(state.users().list(page).await?))
}

/// POST /users - Register a user
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = RegisteredUserDto,
    responses(
        (status = 201, description = "User registered", body = RegisteredUserDto),
        (status = 404, description = "Missing user id"),
        (status = 510, description = "User already exists")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RegisteredUserDto>,
) -> ApiResult<(StatusCode, Json<RegisteredUserDto>)> {
    let registered = state.users().register(dto).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// POST /users/authenticate - Log in and obtain an API token
#[utoipa::path(
    post,
    path = "/users/authenticate",
    tag = "Users",
    request_body = UserAuthenticationDto,
    params(("DeviceToken" = Option<String>, Header, description = "Push notification device token")),
    responses(
        (status = 200, description = "Logged in, returns the API token", body = String),
        (status = 404, description = "User not found"),
        (status = 510, description = "User is already logged in")
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(dto): ApiJson<UserAuthenticationDto>,
) -> ApiResult<Json<String>> {
    let device_token = headers
        .get(DEVICE_TOKEN_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let token = state
        .users()
        .authenticate(&dto.user_id, device_token)
        .await?;
    Ok(Json(token))
}

/// POST /users/logout - End the caller's session
#[utoipa::path(
    post,
    path = "/users/logout",
    tag = "Users",
    responses(
        (status = 200, description = "Logged out", body = bool),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "User is not logged in")
    ),
    security(("api_token" = []))
)]
pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<bool>> {
    Ok(Json(state.users().logout(&auth.user_id).await?))
}

/// GET /users/profile - The caller's profile
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Profile retrieved", body = UserDto),
        (status = 401, description = "Missing or invalid API token")
    ),
    security(("api_token" = []))
)]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<UserDto>> {
    Ok(Json(state.users().profile(&auth.user_id).await?))
}

/// PUT /users - Replace the caller's profile
#[utoipa::path(
    put,
    path = "/users",
    tag = "Users",
    request_body = UserDto,
    responses(
        (status = 201, description = "Profile updated", body = UserDto),
        (status = 400, description = "Invalid profile")
    ),
    security(("api_token" = []))
)]
pub async fn edit_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(dto): ApiJson<UserDto>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let updated = state.users().edit_profile(&auth.user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(updated)))
}

/// DELETE /users - Delete the caller and everything they own
#[utoipa::path(
    delete,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "User deleted", body = bool)),
    security(("api_token" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.users().delete(&auth.user_id).await?))
}

/// GET /users/notifications - Send the near-events reminder to every device
#[utoipa::path(
    get,
    path = "/users/notifications",
    tag = "Users",
    responses(
        (status = 200, description = "Notifications sent", body = bool),
        (status = 403, description = "Permission denied")
    ),
    security(("api_token" = []))
)]
pub async fn notify_all(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<bool>> {
    state.users().require_admin(&auth.user_id).await?;
    let delivered = state
        .notifications()
        .send_to_all(NEAR_EVENTS_TITLE, NEAR_EVENTS_BODY)
        .await?;
    info!("Admin {} notified {} devices", auth.user_id, delivered);
    Ok(Json(true))
}
