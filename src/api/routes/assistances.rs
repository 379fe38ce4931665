//! Attendance routes for the authenticated user.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use super::extract::ApiQuery;
use crate::models::{Assistance, EventDto, Page, PaginationParams};

/// Create the assistances router
pub fn assistances_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(is_attending).post(attend).delete(withdraw),
        )
        .route("/events", get(attended_events))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AssistanceQuery {
    pub event_id: i64,
}

/// POST /assistances - Attend an event
#[utoipa::path(
    post,
    path = "/assistances",
    tag = "Assistances",
    params(AssistanceQuery),
    responses(
        (status = 201, description = "Assistance recorded", body = Assistance),
        (status = 404, description = "Event not found"),
        (status = 510, description = "Assistance already exists")
    ),
    security(("api_token" = []))
)]
pub async fn attend(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<AssistanceQuery>,
) -> ApiResult<(StatusCode, Json<Assistance>)> {
    let assistance = state.assistances().attend(&auth.user_id, q.event_id).await?;
    Ok((StatusCode::CREATED, Json(assistance)))
}

/// GET /assistances - Whether the caller attends an event
#[utoipa::path(
    get,
    path = "/assistances",
    tag = "Assistances",
    params(AssistanceQuery),
    responses((status = 200, description = "Attendance state", body = bool)),
    security(("api_token" = []))
)]
pub async fn is_attending(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<AssistanceQuery>,
) -> ApiResult<Json<bool>> {
    let attending = state
        .assistances()
        .is_attending(&auth.user_id, q.event_id)
        .await?;
    Ok(Json(attending))
}

/// GET /assistances/events - Events the caller attends
#[utoipa::path(
    get,
    path = "/assistances/events",
    tag = "Assistances",
    params(PaginationParams),
    responses((status = 200, description = "Attended events", body = EventPage)),
    security(("api_token" = []))
)]
pub async fn attended_events(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let events = state
        .assistances()
        .attended_events(&auth.user_id, page)
        .await?;
    Ok(Json(events))
}

/// DELETE /assistances - Stop attending an event
#[utoipa::path(
    delete,
    path = "/assistances",
    tag = "Assistances",
    params(AssistanceQuery),
    responses(
        (status = 200, description = "Assistance removed", body = bool),
        (status = 404, description = "Assistance not found")
    ),
    security(("api_token" = []))
)]
pub async fn withdraw(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<AssistanceQuery>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.assistances().withdraw(&auth.user_id, q.event_id).await?))
}
