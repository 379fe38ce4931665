//! Incident routes.
//!
//! Admins can see and manage every incident; other users only their own.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{delete, get},
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use crate::models::{IncidentDto, Page, PaginationParams, SubmitIncidentDto};

/// Create the incidents router
pub fn incidents_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_incidents)
                .post(submit_incident)
                .put(edit_incident)
                .delete(delete_incident),
        )
        .route("/filters/users", get(incidents_by_user))
        .route("/filters/events", get(incidents_by_event))
        .route("/event", delete(delete_event_incidents))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UserIncidentsQuery {
    pub user_id: String,
    /// Omit for both resolved and open incidents
    pub resolved: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventIncidentsQuery {
    /// Event id, or 0 for every event
    pub event_id: i64,
    pub resolved: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IncidentIdQuery {
    pub id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct IncidentEventQuery {
    pub event_id: i64,
}

/// GET /incidents/filters/users - Incidents filed by a user
#[utoipa::path(
    get,
    path = "/incidents/filters/users",
    tag = "Incidents",
    params(UserIncidentsQuery),
    responses(
        (status = 200, description = "Incidents retrieved", body = Vec<IncidentDto>),
        (status = 403, description = "Not allowed to see these incidents")
    ),
    security(("api_token" = []))
)]
pub async fn incidents_by_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<UserIncidentsQuery>,
) -> ApiResult<Json<Vec<IncidentDto>>> {
    let incidents = state
        .incidents()
        .by_user(&auth.user_id, &q.user_id, q.resolved)
        .await?;
    Ok(Json(incidents))
}

/// GET /incidents/filters/events - Incidents of an event
#[utoipa::path(
    get,
    path = "/incidents/filters/events",
    tag = "Incidents",
    params(EventIncidentsQuery),
    responses((status = 200, description = "Incidents retrieved", body = Vec<IncidentDto>)),
    security(("api_token" = []))
)]
pub async fn incidents_by_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<EventIncidentsQuery>,
) -> ApiResult<Json<Vec<IncidentDto>>> {
    let incidents = state
        .incidents()
        .by_event(&auth.user_id, q.event_id, q.resolved)
        .await?;
    Ok(Json(incidents))
}

/// GET /incidents - Incidents visible to the caller
#[utoipa::path(
    get,
    path = "/incidents",
    tag = "Incidents",
    params(PaginationParams),
    responses((status = 200, description = "Incidents retrieved", body = IncidentPage)),
    security(("api_token" = []))
)]
pub async fn list_incidents(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<IncidentDto>>> {
    let page = pagination.page_request()?;
    Ok(Json(state.incidents().list(&auth.user_id, page).await?))
}

/// POST /incidents - Report an incident
#[utoipa::path(
    post,
    path = "/incidents",
    tag = "Incidents",
    request_body = SubmitIncidentDto,
    responses(
        (status = 200, description = "Incident reported", body = IncidentDto),
        (status = 404, description = "Event not found")
    ),
    security(("api_token" = []))
)]
pub async fn submit_incident(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(dto): ApiJson<SubmitIncidentDto>,
) -> ApiResult<Json<IncidentDto>> {
    Ok(Json(state.incidents().submit(&auth.user_id, dto).await?))
}

/// PUT /incidents - Edit an incident
#[utoipa::path(
    put,
    path = "/incidents",
    tag = "Incidents",
    request_body = IncidentDto,
    responses(
        (status = 201, description = "Incident edited", body = IncidentDto),
        (status = 403, description = "Not allowed to edit this incident"),
        (status = 404, description = "Incident, user or event not found")
    ),
    security(("api_token" = []))
)]
pub async fn edit_incident(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(dto): ApiJson<IncidentDto>,
) -> ApiResult<(StatusCode, Json<IncidentDto>)> {
    let incident = state.incidents().edit(&auth.user_id, dto).await?;
    Ok((StatusCode::CREATED, Json(incident)))
}

/// DELETE /incidents - Delete one incident
#[utoipa::path(
    delete,
    path = "/incidents",
    tag = "Incidents",
    params(IncidentIdQuery),
    responses(
        (status = 200, description = "Incident deleted", body = bool),
        (status = 403, description = "Not allowed to delete this incident"),
        (status = 404, description = "Incident not found")
    ),
    security(("api_token" = []))
)]
pub async fn delete_incident(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<IncidentIdQuery>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.incidents().delete(&auth.user_id, q.id).await?))
}

/// DELETE /incidents/event - Delete the incidents of an event
#[utoipa::path(
    delete,
    path = "/incidents/event",
    tag = "Incidents",
    params(IncidentEventQuery),
    responses(
        (status = 200, description = "Whether no matching incidents remain", body = bool),
        (status = 404, description = "Event not found, or it has no incidents")
    ),
    security(("api_token" = []))
)]
pub async fn delete_event_incidents(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<IncidentEventQuery>,
) -> ApiResult<Json<bool>> {
    let cleared = state
        .incidents()
        .delete_for_event(&auth.user_id, q.event_id)
        .await?;
    Ok(Json(cleared))
}
