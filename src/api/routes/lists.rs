//! Event list routes. Every endpoint acts on the caller's own lists.

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
use crate::models::{EventDto, ListDto, Page, PaginationParams};

/// Create the lists router
pub fn lists_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(my_lists)
                .post(create_list)
                .put(edit_list)
                .delete(delete_list),
        )
        .route(
            "/events",
            get(list_events).post(add_event).delete(remove_event),
        )
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListIdQuery {
    pub list_id: i64,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NewListQuery {
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EditListQuery {
    pub list_id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListEventQuery {
    pub list_id: i64,
    pub event_id: i64,
}

/// GET /lists - The caller's lists
#[utoipa::path(
    get,
    path = "/lists",
    tag = "Lists",
    params(PaginationParams),
    responses((status = 200, description = "Lists retrieved", body = ListPage)),
    security(("api_token" = []))
)]
pub async fn my_lists(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<ListDto>>> {
    let page = pagination.page_request()?;
    Ok(Json(state.lists().lists_of(&auth.user_id, page).await?))
}

/// POST /lists - Create an empty list
#[utoipa::path(
    post,
    path = "/lists",
    tag = "Lists",
    params(NewListQuery),
    responses(
        (status = 201, description = "List created", body = ListDto),
        (status = 403, description = "Reserved list name")
    ),
    security(("api_token" = []))
)]
pub async fn create_list(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<NewListQuery>,
) -> ApiResult<(StatusCode, Json<ListDto>)> {
    let list = state.lists().create(&auth.user_id, &q.name).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// PUT /lists - Rename or redescribe a list
#[utoipa::path(
    put,
    path = "/lists",
    tag = "Lists",
    params(EditListQuery),
    responses(
        (status = 201, description = "List edited", body = ListDto),
        (status = 403, description = "Not the owner, or reserved name"),
        (status = 404, description = "List not found")
    ),
    security(("api_token" = []))
)]
pub async fn edit_list(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<EditListQuery>,
) -> ApiResult<(StatusCode, Json<ListDto>)> {
    let list = state
        .lists()
        .edit(q.list_id, &auth.user_id, q.name, q.description)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// DELETE /lists - Delete a list
#[utoipa::path(
    delete,
    path = "/lists",
    tag = "Lists",
    params(ListIdQuery),
    responses(
        (status = 200, description = "List deleted", body = bool),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "List not found")
    ),
    security(("api_token" = []))
)]
pub async fn delete_list(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<ListIdQuery>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.lists().delete(q.list_id, &auth.user_id).await?))
}

/// GET /lists/events - Events in a list
#[utoipa::path(
    get,
    path = "/lists/events",
    tag = "Lists",
    params(ListIdQuery, PaginationParams),
    responses(
        (status = 200, description = "Events retrieved", body = EventPage),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "List not found")
    ),
    security(("api_token" = []))
)]
pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<ListIdQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let events = state
        .lists()
        .events_of(q.list_id, &auth.user_id, page)
        .await?;
    Ok(Json(events))
}

/// POST /lists/events - Add an event to a list
#[utoipa::path(
    post,
    path = "/lists/events",
    tag = "Lists",
    params(ListEventQuery),
    responses(
        (status = 201, description = "Event added", body = ListDto),
        (status = 403, description = "Not the owner, or event already in the list"),
        (status = 404, description = "List or event not found")
    ),
    security(("api_token" = []))
)]
pub async fn add_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<ListEventQuery>,
) -> ApiResult<(StatusCode, Json<ListDto>)> {
    let list = state
        .lists()
        .add_event(q.list_id, q.event_id, &auth.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(list)))
}

/// DELETE /lists/events - Remove an event from a list
#[utoipa::path(
    delete,
    path = "/lists/events",
    tag = "Lists",
    params(ListEventQuery),
    responses(
        (status = 200, description = "Event removed", body = bool),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "List not found or event not in the list")
    ),
    security(("api_token" = []))
)]
pub async fn remove_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<ListEventQuery>,
) -> ApiResult<Json<bool>> {
    let removed = state
        .lists()
        .remove_event(q.list_id, q.event_id, &auth.user_id)
        .await?;
    Ok(Json(removed))
}
