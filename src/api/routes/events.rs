//! Event routes.
//!
//! Catalogue listing, searches, ratings and tags. Text searches only
//! consider upcoming events (starting today or later).

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use utoipa::IntoParams;

use super::app_state::AppState;
use super::auth_context::AuthContext;
use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use crate::models::{EventDto, EventFilter, Page, PaginationParams, TextMatch};
use crate::services::EventSearch;

/// Create the events router
pub fn events_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event).put(edit_event))
        .route("/suggestions", get(suggested_events))
        .route("/popularity", get(popular_events))
        .route("/{id}", delete(delete_event))
        .route("/{id}/allInfo", get(get_event))
        .route("/date", get(events_between_dates))
        .route("/denominacio", get(events_by_name))
        .route("/descripcio", get(events_by_description))
        .route("/ambit", get(events_by_scope))
        .route("/categoria", get(events_by_category))
        .route("/altres", get(events_by_other_categories))
        .route("/preu", get(events_by_price))
        .route("/comarcaIMunicipi", get(events_by_region))
        .route("/allFilters", get(filter_events))
        .route("/distance", get(events_by_distance))
        .route("/tags", get(list_tags))
        .route("/rate", post(rate_event).delete(unrate_event))
        .route("/rating", get(get_rating))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DateRangeQuery {
    /// Earliest start date
    pub data_ini: NaiveDate,
    /// Latest end date
    pub data_fi: NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    pub denominacio: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DescriptionQuery {
    pub descripcio: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScopeQuery {
    pub ambit: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryQuery {
    pub categoria: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OtherCategoriesQuery {
    pub altres: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PriceQuery {
    pub preu: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RegionQuery {
    pub comarca_municipi: String,
}

/// Combined filters; every criterion is optional.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AllFiltersQuery {
    pub ambit: Option<String>,
    pub categoria: Option<String>,
    pub altres: Option<String>,
    pub data_ini: Option<NaiveDate>,
    pub data_fi: Option<NaiveDate>,
    pub preu: Option<String>,
    pub denominacio: Option<String>,
    pub comarca_municipi: Option<String>,
    pub descripcio: Option<String>,
    /// Squared-degree radius around (latitud, longitud)
    pub radi: Option<f32>,
    pub latitud: Option<f32>,
    pub longitud: Option<f32>,
}

impl From<AllFiltersQuery> for EventSearch {
    fn from(q: AllFiltersQuery) -> Self {
        EventSearch {
            scope: q.ambit,
            category: q.categoria,
            other_categories: q.altres,
            from: q.data_ini,
            until: q.data_fi,
            price: q.preu,
            name: q.denominacio,
            region: q.comarca_municipi,
            description: q.descripcio,
            radius: q.radi,
            latitude: q.latitud,
            longitude: q.longitud,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DistanceQuery {
    pub data_ini: Option<NaiveDate>,
    pub data_fi: Option<NaiveDate>,
    pub radi: Option<f32>,
    pub latitud: Option<f32>,
    pub longitud: Option<f32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RateQuery {
    pub event_id: i64,
    pub score: f32,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventIdQuery {
    pub event_id: i64,
}

/// GET /events - List all events
#[utoipa::path(
    get,
    path = "/events",
    tag = "Events",
    params(PaginationParams),
    responses(
        (status = 200, description = "Events retrieved", body = EventPage),
        (status = 400, description = "Invalid pagination")
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    Ok(Json(state.events().list_all(page).await?))
}

/// POST /events - Create an event
#[utoipa::path(
    post,
    path = "/events",
    tag = "Events",
    request_body = EventDto,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid event"),
        (status = 510, description = "Event already exists")
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<EventDto>,
) -> ApiResult<(StatusCode, Json<EventDto>)> {
    let created = state.events().create(dto).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /events - Edit an event, located by id or by exact description
#[utoipa::path(
    put,
    path = "/events",
    tag = "Events",
    request_body = EventDto,
    responses(
        (status = 201, description = "Event edited", body = EventDto),
        (status = 404, description = "Event not found")
    )
)]
pub async fn edit_event(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<EventDto>,
) -> ApiResult<(StatusCode, Json<EventDto>)> {
    let edited = state.events().edit(dto).await?;
    Ok((StatusCode::CREATED, Json(edited)))
}

/// GET /events/suggestions - Events matching the caller's preferred categories
#[utoipa::path(
    get,
    path = "/events/suggestions",
    tag = "Events",
    params(PaginationParams),
    responses(
        (status = 200, description = "Suggested events", body = EventPage),
        (status = 401, description = "Missing or invalid API token"),
        (status = 404, description = "User not found")
    ),
    security(("api_token" = []))
)]
pub async fn suggested_events(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let user = state.users().get_user(&auth.user_id).await?;
    Ok(Json(state.events().suggestions(&user.categories(), page).await?))
}

/// GET /events/popularity - Attended events, most attended first
#[utoipa::path(
    get,
    path = "/events/popularity",
    tag = "Events",
    params(PaginationParams),
    responses((status = 200, description = "Events by popularity", body = EventPage))
)]
pub async fn popular_events(
    State(state): State<AppState>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    Ok(Json(state.events().popular(page).await?))
}

/// DELETE /events/{id} - Delete an event and everything attached to it
#[utoipa::path(
    delete,
    path = "/events/{id}",
    tag = "Events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event deleted", body = bool),
        (status = 404, description = "Event not found")
    )
)]
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.events().delete(id).await?))
}

/// GET /events/{id}/allInfo - Get one event
#[utoipa::path(
    get,
    path = "/events/{id}/allInfo",
    tag = "Events",
    params(("id" = i64, Path, description = "Event id")),
    responses(
        (status = 200, description = "Event found", body = EventDto),
        (status = 404, description = "Event not found")
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<EventDto>> {
    Ok(Json(state.events().get(id).await?))
}

/// GET /events/date - Events within a date range
#[utoipa::path(
    get,
    path = "/events/date",
    tag = "Events",
    params(DateRangeQuery, PaginationParams),
    responses((status = 200, description = "Events in range", body = EventPage))
)]
pub async fn events_between_dates(
    State(state): State<AppState>,
    ApiQuery(range): ApiQuery<DateRangeQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let events = state
        .events()
        .between_dates(range.data_ini, range.data_fi, page)
        .await?;
    Ok(Json(events))
}

async fn upcoming_with(
    state: &AppState,
    pagination: PaginationParams,
    set: impl FnOnce(&mut EventFilter) + Send,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let events = state
        .events()
        .upcoming_matching(today(), set, page)
        .await?;
    Ok(Json(events))
}

/// GET /events/denominacio - Upcoming events whose name contains the text
#[utoipa::path(
    get,
    path = "/events/denominacio",
    tag = "Events",
    params(NameQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_name(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<NameQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.name = Some(TextMatch::Contains(q.denominacio))
    })
    .await
}

/// GET /events/descripcio - Upcoming events with exactly this description
#[utoipa::path(
    get,
    path = "/events/descripcio",
    tag = "Events",
    params(DescriptionQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_description(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<DescriptionQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.description = Some(TextMatch::Exact(q.descripcio))
    })
    .await
}

/// GET /events/ambit - Upcoming events whose scope contains the text
#[utoipa::path(
    get,
    path = "/events/ambit",
    tag = "Events",
    params(ScopeQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_scope(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ScopeQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.scope = Some(TextMatch::Contains(q.ambit))
    })
    .await
}

/// GET /events/categoria - Upcoming events whose category contains the text
#[utoipa::path(
    get,
    path = "/events/categoria",
    tag = "Events",
    params(CategoryQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_category(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<CategoryQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.category = Some(TextMatch::Contains(q.categoria))
    })
    .await
}

/// GET /events/altres - Upcoming events whose other categories contain the text
#[utoipa::path(
    get,
    path = "/events/altres",
    tag = "Events",
    params(OtherCategoriesQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_other_categories(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<OtherCategoriesQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.other_categories = Some(TextMatch::Contains(q.altres))
    })
    .await
}

/// GET /events/preu - Upcoming events whose price contains the text
#[utoipa::path(
    get,
    path = "/events/preu",
    tag = "Events",
    params(PriceQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_price(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<PriceQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.price = Some(TextMatch::Contains(q.preu))
    })
    .await
}

/// GET /events/comarcaIMunicipi - Upcoming events whose region contains the text
#[utoipa::path(
    get,
    path = "/events/comarcaIMunicipi",
    tag = "Events",
    params(RegionQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn events_by_region(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<RegionQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    upcoming_with(&state, pagination, |f| {
        f.region = Some(TextMatch::Contains(q.comarca_municipi))
    })
    .await
}

/// GET /events/allFilters - Events matching every given criterion
#[utoipa::path(
    get,
    path = "/events/allFilters",
    tag = "Events",
    params(AllFiltersQuery, PaginationParams),
    responses((status = 200, description = "Matching events", body = EventPage))
)]
pub async fn filter_events(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<AllFiltersQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let filter = EventSearch::from(q).into_filter(today());
    Ok(Json(state.events().search(&filter, page).await?))
}

/// GET /events/distance - Events near a point within the date bounds
#[utoipa::path(
    get,
    path = "/events/distance",
    tag = "Events",
    params(DistanceQuery, PaginationParams),
    responses((status = 200, description = "Nearby events", body = EventPage))
)]
pub async fn events_by_distance(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<DistanceQuery>,
    ApiQuery(pagination): ApiQuery<PaginationParams>,
) -> ApiResult<Json<Page<EventDto>>> {
    let page = pagination.page_request()?;
    let search = EventSearch {
        from: q.data_ini,
        until: q.data_fi,
        radius: q.radi,
        latitude: q.latitud,
        longitude: q.longitud,
        ..Default::default()
    };
    let filter = search.into_filter(today());
    Ok(Json(state.events().search(&filter, page).await?))
}

/// GET /events/tags - Sorted set of tags usable as filters
#[utoipa::path(
    get,
    path = "/events/tags",
    tag = "Events",
    responses((status = 200, description = "Tags retrieved", body = Vec<String>))
)]
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.events().tags().await?))
}

/// POST /events/rate - Rate an event
#[utoipa::path(
    post,
    path = "/events/rate",
    tag = "Events",
    params(RateQuery),
    responses(
        (status = 201, description = "Event rated", body = EventDto),
        (status = 404, description = "Event not found"),
        (status = 510, description = "Event already rated")
    ),
    security(("api_token" = []))
)]
pub async fn rate_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<RateQuery>,
) -> ApiResult<(StatusCode, Json<EventDto>)> {
    let event = state
        .events()
        .rate(q.event_id, &auth.user_id, q.score)
        .await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// DELETE /events/rate - Remove the caller's rating
#[utoipa::path(
    delete,
    path = "/events/rate",
    tag = "Events",
    params(EventIdQuery),
    responses(
        (status = 200, description = "Rating removed", body = bool),
        (status = 404, description = "Event or rating not found")
    ),
    security(("api_token" = []))
)]
pub async fn unrate_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<EventIdQuery>,
) -> ApiResult<Json<bool>> {
    Ok(Json(state.events().unrate(q.event_id, &auth.user_id).await?))
}

/// GET /events/rating - The caller's score for an event, or null
#[utoipa::path(
    get,
    path = "/events/rating",
    tag = "Events",
    params(EventIdQuery),
    responses((status = 200, description = "Rating retrieved", body = f32)),
    security(("api_token" = []))
)]
pub async fn get_rating(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiQuery(q): ApiQuery<EventIdQuery>,
) -> ApiResult<Json<Option<f32>>> {
    Ok(Json(state.events().rating(q.event_id, &auth.user_id).await?))
}
