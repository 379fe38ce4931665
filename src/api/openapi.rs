//! OpenAPI specification definition.
//!
//! Aggregates all route handlers and schemas for OpenAPI documentation generation.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Events
        crate::routes::events::list_events,
        crate::routes::events::create_event,
        crate::routes::events::edit_event,
        crate::routes::events::suggested_events,
        crate::routes::events::popular_events,
        crate::routes::events::delete_event,
        crate::routes::events::get_event,
        crate::routes::events::events_between_dates,
        crate::routes::events::events_by_name,
        crate::routes::events::events_by_description,
        crate::routes::events::events_by_scope,
        crate::routes::events::events_by_category,
        crate::routes::events::events_by_other_categories,
        crate::routes::events::events_by_price,
        crate::routes::events::events_by_region,
        crate::routes::events::filter_events,
        crate::routes::events::events_by_distance,
        crate::routes::events::list_tags,
        crate::routes::events::rate_event,
        crate::routes::events::unrate_event,
        crate::routes::events::get_rating,
        // Users
        crate::routes::users::list_users,
        crate::routes::users::register_user,
        crate::routes::users::authenticate,
        crate::routes::users::logout,
        crate::routes::users::get_profile,
        crate::routes::users::edit_profile,
        crate::routes::users::delete_user,
        crate::routes::users::notify_all,
        // Lists
        crate::routes::lists::my_lists,
        crate::routes::lists::create_list,
        crate::routes::lists::edit_list,
        crate::routes::lists::delete_list,
        crate::routes::lists::list_events,
        crate::routes::lists::add_event,
        crate::routes::lists::remove_event,
        // Assistances
        crate::routes::assistances::attend,
        crate::routes::assistances::is_attending,
        crate::routes::assistances::attended_events,
        crate::routes::assistances::withdraw,
        // Incidents
        crate::routes::incidents::incidents_by_user,
        crate::routes::incidents::incidents_by_event,
        crate::routes::incidents::list_incidents,
        crate::routes::incidents::submit_incident,
        crate::routes::incidents::edit_incident,
        crate::routes::incidents::delete_incident,
        crate::routes::incidents::delete_event_incidents,
        // OpenAPI
        crate::routes::openapi::serve_openapi_json,
    ),
    components(schemas(
        crate::models::EventDetails,
        crate::models::EventDto,
        crate::models::UserDto,
        crate::models::RegisteredUserDto,
        crate::models::UserAuthenticationDto,
        crate::models::Assistance,
        crate::models::IncidentDto,
        crate::models::SubmitIncidentDto,
        crate::models::ListDto,
        crate::models::EventPage,
        crate::models::UserPage,
        crate::models::ListPage,
        crate::models::IncidentPage,
        crate::routes::error::ErrorBody,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Events", description = "Cultural event catalogue, searches and ratings"),
        (name = "Users", description = "Registration, login sessions and profiles"),
        (name = "Lists", description = "User-curated event lists"),
        (name = "Assistances", description = "Event attendance"),
        (name = "Incidents", description = "Problem reports about events"),
        (name = "OpenAPI", description = "OpenAPI specification"),
    ),
    info(
        title = "Culture Finder API",
        description = "REST API for discovering cultural events in Catalonia",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8081/api/v1", description = "Local development server")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        // Update version to match Cargo.toml version
        openapi.info.version = env!("CARGO_PKG_VERSION").to_string();

        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::new);
        components.add_security_scheme(
            "api_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("API-Token"))),
        );
    }
}
