//! API routes module - organizes all route handlers.
//!
//! Resources are nested under `/api/v1` by [`create_app`]:
//! `/events`, `/users`, `/lists`, `/assistances` and `/incidents`.

pub mod app_state;
pub mod assistances;
pub mod auth_context;
pub mod error;
pub mod events;
pub mod extract;
pub mod incidents;
pub mod lists;
pub mod openapi;
pub mod users;

use axum::{Router, middleware::from_fn_with_state, response::Json, routing::get};
use serde_json::{Value, json};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::api::config::AppConfig;
use crate::middleware::{cors::create_cors_layer, rate_limit};
pub use app_state::AppState;

/// Create the main API router combining all route modules
pub fn create_api_router(_app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/events", events::events_router())
        .nest("/users", users::users_router())
        .nest("/lists", lists::lists_router())
        .nest("/assistances", assistances::assistances_router())
        .nest("/incidents", incidents::incidents_router())
        // OpenAPI documentation endpoints
        .merge(openapi::openapi_router())
    // Note: State is applied by callers who need it (e.g., TestServer)
    // For production use, call .with_state(app_state) after creating the router
}

/// Build the complete application: health checks, the API under `/api/v1`,
/// rate limiting, request tracing and CORS.
pub fn create_app(app_state: AppState) -> Router {
    let limiter = rate_limit::create_rate_limiter(app_state.config.rate_limit_per_minute);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/health", get(health_check))
        .nest("/api/v1", create_api_router(app_state.clone()))
        .with_state(app_state)
        .layer(from_fn_with_state(limiter, rate_limit::rate_limit_middleware))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer()),
        )
}

/// GET /health - Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "culture-finder-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Create the application state with default configuration and in-memory storage.
pub fn create_app_state() -> AppState {
    AppState::new()
}

/// Create the application state from configuration, connecting storage and
/// the push notification sender.
///
/// This is the preferred method for production use.
pub async fn create_app_state_with_storage(
    config: AppConfig,
) -> Result<AppState, crate::storage::StorageError> {
    let mut state = AppState::with_config(config);
    state.init_storage().await?;
    state.init_notifier();
    Ok(state)
}
