//! CORS middleware configuration.

use axum::http::{HeaderName, Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Create the CORS layer for the mobile and web clients.
///
/// Any origin is accepted. The custom `API-Token` and `DeviceToken` headers
/// are allowed alongside the usual content headers.
pub fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("api-token"),
            HeaderName::from_static("devicetoken"),
        ])
}
