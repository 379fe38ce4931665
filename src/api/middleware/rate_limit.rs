//! Rate limiting middleware.
//!
//! A single global quota shared by every client, using the governor crate.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::routes::error::ApiError;

/// Rate limiter state
pub type RateLimiterState = Arc<
    RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
>;

const DEFAULT_REQUESTS_PER_MINUTE: NonZeroU32 = NonZeroU32::MIN.saturating_add(599);

/// Create a rate limiter allowing `requests_per_minute` (600 when zero).
pub fn create_rate_limiter(requests_per_minute: u32) -> RateLimiterState {
    let quota = Quota::per_minute(
        NonZeroU32::new(requests_per_minute).unwrap_or(DEFAULT_REQUESTS_PER_MINUTE),
    );
    Arc::new(RateLimiter::direct(quota))
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    request: Request,
    next: Next,
) -> Response {
    match limiter.check() {
        Ok(_) => next.run(request).await,
        Err(_) => {
            tracing::warn!("Rate limit exceeded for request: {}", request.uri());
            ApiError::new(StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response()
        }
    }
}
