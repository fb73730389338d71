//! Global request rate limiting

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};

use super::ApiState;

/// Process-wide limiter, not keyed by client
pub type SharedLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Limiter shared by every route the widget calls
///
/// The whole minute's allowance may be spent at once; a configured limit of
/// zero is treated as one request per minute.
#[must_use]
pub fn create_limiter(requests_per_minute: u32) -> SharedLimiter {
    let allowance = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(allowance)))
}

/// Reject widget traffic over the configured allowance
///
/// Passes everything through when `server.rate_limit_per_minute` is unset.
///
/// # Errors
///
/// Returns `429 Too Many Requests` once the quota is spent
pub async fn rate_limit_middleware(
    State(state): State<Arc<ApiState>>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(limiter) = &state.rate_limiter
        && limiter.check().is_err()
    {
        tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }
    Ok(next.run(req).await)
}
