//! Rate limiting middleware.
//!
//! Per-user limits on authenticated routes, keyed by the user id from the
//! access token.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::{Clock, DefaultClock},
    DefaultKeyedRateLimiter, Quota, RateLimiter,
};
use std::num::NonZeroU32;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

/// Limiter buckets kept before idle users are pruned.
const PRUNE_THRESHOLD: usize = 10_000;

/// Rate limiter state shared across all requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<Uuid>,
    clock: DefaultClock,
    rate_limit_per_minute: u32,
}

impl RateLimiterState {
    /// Returns `None` when the limit is 0 (disabled).
    pub fn new(rate_limit_per_minute: u32) -> Option<Self> {
        let per_minute = NonZeroU32::new(rate_limit_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            clock: DefaultClock::default(),
            rate_limit_per_minute,
        })
    }

    pub fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Returns `Err(retry_after_secs)` when the user is over the limit.
    pub fn check(&self, user_id: Uuid) -> Result<(), u64> {
        if self.limiter.len() > PRUNE_THRESHOLD {
            self.limiter.retain_recent();
        }

        self.limiter.check_key(&user_id).map_err(|not_until| {
            not_until
                .wait_time_from(self.clock.now())
                .as_secs()
                .max(1)
        })
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("rate_limit_per_minute", &self.rate_limit_per_minute)
            .field("active_limiters", &self.limiter.len())
            .finish()
    }
}

/// Middleware that applies rate limiting per user.
///
/// Must run after `require_user_auth` so the user is in request extensions.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let (Some(limiter), Some(auth)) = (
        state.rate_limiter.as_ref(),
        req.extensions().get::<UserAuth>(),
    ) else {
        return next.run(req).await;
    };

    if let Err(retry_after) = limiter.check(auth.user_id) {
        tracing::warn!(
            user_id = %auth.user_id,
            limit = limiter.rate_limit_per_minute(),
            "Rate limit exceeded"
        );
        return rate_limited_response(retry_after);
    }

    next.run(req).await
}

fn rate_limited_response(retry_after: u64) -> Response {
    let mut response = ApiError::RateLimited.into_response();
    if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}
