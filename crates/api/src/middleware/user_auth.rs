//! User JWT authentication middleware.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::extractors::UserAuth;

/// Middleware that requires a valid Bearer access token.
///
/// The authenticated user is stored in request extensions, where the rate
/// limiter and the `UserAuth` extractor pick it up.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.jwt, req.headers()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => e.into_response(),
    }
}
