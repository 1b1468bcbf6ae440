//! Request tracing middleware.
//!
//! Provides request ID extraction and generation for log correlation.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest client-supplied request ID that is kept.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Middleware that extracts or generates a request ID.
///
/// A usable `X-Request-ID` header is kept, otherwise a UUID v4 is generated.
/// The ID is stored in request extensions, recorded on the request span and
/// echoed on the response.
pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(sanitize_request_id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), header_value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Accepts short visible-ASCII IDs only.
fn sanitize_request_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let usable = !trimmed.is_empty()
        && trimmed.len() <= MAX_REQUEST_ID_LEN
        && trimmed.chars().all(|c| c.is_ascii_graphic());
    usable.then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_reasonable_ids() {
        assert_eq!(
            sanitize_request_id("req-123_abc.xyz").as_deref(),
            Some("req-123_abc.xyz")
        );
        assert_eq!(
            sanitize_request_id(" 550e8400-e29b-41d4-a716-446655440000 ").as_deref(),
            Some("550e8400-e29b-41d4-a716-446655440000")
        );
    }

    #[test]
    fn test_sanitize_rejects_garbage() {
        assert_eq!(sanitize_request_id(""), None);
        assert_eq!(sanitize_request_id("has space"), None);
        assert_eq!(sanitize_request_id(&"a".repeat(129)), None);
    }
}
