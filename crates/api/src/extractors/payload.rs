//! Body and query extractors that reject with the API error body.

use axum::extract::{FromRequest, FromRequestParts, Query};
use axum::Json;

use crate::error::ApiError;

/// JSON request body. Malformed bodies become a `validation_error`.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Query string parameters. Malformed parameters become a `validation_error`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);
