use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::{ComposeError, ExportError, SchemaErrors};
use serde::Serialize;
use shared::pagination::CursorError;
use thiserror::Error;

use crate::services::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Validation failure with per-field details.
    #[error("Validation error: {message}")]
    InvalidFields {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Rate limited")]
    RateLimited,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ApiError {
    fn invalid_fields(details: Vec<ValidationDetail>) -> Self {
        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };
        ApiError::InvalidFields { message, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "validation_error", msg, None)
            }
            ApiError::InvalidFields { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
                None,
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => ApiError::Conflict("Resource already exists".into()),
                Some("23503") => ApiError::NotFound("Referenced resource not found".into()),
                _ => ApiError::Internal(format!("Database error: {}", db_err)),
            },
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::invalid_fields(details)
    }
}

impl From<SchemaErrors> for ApiError {
    fn from(errors: SchemaErrors) -> Self {
        ApiError::invalid_fields(
            errors
                .0
                .into_iter()
                .map(|e| ValidationDetail {
                    field: e.field,
                    message: e.message,
                })
                .collect(),
        )
    }
}

impl From<ComposeError> for ApiError {
    fn from(err: ComposeError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<CursorError> for ApiError {
    fn from(err: CursorError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword(msg) => ApiError::Validation(msg),
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::SessionNotFound => ApiError::Unauthorized(err.to_string()),
            AuthError::UserDisabled => ApiError::Forbidden(err.to_string()),
            AuthError::Database(e) => e.into(),
            AuthError::Token(_) | AuthError::Password(_) => ApiError::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use domain::services::FieldError;
    use validator::Validate;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::Conflict("test".to_string()).to_string(),
            "Conflict: test"
        );
        assert_eq!(ApiError::RateLimited.to_string(), "Rate limited");
    }

    #[tokio::test]
    async fn test_internal_error_hides_message() {
        let (_, body) = body_json(ApiError::Internal("password=hunter2".into())).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_schema_errors_carry_details() {
        let errors = SchemaErrors(vec![
            FieldError {
                question_id: None,
                field: "Valor".to_string(),
                message: "Must be a number".to_string(),
            },
            FieldError {
                question_id: None,
                field: "Banco".to_string(),
                message: "An option must be selected".to_string(),
            },
        ]);

        let (status, body) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], "2 validation errors");
        assert_eq!(body["details"][0]["field"], "Valor");
        assert_eq!(body["details"][1]["message"], "An option must be selected");
    }

    #[tokio::test]
    async fn test_validator_errors_carry_details() {
        let request = domain::models::organization::CreateOrganizationRequest {
            name: "   ".to_string(),
        };
        let errors = request.validate().unwrap_err();

        let (status, body) = body_json(errors.into()).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"][0]["field"], "name");
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn test_from_compose_error() {
        let error: ApiError = ComposeError::Empty.into();
        assert!(matches!(error, ApiError::Validation(_)));
    }

    #[test]
    fn test_from_auth_error() {
        assert!(matches!(
            ApiError::from(AuthError::EmailAlreadyExists),
            ApiError::Conflict(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from(AuthError::UserDisabled),
            ApiError::Forbidden(_)
        ));
    }
}
