//! User JWT authentication extractor.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use shared::jwt::JwtConfig;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated user information from the access token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the JWT subject claim.
    pub user_id: Uuid,
    /// JWT ID (jti) of the access token.
    pub jti: String,
}

impl UserAuth {
    /// Validates the Bearer token of a request.
    pub fn from_headers(jwt: &JwtConfig, headers: &HeaderMap) -> Result<Self, ApiError> {
        let auth_header = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = jwt.validate_access_token(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

        let user_id = claims
            .user_id()
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(UserAuth {
            user_id,
            jti: claims.jti,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Already validated by require_user_auth
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }

        UserAuth::from_headers(&state.jwt, &parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn jwt() -> JwtConfig {
        JwtConfig::from_secret_for_testing("user_auth_extractor_test_secret")
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_valid_access_token() {
        let jwt = jwt();
        let user_id = Uuid::new_v4();
        let issued = jwt.generate_access_token(user_id).unwrap();

        let auth = UserAuth::from_headers(&jwt, &bearer(&issued.token)).unwrap();

        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.jti, issued.jti);
    }

    #[test]
    fn test_missing_header() {
        let result = UserAuth::from_headers(&jwt(), &HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_basic_scheme_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let result = UserAuth::from_headers(&jwt(), &headers);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_token_rejected() {
        let jwt = jwt();
        let issued = jwt.generate_refresh_token(Uuid::new_v4()).unwrap();
        let result = UserAuth::from_headers(&jwt, &bearer(&issued.token));
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
}
