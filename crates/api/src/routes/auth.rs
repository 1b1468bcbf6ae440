//! Authentication routes for user registration, login, and token management.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::services::auth::{AuthResult, AuthService, TokenPair};

/// Request body for user registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Strength rules are checked by the auth service.
    #[validate(length(min = 1, max = 128, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be 1-100 characters"))]
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    pub display_name: String,
}

/// Request body for login.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request body for refresh.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for logout.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LogoutRequest {
    pub refresh_token: String,
    #[serde(default)]
    pub all_devices: bool,
}

/// Token information in responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TokensResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl From<TokenPair> for TokensResponse {
    fn from(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
        }
    }
}

/// Response body for register and login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokensResponse,
}

impl From<AuthResult> for AuthResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user,
            tokens: result.tokens.into(),
        }
    }
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

/// Register a new user with email and password.
///
/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let result = auth_service(&state)
        .register(&request.email, &request.password, &request.display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Login with email and password.
///
/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let result = auth_service(&state)
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(result.into()))
}

/// Exchange a refresh token for a new token pair.
///
/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<RefreshRequest>,
) -> Result<Json<TokensResponse>, ApiError> {
    let tokens = auth_service(&state).refresh(&request.refresh_token).await?;
    Ok(Json(tokens.into()))
}

/// Revoke the session behind a refresh token.
///
/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LogoutRequest>,
) -> Result<StatusCode, ApiError> {
    auth_service(&state)
        .logout(&request.refresh_token, request.all_devices)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
