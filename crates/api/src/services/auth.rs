//! Authentication service for user registration, login, and token management.

use chrono::{Duration, Utc};
use persistence::repositories::{SessionRepository, UserRepository};
use shared::crypto::sha256_hex;
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{check_password_strength, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Session not found")]
    SessionNotFound,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Tokens handed to the client after login, registration or refresh.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Result of a successful authentication.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: domain::models::User,
    pub tokens: TokenPair,
}

/// Issued tokens plus the JTI hashes stored on the session.
struct IssuedPair {
    tokens: TokenPair,
    token_hash: String,
    refresh_hash: String,
}

/// Authentication service.
pub struct AuthService {
    users: UserRepository,
    sessions: SessionRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
            jwt,
        }
    }

    /// Register a new user with email and password.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<AuthResult, AuthError> {
        check_password_strength(password).map_err(AuthError::WeakPassword)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;

        let user = match self
            .users
            .create(email, &password_hash, display_name.trim())
            .await
        {
            Ok(user) => user,
            // Concurrent registration with the same email
            Err(sqlx::Error::Database(db_err)) if db_err.code().as_deref() == Some("23505") => {
                return Err(AuthError::EmailAlreadyExists)
            }
            Err(e) => return Err(e.into()),
        };

        let tokens = self.start_session(user.id).await?;
        info!(user_id = %user.id, "User registered");

        Ok(AuthResult {
            user: user.into(),
            tokens,
        })
    }

    /// Login with email and password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResult, AuthError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let now = Utc::now();
        self.users.update_last_login(user.id, now).await?;

        let tokens = self.start_session(user.id).await?;
        info!(user_id = %user.id, "User logged in");

        let mut user: domain::models::User = user.into();
        user.last_login_at = Some(now);
        Ok(AuthResult { user, tokens })
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The presented refresh token is invalidated (rotation).
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let (user_id, jti_hash) = self.decode_refresh(refresh_token)?;

        let session = self
            .sessions
            .find_by_refresh_hash(&jti_hash, user_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.expires_at < Utc::now() {
            self.sessions.delete(session.id).await?;
            return Err(AuthError::InvalidRefreshToken);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let issued = self.issue(user_id)?;
        let rotated = self
            .sessions
            .rotate(
                session.id,
                &jti_hash,
                &issued.token_hash,
                &issued.refresh_hash,
                self.session_expiry(),
            )
            .await?;
        if !rotated {
            return Err(AuthError::SessionNotFound);
        }

        debug!(user_id = %user_id, "Session rotated");
        Ok(issued.tokens)
    }

    /// Invalidate the session behind a refresh token, or every session of the
    /// user when `all_devices` is set.
    pub async fn logout(&self, refresh_token: &str, all_devices: bool) -> Result<(), AuthError> {
        let (user_id, jti_hash) = self.decode_refresh(refresh_token)?;

        if all_devices {
            let revoked = self.sessions.delete_all_for_user(user_id).await?;
            info!(user_id = %user_id, revoked, "Logged out of all sessions");
        } else if !self.sessions.delete_by_refresh_hash(&jti_hash, user_id).await? {
            debug!(user_id = %user_id, "Session not found during logout, may already be logged out");
        } else {
            info!(user_id = %user_id, "Logged out");
        }

        Ok(())
    }

    fn decode_refresh(&self, refresh_token: &str) -> Result<(Uuid, String), AuthError> {
        let claims = self
            .jwt
            .validate_refresh_token(refresh_token)
            .map_err(|e| match e {
                JwtError::TokenExpired | JwtError::InvalidToken | JwtError::DecodingError(_) => {
                    AuthError::InvalidRefreshToken
                }
                other => AuthError::Token(other),
            })?;
        let user_id = claims
            .user_id()
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        Ok((user_id, sha256_hex(&claims.jti)))
    }

    fn issue(&self, user_id: Uuid) -> Result<IssuedPair, AuthError> {
        let access = self.jwt.generate_access_token(user_id)?;
        let refresh = self.jwt.generate_refresh_token(user_id)?;

        Ok(IssuedPair {
            token_hash: sha256_hex(&access.jti),
            refresh_hash: sha256_hex(&refresh.jti),
            tokens: TokenPair {
                access_token: access.token,
                refresh_token: refresh.token,
                expires_in: self.jwt.access_token_expiry_secs,
            },
        })
    }

    fn session_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::seconds(self.jwt.refresh_token_expiry_secs)
    }

    async fn start_session(&self, user_id: Uuid) -> Result<TokenPair, AuthError> {
        let issued = self.issue(user_id)?;
        self.sessions
            .create(
                user_id,
                &issued.token_hash,
                &issued.refresh_hash,
                self.session_expiry(),
            )
            .await?;
        Ok(issued.tokens)
    }
}
