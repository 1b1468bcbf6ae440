//! JWT token utilities using RS256 algorithm.
//!
//! Access and refresh tokens carry the user ID as subject and a random JTI.
//! The JTI is what session rows are keyed on (hashed), which is how refresh
//! rotation and logout revoke a token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    /// JWT ID, used to find the backing session
    pub jti: String,
    pub token_type: TokenType,
}

impl Claims {
    /// Parses the subject as a user ID.
    pub fn user_id(&self) -> Result<Uuid, JwtError> {
        Uuid::parse_str(&self.sub).map_err(|_| JwtError::InvalidToken)
    }
}

/// Type of JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// A freshly issued token together with its JTI.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
}

/// Signing/verification keys and token lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    /// Clock skew tolerance in seconds
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl JwtConfig {
    /// Creates a config from an RSA key pair in PEM format.
    ///
    /// Literal `\n` sequences in the keys are turned into newlines so keys can
    /// be passed through single-line environment variables.
    pub fn from_rsa_pem(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let private_key = normalize_pem(private_key_pem);
        let public_key = normalize_pem(public_key_pem);

        let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            algorithm: Algorithm::RS256,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Creates an HS256 config from a shared secret. Only for tests.
    pub fn from_secret_for_testing(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm: Algorithm::HS256,
            access_token_expiry_secs: 900,
            refresh_token_expiry_secs: 604800,
            leeway_secs: 0,
        }
    }

    pub fn generate_access_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.generate_token(user_id, TokenType::Access, self.access_token_expiry_secs)
    }

    pub fn generate_refresh_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.generate_token(user_id, TokenType::Refresh, self.refresh_token_expiry_secs)
    }

    fn generate_token(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        expiry_secs: i64,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken { token, jti })
    }

    /// Validates signature and expiry, returning the claims.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, JwtError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(JwtError::InvalidToken);
        }
        Ok(claims)
    }
}

fn normalize_pem(key: &str) -> String {
    key.trim_matches('"').trim_matches('\'').replace("\\n", "\n")
}
