//! JWT access token issuance and validation
//! Access tokens are stateless; only their short lifetime limits a leaked token.

use crate::{
    config::AppConfig,
    error::{AppError, AuthError},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,

    /// Issuer
    pub iss: String,
}

/// An identity whose access token has passed validation.
///
/// Only [`JwtService::validate`] hands these out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    user_id: Uuid,
}

impl Identity {
    pub(crate) fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }
}

/// Convert a configured lifetime in seconds, refusing values chrono cannot represent
pub(crate) fn ttl_from_secs(name: &str, secs: u64) -> Result<Duration, AppError> {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .ok_or_else(|| AppError::Config(format!("{} out of range: {}", name, secs)))
}

/// JWT service
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_token_ttl: Duration,
    refreshed_access_token_ttl: Duration,
}

impl JwtService {
    /// Create JWT service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let secret = config.security.jwt_secret.expose_secret();

        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(AppError::Config("JWT secret too short (min 32 chars)".to_string()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: config.security.jwt_issuer.clone(),
            access_token_ttl: ttl_from_secs(
                "access_token_exp_secs",
                config.security.access_token_exp_secs,
            )?,
            refreshed_access_token_ttl: ttl_from_secs(
                "refreshed_access_token_exp_secs",
                config.security.refreshed_access_token_exp_secs,
            )?,
        })
    }

    /// Lifetime of tokens minted at login, in seconds
    pub fn access_token_ttl_secs(&self) -> u64 {
        self.access_token_ttl.num_seconds() as u64
    }

    /// Sign a token for `user_id` that expires `ttl` from now
    pub fn issue(&self, user_id: Uuid, ttl: Duration) -> Result<String, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::Internal("access token ttl must be positive".to_string()));
        }

        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Internal("access token expiry out of range".to_string()))?;
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: self.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode access token: {:?}", e);
            AuthError::Internal(format!("Failed to encode access token: {}", e))
        })
    }

    /// Token handed out by a successful login
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, self.access_token_ttl)
    }

    /// Token handed out when a refresh token is redeemed
    pub fn issue_refreshed_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, self.refreshed_access_token_ttl)
    }

    /// Validate a token and return the identity it carries.
    ///
    /// The signature is checked before any claim is looked at.
    pub fn validate(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            tracing::debug!("Token validation failed: {:?}", e.kind());
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidIssuer => AuthError::Unauthorized,
                _ => AuthError::Malformed,
            }
        })?;

        let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AuthError::Malformed)?;

        Ok(Identity::new(user_id))
    }
}
