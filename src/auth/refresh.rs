//! Refresh token issuance, redemption and revocation
//!
//! Refresh tokens are opaque random strings persisted through a
//! [`RefreshTokenStore`]. A token is issued at login, can be redeemed for a
//! new access token any number of times, and ends either revoked (explicitly)
//! or expired (by time). Neither end state can be left.

use crate::{
    auth::jwt::{ttl_from_secs, JwtService},
    config::SecurityConfig,
    error::{AppError, AuthError},
    repository::{RefreshTokenStore, RepoError},
};
use chrono::{Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::sync::Arc;
use uuid::Uuid;

/// Random bytes per token (256 bits)
const TOKEN_BYTES: usize = 32;

/// Insert attempts before a run of uniqueness conflicts is treated as a failure
const MAX_ISSUE_ATTEMPTS: usize = 3;

/// Result of a successful redeem
#[derive(Debug, Clone)]
pub struct Redeemed {
    pub user_id: Uuid,
    pub access_token: String,
}

pub struct RefreshTokenManager {
    store: Arc<dyn RefreshTokenStore>,
    jwt_service: Arc<JwtService>,
    ttl: Duration,
}

impl RefreshTokenManager {
    pub fn new(
        store: Arc<dyn RefreshTokenStore>,
        jwt_service: Arc<JwtService>,
        config: &SecurityConfig,
    ) -> Result<Self, AppError> {
        Ok(Self {
            store,
            jwt_service,
            ttl: ttl_from_secs("refresh_token_exp_secs", config.refresh_token_exp_secs)?,
        })
    }

    /// Generate a fresh token: 32 bytes from the OS RNG, hex encoded
    pub fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Persist a new refresh token for `user_id` and return the raw value
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let token = Self::generate_token();
            let expires_at = Utc::now().checked_add_signed(self.ttl).ok_or_else(|| {
                AuthError::Internal("refresh token expiry out of range".to_string())
            })?;

            match self.store.create_refresh_token(user_id, &token, expires_at).await {
                Ok(_) => {
                    tracing::debug!(%user_id, %expires_at, "Refresh token issued");
                    return Ok(token);
                }
                Err(RepoError::Conflict(constraint)) => {
                    tracing::warn!(%user_id, attempt, %constraint, "Refresh token collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AuthError::Internal(
            "could not allocate a unique refresh token".to_string(),
        ))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The refresh token itself stays valid; redeeming is repeatable until it
    /// is revoked or expires.
    pub async fn redeem(&self, token: &str) -> Result<Redeemed, AuthError> {
        let row = self
            .store
            .get_refresh_token(token)
            .await?
            .ok_or(AuthError::NotFound)?;

        if row.is_revoked() {
            tracing::debug!(user_id = %row.user_id, "Redeem of revoked refresh token");
            return Err(AuthError::Revoked);
        }

        if row.is_expired_at(Utc::now()) {
            tracing::debug!(user_id = %row.user_id, expires_at = %row.expires_at, "Redeem of expired refresh token");
            return Err(AuthError::Expired);
        }

        let access_token = self.jwt_service.issue_refreshed_access_token(row.user_id)?;

        Ok(Redeemed {
            user_id: row.user_id,
            access_token,
        })
    }

    /// Permanently revoke a refresh token.
    ///
    /// Unknown and already revoked tokens both yield `NotFound`.
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        if self.store.set_revoked(token, Utc::now()).await? {
            tracing::info!("Refresh token revoked");
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }
}
