//! Shared-secret API key gate for privileged (webhook) callers

use crate::error::AuthError;
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Validates a supplied API key against the configured secret.
///
/// Both values are run through HMAC-SHA256 under a per-process random key and
/// the tags are compared with `verify_slice`, so the comparison time does not
/// depend on where (or whether) the strings differ, nor on their lengths.
pub struct ApiKeyGate {
    mac_key: [u8; 32],
    expected_tag: Option<Vec<u8>>,
}

impl ApiKeyGate {
    /// Build the gate. A missing or empty secret yields a gate that rejects everything.
    pub fn new(configured: Option<&Secret<String>>) -> Self {
        let mut mac_key = [0u8; 32];
        OsRng.fill_bytes(&mut mac_key);

        let expected_tag = configured
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
            .and_then(|s| Self::tag(&mac_key, s));

        if expected_tag.is_none() {
            tracing::warn!("No webhook API key configured; privileged calls will be rejected");
        }

        Self {
            mac_key,
            expected_tag,
        }
    }

    /// Generate a new random key suitable for configuration (64 hex chars)
    pub fn generate_key() -> String {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    fn mac(mac_key: &[u8], value: &str) -> Option<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(mac_key).ok()?;
        mac.update(value.as_bytes());
        Some(mac)
    }

    fn tag(mac_key: &[u8], value: &str) -> Option<Vec<u8>> {
        Self::mac(mac_key, value).map(|m| m.finalize().into_bytes().to_vec())
    }

    /// Check a supplied key. Every failure is `Unauthorized`.
    pub fn check(&self, supplied: &str) -> Result<(), AuthError> {
        let expected = self.expected_tag.as_ref().ok_or(AuthError::Unauthorized)?;
        let mac = Self::mac(&self.mac_key, supplied).ok_or(AuthError::Unauthorized)?;

        mac.verify_slice(expected).map_err(|_| AuthError::Unauthorized)
    }
}
