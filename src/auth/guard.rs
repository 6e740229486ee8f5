//! Resource ownership check
//!
//! `Unauthorized` means the caller's identity could not be established;
//! `Forbidden` means it was, and that identity does not own the resource.

use crate::{auth::jwt::Identity, error::AuthError};
use uuid::Uuid;

/// Allow the operation only if `identity` owns the resource.
pub fn authorize_owner(identity: &Identity, owner_id: Uuid) -> Result<(), AuthError> {
    if identity.user_id() == owner_id {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %identity.user_id(),
            %owner_id,
            "Ownership check failed"
        );
        Err(AuthError::Forbidden)
    }
}
