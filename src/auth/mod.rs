//! Authentication and authorization module

pub mod api_key;
pub mod guard;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod refresh;

pub use api_key::ApiKeyGate;
pub use guard::authorize_owner;
pub use jwt::{Claims, Identity, JwtService};
pub use middleware::{
    api_key_middleware, bearer_auth_middleware, extract_api_key, extract_bearer_token,
};
pub use password::{PasswordError, PasswordHasher};
pub use refresh::{Redeemed, RefreshTokenManager};
