//! 认证服务：登录、令牌刷新、令牌撤销

use crate::{
    auth::{jwt::JwtService, password::PasswordHasher, refresh::RefreshTokenManager},
    config::SecurityConfig,
    error::{AppError, AuthError},
    models::{auth::*, user::UserResponse},
    repository::{RefreshTokenStore, UserStore},
};
use std::sync::Arc;

// 未知邮箱登录时也做一次哈希校验，使其耗时与密码错误一致
const TIMING_DUMMY_PASSWORD: &str = "timing-equalizer-not-a-real-password";

pub struct AuthService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    jwt_service: Arc<JwtService>,
    refresh_tokens: RefreshTokenManager,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        jwt_service: Arc<JwtService>,
        config: &SecurityConfig,
    ) -> Result<Self, AppError> {
        let hasher = PasswordHasher::from_config(config)?;
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD)?;

        Ok(Self {
            users,
            refresh_tokens: RefreshTokenManager::new(refresh_store, jwt_service.clone(), config)?,
            hasher,
            jwt_service,
            dummy_hash,
        })
    }

    /// 用户登录
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        let user = match self.users.get_user_by_email(&req.email).await? {
            Some(user) => user,
            None => {
                let _ = self
                    .hasher
                    .verify_blocking(req.password, self.dummy_hash.clone())
                    .await;
                tracing::debug!("Login rejected: unknown account");
                return Err(AuthError::NotFound.into());
            }
        };

        // 验证密码
        let matches = self
            .hasher
            .verify_blocking(req.password, user.password_hash.clone())
            .await
            .map_err(AuthError::from)?;
        if !matches {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::Unauthorized.into());
        }

        // 生成令牌
        let token = self.jwt_service.issue_access_token(user.id)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            user: UserResponse::from(user),
            token,
            refresh_token,
            expires_in: self.jwt_service.access_token_ttl_secs(),
        })
    }

    /// 用刷新令牌换取新的访问令牌（刷新令牌本身不轮换）
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, AppError> {
        let redeemed = self.refresh_tokens.redeem(refresh_token).await?;

        tracing::debug!(user_id = %redeemed.user_id, "Access token refreshed");

        Ok(RefreshResponse {
            token: redeemed.access_token,
        })
    }

    /// 撤销刷新令牌
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        self.refresh_tokens.revoke(refresh_token).await?;
        Ok(())
    }
}
