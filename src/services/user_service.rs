//! 用户服务：注册、更新凭据、订阅升级

use crate::{
    auth::{jwt::Identity, password::PasswordHasher},
    config::SecurityConfig,
    error::AppError,
    models::{auth::WebhookEvent, user::*},
    repository::{RepoError, UserStore},
};
use std::sync::Arc;
use validator::Validate;

/// 触发订阅升级的 webhook 事件名
pub const UPGRADE_EVENT: &str = "user.upgraded";

/// Webhook 处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    Upgraded,
    Ignored,
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    config: SecurityConfig,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, config: &SecurityConfig) -> Result<Self, AppError> {
        Ok(Self {
            users,
            hasher: PasswordHasher::from_config(config)?,
            config: config.clone(),
        })
    }

    /// 注册用户
    pub async fn register(&self, req: CreateUserRequest) -> Result<UserResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::validation(&e.to_string()))?;
        PasswordHasher::validate_password_policy(&req.password, &self.config)?;

        let password_hash = self.hasher.hash_blocking(req.password).await?;

        let user = self
            .users
            .create_user(&req.email, &password_hash)
            .await
            .map_err(email_conflict)?;

        tracing::info!(user_id = %user.id, "User created");

        Ok(UserResponse::from(user))
    }

    /// 更新当前用户的邮箱和密码
    pub async fn update_credentials(
        &self,
        identity: &Identity,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, AppError> {
        req.validate()
            .map_err(|e| AppError::validation(&e.to_string()))?;
        PasswordHasher::validate_password_policy(&req.password, &self.config)?;

        let password_hash = self.hasher.hash_blocking(req.password).await?;

        // 令牌有效但用户已不存在：按未认证处理
        let user = self
            .users
            .update_credentials(identity.user_id(), &req.email, &password_hash)
            .await
            .map_err(email_conflict)?
            .ok_or(AppError::Unauthorized)?;

        tracing::info!(user_id = %user.id, "User credentials updated");

        Ok(UserResponse::from(user))
    }

    /// 处理计费方的 webhook 事件
    pub async fn apply_webhook(&self, event: WebhookEvent) -> Result<WebhookOutcome, AppError> {
        if event.event != UPGRADE_EVENT {
            tracing::debug!(event = %event.event, "Ignoring webhook event");
            return Ok(WebhookOutcome::Ignored);
        }

        if !self.users.set_subscribed(event.data.user_id, true).await? {
            return Err(AppError::not_found("user"));
        }

        tracing::info!(user_id = %event.data.user_id, "User upgraded");

        Ok(WebhookOutcome::Upgraded)
    }
}

fn email_conflict(e: RepoError) -> AppError {
    match e {
        RepoError::Conflict(_) => AppError::Conflict("Email already registered".to_string()),
        other => other.into(),
    }
}
