//! Database repository layer
//!
//! 业务层只依赖这里定义的存储 trait，生产环境使用 PostgreSQL 实现，
//! 测试和本地运行使用内存实现。

pub mod auth_repo;
pub mod memory;
pub mod post_repo;
pub mod user_repo;

pub use auth_repo::*;
pub use memory::*;
pub use post_repo::*;
pub use user_repo::*;

use crate::models::{auth::RefreshToken, post::Post, user::User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 存储层错误
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    /// 唯一约束冲突（与其他写入失败区分开）
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return RepoError::Conflict(
                    db_err.constraint().unwrap_or("unique").to_string(),
                );
            }
        }
        RepoError::Database(e)
    }
}

/// 用户存储
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, RepoError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError>;

    /// 更新邮箱与密码哈希，用户不存在时返回 None
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<User>, RepoError>;

    /// 设置订阅标记，返回是否命中用户
    async fn set_subscribed(&self, id: Uuid, subscribed: bool) -> Result<bool, RepoError>;
}

/// 刷新令牌存储
///
/// 每个方法都是单行原子操作：插入、按令牌查询、按令牌条件更新。
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// 插入新令牌；令牌重复时返回 [`RepoError::Conflict`]
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, RepoError>;

    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, RepoError>;

    /// 仅当 revoked_at 为空时写入撤销时间，返回是否有行被更新
    async fn set_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, RepoError>;
}

/// 帖子存储
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert_post(&self, user_id: Uuid, body: &str) -> Result<Post, RepoError>;

    async fn list_posts(&self, author_id: Option<Uuid>) -> Result<Vec<Post>, RepoError>;

    async fn get_post(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    async fn delete_post(&self, id: Uuid) -> Result<bool, RepoError>;
}
