//! Authentication repository (刷新令牌数据访问)

use super::{RefreshTokenStore, RepoError};
use crate::models::auth::RefreshToken;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct AuthRepository {
    db: PgPool,
}

impl AuthRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenStore for AuthRepository {
    /// 存储刷新令牌（token 列为主键，重复时返回 Conflict）
    async fn create_refresh_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<RefreshToken, RepoError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, NOW(), NOW(), $3, NULL)
            RETURNING *
            "#,
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(&self.db)
        .await?;

        Ok(row)
    }

    /// 按令牌精确查找
    async fn get_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, RepoError> {
        let row = sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.db)
            .await?;

        Ok(row)
    }

    /// 撤销刷新令牌
    async fn set_revoked(&self, token: &str, at: DateTime<Utc>) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, updated_at = $2 WHERE token = $1 AND revoked_at IS NULL",
        )
        .bind(token)
        .bind(at)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
