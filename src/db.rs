//! PostgreSQL 连接池与迁移

use crate::{config::DatabaseConfig, error::AppError};
use secrecy::ExposeSecret;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

/// 由配置构建连接池参数（不连接）
pub fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .test_before_acquire(true)
}

/// 连接数据库并执行迁移，返回可交给 `AppState::with_postgres` 的连接池
pub async fn connect_and_migrate(config: &DatabaseConfig) -> Result<PgPool, AppError> {
    let pool = pool_options(config)
        .connect(config.url.expose_secret())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Could not connect to the post database");
            AppError::Database(e)
        })?;

    tracing::info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Post database connected"
    );

    run_migrations(&pool).await?;

    Ok(pool)
}

/// 执行 migrations/ 下的迁移（users、posts、refresh_tokens）
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Schema migration failed");
            AppError::Database(e.into())
        })?;

    tracing::info!("Schema up to date");
    Ok(())
}
