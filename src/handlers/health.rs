//! 健康检查处理器
//! 提供 /api/healthz 和 /ready 端点

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use sqlx::PgPool;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crate::middleware::AppState;

/// 对外展示的数据库故障信息（具体错误只写日志）
const DATABASE_UNAVAILABLE: &str = "database unavailable";

/// 就绪探针响应
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub version: String,
    pub uptime_secs: u64,
    pub checks: Vec<HealthCheck>,
}

/// 健康检查项
#[derive(Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

static APP_START_TIME: OnceLock<Instant> = OnceLock::new();

/// 设置应用启动时间（main 中调用一次）
pub fn set_start_time() {
    let _ = APP_START_TIME.set(Instant::now());
}

/// 获取应用运行时间（秒）
pub fn get_uptime() -> u64 {
    APP_START_TIME
        .get()
        .map_or(0, |start| start.elapsed().as_secs())
}

/// 存活探针
/// 快速响应，不检查依赖
pub async fn health_check() -> &'static str {
    "OK"
}

/// 就绪探针
/// 检查数据库等依赖
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let mut checks = Vec::new();

    if let Some(pool) = &state.db {
        checks.push(database_check(pool).await);
    }

    let all_healthy = checks.iter().all(|c| c.status == "healthy");
    let status = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(ReadinessResponse {
            ready: all_healthy,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: get_uptime(),
            checks,
        }),
    )
}

/// 对连接池执行 SELECT 1
async fn database_check(pool: &PgPool) -> HealthCheck {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => HealthCheck {
            name: "database".to_string(),
            status: "healthy".to_string(),
            message: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Readiness: database check failed");
            HealthCheck {
                name: "database".to_string(),
                status: "unhealthy".to_string(),
                message: Some(DATABASE_UNAVAILABLE.to_string()),
            }
        }
    }
}
