//! 结构化日志初始化

use crate::{config::LoggingConfig, error::AppError};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 日志输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 每个事件一行 JSON，附带当前 http_request span 的 request_id / trace_id
    Json,
    /// 多行可读格式（开发环境）
    Pretty,
}

impl LogFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "pretty" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// 未设置 RUST_LOG 时的过滤指令：sqlx 每条查询都打 info，压到 warn
fn default_directives(level: &str) -> String {
    format!("{},sqlx=warn", level.to_ascii_lowercase())
}

/// 初始化全局 tracing subscriber，只能成功一次
pub fn init_telemetry(config: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match LogFormat::parse(&config.format).unwrap_or(LogFormat::Json) {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
    };

    installed.map_err(|e| AppError::Internal(format!("logging already initialised: {}", e)))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "Logging ready"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse("xml"), None);
    }

    #[test]
    fn test_default_directives_quiet_sqlx() {
        let directives = default_directives("DEBUG");
        assert_eq!(directives, "debug,sqlx=warn");
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
