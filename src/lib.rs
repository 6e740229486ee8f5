//! 帖子服务库
//! 认证核心（密码哈希、访问令牌、刷新令牌、API Key、授权）与 HTTP 服务

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod telemetry;
