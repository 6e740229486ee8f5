//! HTTP request handlers

pub mod auth;
pub mod health;
pub mod json;
pub mod post;
pub mod user;
pub mod webhook;

pub use json::ApiJson;
