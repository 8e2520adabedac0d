//! Skeleton API library: nested call tracing, IP allow-list guards and a
//! holiday CRUD service wired together over Axum.

pub mod config;
pub mod error;
pub mod holiday;
pub mod http;
pub mod inspect;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod trace;

pub use config::schema::AppConfig;
pub use error::{AppError, ErrorCode};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
