//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id → trace scope)
//!     → [route guard: security::check_ip_middleware] (write routes)
//!     → holiday::handlers (controller operations via the registry)
//!     → response.rs (envelope, error translation)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{trace_scope_middleware, X_REQUEST_ID};
pub use response::{ApiResource, Meta};
pub use server::{AppState, HttpServer};
