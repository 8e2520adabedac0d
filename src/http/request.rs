//! Request-scoped context.
//!
//! # Responsibilities
//! - Open a trace scope per request, seeded with its request id
//! - Expose the request id header name shared with tower-http layers
//!
//! # Design Decisions
//! - Request ID is assigned by `SetRequestIdLayer` before this runs, so
//!   every call-tree line of a request carries the same id
//! - The scope is task-local, so nested spans survive await points

use axum::{body::Body, http::Request, middleware::Next, response::Response};

use crate::trace::with_trace_scope;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Read the request id header, if present and valid UTF-8.
pub fn request_id<B>(request: &Request<B>) -> Option<String> {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

pub async fn trace_scope_middleware(request: Request<Body>, next: Next) -> Response {
    let seed = request_id(&request);
    with_trace_scope(seed, next.run(request)).await
}
