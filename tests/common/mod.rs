//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, Response},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use skeleton_api::config::{parse_config, AppConfig};
use skeleton_api::HttpServer;

pub const ALLOWED_IP: &str = "127.0.0.1";
pub const DENIED_IP: &str = "203.0.113.9";

/// Socket peer of every request unless overridden: a proxy on the same host,
/// trusted by default to forward the caller address.
pub const LOCAL_PROXY: &str = "127.0.0.1:40000";

/// Router built from the default config.
pub fn app() -> Router {
    HttpServer::new(AppConfig::default()).router()
}

/// Router built from inline TOML.
pub fn app_with(toml: &str) -> Router {
    let config = parse_config(toml).expect("test config should parse");
    HttpServer::new(config).router()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", ALLOWED_IP)
        .extension(peer(LOCAL_PROXY))
        .body(Body::empty())
        .unwrap()
}

pub fn peer(addr: &str) -> ConnectInfo<SocketAddr> {
    ConnectInfo(addr.parse().unwrap())
}

pub fn send_json(method: &str, uri: &str, from: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-forwarded-for", from)
        .extension(peer(LOCAL_PROXY))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn call(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
