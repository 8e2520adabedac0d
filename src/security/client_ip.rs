//! Caller address resolution.
//!
//! Forwarding headers are believed only when the socket peer is a trusted
//! proxy (`security.trusted_proxies`, loopback by default). They are then
//! consulted in order (first hop only), skipping `unknown`. Otherwise the
//! peer address is the caller.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

use crate::security::allow_list::AllowList;

/// Address reported when nothing identifies the caller.
pub const UNKNOWN_IP: &str = "unknown";

const FORWARDING_HEADERS: [&str; 4] = [
    "x-forwarded-for",
    "proxy-client-ip",
    "wl-proxy-client-ip",
    "x-real-ip",
];

/// Peers allowed to report the caller through forwarding headers. Installed
/// as a request extension; without it no peer is trusted.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(Arc<AllowList>);

impl TrustedProxies {
    pub fn new(proxies: AllowList) -> Self {
        Self(Arc::new(proxies))
    }

    pub fn trusts(&self, peer: &str) -> bool {
        self.0.is_allowed(peer)
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    FORWARDING_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(UNKNOWN_IP))
            .map(str::to_owned)
    })
}

/// Resolve the caller address from headers and the connection peer.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trusted: &TrustedProxies,
) -> String {
    let Some(peer) = peer.map(|addr| addr.ip().to_canonical().to_string()) else {
        return UNKNOWN_IP.to_owned();
    };
    if trusted.trusts(&peer) {
        if let Some(forwarded) = forwarded_ip(headers) {
            return forwarded;
        }
    }
    peer
}

/// Extractor yielding the resolved caller address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let trusted = parts
            .extensions
            .get::<TrustedProxies>()
            .cloned()
            .unwrap_or_default();
        Ok(ClientIp(resolve_client_ip(&parts.headers, peer, &trusted)))
    }
}
