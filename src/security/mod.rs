//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs (resolve caller from the peer, or X-Forwarded-For
//!       when the peer is a trusted proxy)
//!     → access_guard.rs (reject callers outside the allow list)
//!         → allow_list.rs (exact / wildcard / CIDR / `*` matching)
//!     → Pass to handler
//! ```
//!
//! # Design Decisions
//! - Fail closed: malformed entries never match
//! - Allow lists are immutable after startup and shared via Arc
//! - Loopback addresses come from configuration defaults, not code

pub mod access_guard;
pub mod allow_list;
pub mod client_ip;

pub use access_guard::{check_ip_middleware, AccessGuard};
pub use allow_list::{is_allowed, AllowList, AllowListEntry};
pub use client_ip::{resolve_client_ip, ClientIp, TrustedProxies, UNKNOWN_IP};
