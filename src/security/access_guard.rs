//! Allow-list enforcement for protected operations.
//!
//! `check` decides before the protected body runs. Denials surface as
//! `AppError::UnauthorizedIp` carrying the rejected address.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::error::{AppError, Result};
use crate::observability::metrics;
use crate::security::allow_list::AllowList;
use crate::security::client_ip::ClientIp;

#[derive(Debug, Clone)]
pub struct AccessGuard {
    allowed: Arc<AllowList>,
}

impl AccessGuard {
    pub fn new(allowed: AllowList) -> Self {
        Self {
            allowed: Arc::new(allowed),
        }
    }

    /// Guard over `configured` plus the always-allowed `defaults`.
    pub fn with_defaults(configured: &AllowList, defaults: &AllowList) -> Self {
        Self::new(configured.merged(defaults))
    }

    pub fn allowed(&self) -> &AllowList {
        &self.allowed
    }

    pub fn check(&self, client_ip: &str) -> Result<()> {
        tracing::debug!(client_ip = %client_ip, "# ==> Check allowed ips...");

        if self.allowed.is_allowed(client_ip) {
            return Ok(());
        }

        tracing::warn!(client_ip = %client_ip, "Unauthorized IP rejected");
        metrics::record_access_denied();
        Err(AppError::UnauthorizedIp(client_ip.to_owned()))
    }

    /// Run `call` only if `client_ip` is allowed.
    pub fn guard<T>(&self, client_ip: &str, call: impl FnOnce() -> Result<T>) -> Result<T> {
        self.check(client_ip)?;
        call()
    }
}

/// Route-level guard: `middleware::from_fn_with_state(guard, check_ip_middleware)`.
pub async fn check_ip_middleware(
    State(guard): State<AccessGuard>,
    ClientIp(client_ip): ClientIp,
    request: Request<Body>,
    next: Next,
) -> Result<Response> {
    guard.check(&client_ip)?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn guard() -> AccessGuard {
        AccessGuard::with_defaults(
            &AllowList::from_patterns(["10.0.0.0/8", "192.168.*.*"]),
            &AllowList::loopback(),
        )
    }

    #[test]
    fn test_allowed_runs_body() {
        let ran = Cell::new(0);
        let result = guard().guard("10.20.30.40", || {
            ran.set(ran.get() + 1);
            Ok("done")
        });
        assert_eq!(result.unwrap(), "done");
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn test_denied_never_runs_body() {
        let ran = Cell::new(0);
        let result = guard().guard("8.8.8.8", || {
            ran.set(ran.get() + 1);
            Ok(())
        });
        match result {
            Err(AppError::UnauthorizedIp(ip)) => assert_eq!(ip, "8.8.8.8"),
            other => panic!("expected UnauthorizedIp, got {other:?}"),
        }
        assert_eq!(ran.get(), 0);
    }

    #[test]
    fn test_loopback_default() {
        assert!(guard().check("127.0.0.1").is_ok());
        assert!(guard().check("::1").is_ok());
        assert!(AccessGuard::new(AllowList::default()).check("127.0.0.1").is_err());
    }
}
