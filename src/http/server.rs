//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the operation registry from configuration
//! - Create the Axum router with the holiday API and health endpoint
//! - Wire up middleware (request id, trace scope, tracing, limits, timeout)
//! - Serve with graceful shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::holiday::handlers::{self, CONTROLLER_OPERATIONS};
use crate::holiday::service::SERVICE_OPERATIONS;
use crate::holiday::{HolidayRepository, HolidayService};
use crate::http::request::trace_scope_middleware;
use crate::http::response::ApiResource;
use crate::lifecycle::{shutdown_signal, Shutdown};
use crate::security::{check_ip_middleware, AccessGuard, TrustedProxies};
use crate::trace::{OperationRegistry, TracePolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub holidays: Arc<HolidayService>,
    pub registry: Arc<OperationRegistry>,
}

/// Declare every controller and service operation, then attach the
/// configured per-operation guards.
pub fn build_registry(config: &AppConfig) -> OperationRegistry {
    let policy = if config.trace.enabled {
        TracePolicy::new(config.trace.include.clone(), config.trace.exclude.clone())
    } else {
        TracePolicy::disabled()
    };

    let mut builder = OperationRegistry::builder(policy);
    for name in CONTROLLER_OPERATIONS.iter().chain(SERVICE_OPERATIONS.iter()) {
        builder = builder.operation(*name);
    }
    for operation in &config.operations {
        let guard = AccessGuard::with_defaults(
            &operation.allowed_ips,
            &config.security.default_allowed_ips,
        );
        builder = builder.check_ip(operation.name.clone(), guard);
    }
    builder.build()
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> ApiResource<HealthStatus> {
    ApiResource::success(HealthStatus {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// HTTP server for the holiday API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(config: AppConfig) -> Self {
        let registry = Arc::new(build_registry(&config));
        let holidays = Arc::new(HolidayService::new(
            HolidayRepository::new(),
            registry.clone(),
        ));
        let state = AppState { holidays, registry };

        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        let write_guard = AccessGuard::with_defaults(
            &config.security.allowed_ips,
            &config.security.default_allowed_ips,
        );
        let check_ip = middleware::from_fn_with_state(write_guard, check_ip_middleware);

        Router::new()
            .route("/health", get(health))
            .route("/api/holidays/{year}", get(handlers::get_by_year))
            .route(
                "/api/holidays/{year}/{month}",
                get(handlers::get_by_year_and_month),
            )
            .route(
                "/api/holidays/{year}/{month}/{day}",
                get(handlers::get_by_date),
            )
            .route(
                "/api/holidays",
                post(handlers::create).route_layer(check_ip.clone()),
            )
            .route(
                "/api/holidays/bulk",
                post(handlers::create_bulk).route_layer(check_ip.clone()),
            )
            .route(
                "/api/holidays/id/{id}",
                get(handlers::get_by_id).merge(
                    put(handlers::update)
                        .delete(handlers::delete)
                        .route_layer(check_ip),
                ),
            )
            .with_state(state)
            .layer(Extension(TrustedProxies::new(
                config.security.trusted_proxies.clone(),
            )))
            .layer(middleware::from_fn(trace_scope_middleware))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Serve on `listener` until a signal or `shutdown.trigger()`.
    ///
    /// The shutdown subscription is taken before this returns, so a trigger
    /// sent right after the call is never missed.
    pub fn run(
        self,
        listener: TcpListener,
        shutdown: &Shutdown,
    ) -> impl Future<Output = std::io::Result<()>> + Send {
        let signal = shutdown_signal(shutdown.subscribe());
        async move {
            let addr = listener.local_addr()?;
            tracing::info!(address = %addr, "HTTP server starting");

            let app = self
                .router
                .into_make_service_with_connect_info::<SocketAddr>();

            axum::serve(listener, app)
                .with_graceful_shutdown(signal)
                .await?;

            tracing::info!("HTTP server stopped");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::trace::Advice;

    #[test]
    fn test_registry_declares_every_operation() {
        let registry = build_registry(&AppConfig::default());
        for name in CONTROLLER_OPERATIONS.iter().chain(SERVICE_OPERATIONS.iter()) {
            assert!(registry.is_traced(name), "{name}");
        }
    }

    #[test]
    fn test_configured_guard_precedes_trace() {
        let config = parse_config(
            r#"
            [[operations]]
            name = "HolidayController.delete"
            allowed_ips = ["10.0.0.0/8"]
            "#,
        )
        .unwrap();
        let registry = build_registry(&config);

        let advices = registry.advices("HolidayController.delete");
        assert!(matches!(advices, [Advice::CheckIp(_), Advice::LogTrace]));
        match &advices[0] {
            Advice::CheckIp(guard) => {
                assert!(guard.allowed().is_allowed("10.1.1.1"));
                assert!(guard.allowed().is_allowed("127.0.0.1"));
                assert!(!guard.allowed().is_allowed("11.1.1.1"));
            }
            other => panic!("unexpected advice: {other:?}"),
        }
    }

    #[test]
    fn test_tracing_disabled() {
        let config = parse_config("[trace]\nenabled = false\n").unwrap();
        let registry = build_registry(&config);
        assert!(!registry.is_traced("HolidayService.find_by_id"));
    }
}
