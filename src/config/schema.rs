//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::security::allow_list::AllowList;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Allow lists and request limits.
    pub security: SecurityConfig,

    /// Call tracing selection.
    pub trace: TraceConfig,

    /// Per-operation IP guards.
    pub operations: Vec<OperationConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Callers allowed on write routes.
    pub allowed_ips: AllowList,

    /// Entries merged into every allow list.
    pub default_allowed_ips: AllowList,

    /// Peers whose forwarding headers (`X-Forwarded-For` and friends) are
    /// believed. Any other peer is identified by its socket address.
    pub trusted_proxies: AllowList,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            allowed_ips: AllowList::default(),
            default_allowed_ips: AllowList::loopback(),
            trusted_proxies: AllowList::loopback(),
        }
    }
}

/// Which operations get call tracing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    pub enabled: bool,

    /// Name patterns; `*` matches any run of characters.
    pub include: Vec<String>,

    /// Exact operation names never traced.
    pub exclude: Vec<String>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            include: vec!["*Controller.*".to_string(), "*Service.*".to_string()],
            exclude: Vec::new(),
        }
    }
}

/// IP guard attached to one named operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperationConfig {
    /// Operation name, e.g. "HolidayController.delete".
    pub name: String,

    /// Callers allowed to invoke it (merged with the defaults).
    pub allowed_ips: AllowList,
}
