//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate operation guards
//! - Warn about allow-list entries that can never match
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Malformed allow-list entries are warnings: they fail closed at match time

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::security::allow_list::AllowList;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("invalid socket address '{}'", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if !LOG_LEVELS.contains(&config.observability.log_level.as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", config.observability.metrics_address),
        ));
    }

    let mut seen = HashSet::new();
    for op in &config.operations {
        if op.name.is_empty() {
            errors.push(ValidationError::new("operations.name", "must not be empty"));
        } else if !seen.insert(op.name.as_str()) {
            errors.push(ValidationError::new(
                "operations.name",
                format!("duplicate operation '{}'", op.name),
            ));
        }
        warn_malformed(&format!("operations[{}].allowed_ips", op.name), &op.allowed_ips);
    }

    warn_malformed("security.allowed_ips", &config.security.allowed_ips);
    warn_malformed("security.default_allowed_ips", &config.security.default_allowed_ips);
    warn_malformed("security.trusted_proxies", &config.security.trusted_proxies);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn warn_malformed(field: &str, list: &AllowList) {
    for entry in list.malformed() {
        tracing::warn!(field = %field, entry = %entry, "Allow-list entry can never match");
    }
}
