//! Offline inspection of a loaded config, backing `skeleton-cli`.

use std::fmt;

use crate::config::AppConfig;
use crate::http::server::build_registry;
use crate::security::{AccessGuard, AllowList};

/// Allow-list entry that can never match, with the config field holding it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
    pub field: String,
    pub entry: String,
}

impl fmt::Display for MalformedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: malformed entry '{}' never matches", self.field, self.entry)
    }
}

pub fn malformed_entries(config: &AppConfig) -> Vec<MalformedEntry> {
    let security = &config.security;
    let mut lists: Vec<(String, &AllowList)> = vec![
        ("security.allowed_ips".into(), &security.allowed_ips),
        ("security.default_allowed_ips".into(), &security.default_allowed_ips),
        ("security.trusted_proxies".into(), &security.trusted_proxies),
    ];
    for op in &config.operations {
        lists.push((format!("operations[{}].allowed_ips", op.name), &op.allowed_ips));
    }

    lists
        .into_iter()
        .flat_map(|(field, list)| {
            list.malformed().map(move |entry| MalformedEntry {
                field: field.clone(),
                entry: entry.to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allowed,
    Denied,
    /// The operation has no configured guard.
    Unguarded,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Allowed => "allowed",
            Verdict::Denied => "denied",
            Verdict::Unguarded => "allowed (no guard configured)",
        })
    }
}

/// Decide `address` against the write-route guard, or against the guard of
/// `operation` when given.
pub fn check_ip(config: &AppConfig, address: &str, operation: Option<&str>) -> Verdict {
    let defaults = &config.security.default_allowed_ips;
    let guard = match operation {
        None => AccessGuard::with_defaults(&config.security.allowed_ips, defaults),
        Some(name) => match config.operations.iter().find(|op| op.name == name) {
            Some(op) => AccessGuard::with_defaults(&op.allowed_ips, defaults),
            None => return Verdict::Unguarded,
        },
    };

    if guard.allowed().is_allowed(address) {
        Verdict::Allowed
    } else {
        Verdict::Denied
    }
}

/// Every declared operation with its advice chain, sorted by name.
pub fn advice_chains(config: &AppConfig) -> Vec<(String, Vec<&'static str>)> {
    let registry = build_registry(config);
    let mut chains: Vec<_> = registry
        .operation_names()
        .map(|name| {
            let chain = registry.advices(name).iter().map(|a| a.name()).collect();
            (name.to_owned(), chain)
        })
        .collect();
    chains.sort_unstable_by(|a, b| a.0.cmp(&b.0));
    chains
}
