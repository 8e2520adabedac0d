//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (span durations, span errors, access denials)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for aggregation)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Trace id is attached to every call-tree line as a field
//! - Metrics are cheap (atomic increments); no recorder means no-ops

pub mod logging;
pub mod metrics;
