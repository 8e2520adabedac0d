//! Span recorder producing indented call-tree logs.

use std::time::{Duration, Instant};

use crate::observability::metrics;

use super::scope::with_slot;
use super::trace_id::TraceId;

const START_PREFIX: &str = "--> ";
const END_PREFIX: &str = "<-- ";
const EX_PREFIX: &str = "<X- ";
const INDENT: &str = "|   ";
const BRANCH: &str = "|";

/// Classification hook used when a traced call fails.
pub trait TracedError: std::fmt::Display {
    /// Expected business outcome; traced at DEBUG instead of WARN.
    fn is_known(&self) -> bool;

    /// Short type name shown in WARN lines.
    fn kind(&self) -> &'static str;
}

/// State of one open span. Returned by `begin`, consumed by `end` or
/// `exception`.
#[derive(Debug)]
pub struct TraceStatus {
    trace_id: String,
    level: u32,
    started: Instant,
    message: String,
}

impl TraceStatus {
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

pub trait LogTrace: Send + Sync {
    fn begin(&self, message: &str) -> TraceStatus;

    fn end(&self, status: TraceStatus);

    fn exception(&self, status: TraceStatus, error: &dyn TracedError);
}

/// `LogTrace` backed by the scoped trace slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceRecorder;

impl TraceRecorder {
    pub fn new() -> Self {
        Self
    }

    fn complete(&self, status: TraceStatus, error: Option<&dyn TracedError>) {
        let elapsed = status.elapsed();
        let elapsed_ms = elapsed.as_millis();
        let marker = if error.is_none() { END_PREFIX } else { EX_PREFIX };
        let prefix = build_prefix(marker, status.level);

        match error {
            None => {
                tracing::debug!(trace_id = %status.trace_id, "# {}{} , elapsed={}ms", prefix, status.message, elapsed_ms);
            }
            Some(e) if e.is_known() => {
                tracing::debug!(trace_id = %status.trace_id, "# {}{} , elapsed={}ms", prefix, status.message, elapsed_ms);
            }
            Some(e) => {
                tracing::warn!(
                    trace_id = %status.trace_id,
                    "# {}{} , elapsed={}ms , ex={} {}",
                    prefix,
                    status.message,
                    elapsed_ms,
                    e.kind(),
                    e
                );
            }
        }

        metrics::record_span(elapsed, error.map(|e| e.kind()));
        release_trace_id();
    }
}

impl LogTrace for TraceRecorder {
    fn begin(&self, message: &str) -> TraceStatus {
        let trace = sync_trace_id();
        let prefix = build_prefix(START_PREFIX, trace.level());

        tracing::debug!(trace_id = %trace.id(), "# {}{}", prefix, message);

        TraceStatus {
            trace_id: trace.id().to_owned(),
            level: trace.level(),
            started: Instant::now(),
            message: message.to_owned(),
        }
    }

    fn end(&self, status: TraceStatus) {
        self.complete(status, None);
    }

    fn exception(&self, status: TraceStatus, error: &dyn TracedError) {
        self.complete(status, Some(error));
    }
}

/// Open a level: reuse the active trace one level deeper, or start a new
/// one. Returns a snapshot after the change.
fn sync_trace_id() -> TraceId {
    with_slot(|slot| {
        let trace = match slot.current.take() {
            Some(mut trace) => {
                trace.next_level();
                trace
            }
            None => TraceId::generate(slot.seed.as_deref()),
        };
        slot.current = Some(trace.clone());
        trace
    })
}

/// Close a level. No-op when no trace is active.
fn release_trace_id() {
    with_slot(|slot| {
        let outermost = match slot.current.as_mut() {
            None => return,
            Some(trace) if trace.is_first_level() => true,
            Some(trace) => {
                trace.prev_level();
                false
            }
        };
        if outermost {
            slot.current = None;
        }
    });
}

fn build_prefix(marker: &str, level: u32) -> String {
    let depth = level.saturating_sub(1) as usize;
    let mut prefix = String::with_capacity(depth * INDENT.len() + BRANCH.len() + marker.len());
    for _ in 0..depth {
        prefix.push_str(INDENT);
    }
    prefix.push_str(BRANCH);
    prefix.push_str(marker);
    prefix
}
