//! Around-advice that traces a call.
//!
//! Every intercepted call gets `begin` before it runs and exactly one of
//! `end` / `exception` after. The result is returned unchanged; errors are
//! recorded and then propagated as-is.

use std::future::Future;
use std::sync::Arc;

use super::recorder::{LogTrace, TraceRecorder, TracedError};
use super::scope::in_task_scope;

#[derive(Clone)]
pub struct CallInterceptor {
    trace: Arc<dyn LogTrace>,
}

impl CallInterceptor {
    pub fn new(trace: Arc<dyn LogTrace>) -> Self {
        Self { trace }
    }

    /// Trace a synchronous call.
    pub fn intercept<T, E, F>(&self, label: &str, call: F) -> Result<T, E>
    where
        F: FnOnce() -> Result<T, E>,
        E: TracedError,
    {
        let status = self.trace.begin(label);
        match call() {
            Ok(value) => {
                self.trace.end(status);
                Ok(value)
            }
            Err(e) => {
                self.trace.exception(status, &e);
                Err(e)
            }
        }
    }

    /// Trace a future. The span opens on first poll, inside the caller's
    /// task scope or a new one.
    pub async fn intercept_async<T, E, Fut>(&self, label: &str, call: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        E: TracedError,
    {
        in_task_scope(async {
            let status = self.trace.begin(label);
            match call.await {
                Ok(value) => {
                    self.trace.end(status);
                    Ok(value)
                }
                Err(e) => {
                    self.trace.exception(status, &e);
                    Err(e)
                }
            }
        })
        .await
    }
}

impl Default for CallInterceptor {
    fn default() -> Self {
        Self::new(Arc::new(TraceRecorder::new()))
    }
}

impl std::fmt::Debug for CallInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallInterceptor").finish_non_exhaustive()
    }
}
