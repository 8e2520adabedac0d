//! Nested call tracing.
//!
//! # Data Flow
//! ```text
//! HTTP request
//!     → scope.rs (task-local slot, seeded with x-request-id)
//!     → registry.rs (advice chain per operation: CheckIp, LogTrace)
//!     → interceptor.rs (begin / end / exception around the call)
//!     → recorder.rs (indented log lines, level bookkeeping)
//!
//! Log output for one request:
//!     # |--> HolidayController.get_by_id
//!     # |   |--> HolidayService.find_by_id
//!     # |   |<X- HolidayService.find_by_id , elapsed=0ms
//!     # |<X- HolidayController.get_by_id , elapsed=1ms
//! ```
//!
//! # Design Decisions
//! - One trace id per logical call chain, reused by nested spans
//! - Slot is task-local inside a request scope, thread-local outside it
//! - Error classification goes through `TracedError`, not type inspection

pub mod interceptor;
pub mod recorder;
pub mod registry;
pub mod scope;
pub mod trace_id;

pub use interceptor::CallInterceptor;
pub use recorder::{LogTrace, TraceRecorder, TraceStatus, TracedError};
pub use registry::{Advice, CallContext, OperationRegistry, RegistryBuilder, TracePolicy};
pub use scope::{current_trace, current_trace_id, with_trace_scope};
pub use trace_id::TraceId;

#[cfg(test)]
pub(crate) mod test_support {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::Level;
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink for asserting on emitted lines.
    #[derive(Clone, Default)]
    pub(crate) struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        pub(crate) fn lines(&self) -> Vec<String> {
            let buf = self.0.lock().unwrap();
            String::from_utf8_lossy(&buf)
                .lines()
                .map(str::to_owned)
                .collect()
        }

        pub(crate) fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
            tracing_subscriber::fmt()
                .with_writer(self.clone())
                .with_max_level(Level::DEBUG)
                .with_ansi(false)
                .with_target(false)
                .without_time()
                .finish()
        }
    }

    pub(crate) struct CapturedWriter(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedWriter;

        fn make_writer(&'a self) -> Self::Writer {
            CapturedWriter(self.0.clone())
        }
    }

    /// Run `f` with a capturing subscriber installed on this thread.
    pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        let logs = CapturedLogs::default();
        let result = tracing::subscriber::with_default(logs.subscriber(), f);
        (result, logs.lines())
    }
}
