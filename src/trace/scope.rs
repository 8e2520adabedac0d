//! Storage for the active trace of the current call chain.
//!
//! Inside `with_trace_scope` the slot is task-local, so it follows the
//! request future across await points and worker threads. Outside any
//! scope each OS thread has its own slot.

use std::cell::RefCell;
use std::future::Future;

use super::trace_id::TraceId;

#[derive(Debug, Default)]
pub(crate) struct TraceSlot {
    /// Id to adopt when the outermost span opens (e.g. the request id).
    pub(crate) seed: Option<String>,
    pub(crate) current: Option<TraceId>,
}

tokio::task_local! {
    static TASK_SLOT: RefCell<TraceSlot>;
}

thread_local! {
    static THREAD_SLOT: RefCell<TraceSlot> = RefCell::new(TraceSlot::default());
}

/// Run `fut` with its own trace slot. Spans opened inside share one id,
/// taken from `seed` when given.
pub async fn with_trace_scope<F: Future>(seed: Option<String>, fut: F) -> F::Output {
    let slot = TraceSlot {
        seed,
        current: None,
    };
    TASK_SLOT.scope(RefCell::new(slot), fut).await
}

/// Run `fut` inside the active task scope, or a fresh one when there is
/// none. Async spans never touch the thread-local slot, which tasks sharing
/// a worker thread would otherwise interleave on.
pub(crate) async fn in_task_scope<F: Future>(fut: F) -> F::Output {
    if TASK_SLOT.try_with(|_| ()).is_ok() {
        fut.await
    } else {
        with_trace_scope(None, fut).await
    }
}

pub(crate) fn with_slot<R>(f: impl FnOnce(&mut TraceSlot) -> R) -> R {
    if TASK_SLOT.try_with(|_| ()).is_ok() {
        TASK_SLOT.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_SLOT.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Snapshot of the active trace, if any.
pub fn current_trace() -> Option<TraceId> {
    with_slot(|slot| slot.current.clone())
}

/// Id of the active trace, falling back to the scope seed.
pub fn current_trace_id() -> Option<String> {
    with_slot(|slot| {
        slot.current
            .as_ref()
            .map(|t| t.id().to_owned())
            .or_else(|| slot.seed.clone())
    })
}
