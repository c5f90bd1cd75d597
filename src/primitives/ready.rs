// ============================================================================
// spark-links - Async Readiness
// One race-free "ready" flag over any number of overlapping async operations
// ============================================================================
//
// The tracker keeps a counter in a safe link:
//
//   None        nothing dispatched yet          -> Uninitialized
//   Some(n > 0) n operations outstanding        -> Pending(n)
//   Some(0)     everything started has settled  -> Settled
//
// Dispatch and completion only ever apply +1 / -1 as functional updates, so
// completions that arrive in any order, in the same tick or not, cannot
// overwrite each other. Results are never inspected: an operation that fails
// settles exactly like one that succeeds.
// ============================================================================

use std::future::Future;

use crate::host::component::Scope;
use crate::host::executor::spawn_local;
use crate::primitives::safe::use_safe_link;

// =============================================================================
// READY STATE
// =============================================================================

/// Typed view of the readiness counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadyState {
    /// No operation has been dispatched
    Uninitialized,
    /// This many operations are outstanding
    Pending(u32),
    /// Every dispatched operation has completed
    Settled,
}

impl ReadyState {
    pub fn from_counter(counter: Option<u32>) -> Self {
        match counter {
            None => ReadyState::Uninitialized,
            Some(0) => ReadyState::Settled,
            Some(n) => ReadyState::Pending(n),
        }
    }

    pub fn is_ready(self) -> bool {
        self == ReadyState::Settled
    }

    /// Outstanding operations; zero unless pending.
    pub fn outstanding(self) -> u32 {
        match self {
            ReadyState::Pending(n) => n,
            _ => 0,
        }
    }
}

// =============================================================================
// HOOKS
// =============================================================================

/// Run `op` whenever `deps` changes (and on mount) and report how many runs
/// are still in flight.
///
/// Each run is spawned on the host executor and never cancelled; if the
/// component is torn down first, its completion is absorbed.
pub fn use_async_status<D, F, Fut>(cx: &mut Scope<'_>, deps: D, op: F) -> ReadyState
where
    D: PartialEq + 'static,
    F: FnOnce(&D) -> Fut + 'static,
    Fut: Future + 'static,
{
    let counter = use_safe_link(cx, None::<u32>);
    let status = ReadyState::from_counter(*counter.value());

    cx.use_effect(deps, move |deps| {
        counter.set_with(|count| Some(count.unwrap_or(0) + 1));
        let work = op(deps);
        spawn_local(async move {
            let _ = work.await;
            counter.set_with(|count| count.map(|n| n.saturating_sub(1)));
        });
    });

    status
}

/// Whether every operation started by this hook has settled. False until
/// the first one completes.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_async_ready};
///
/// let app = mount(|cx| use_async_ready(cx, (), |_| async { Ok::<_, ()>(42) }));
/// assert!(!app.output());
///
/// flush().unwrap();
/// assert!(app.output());
/// ```
pub fn use_async_ready<D, F, Fut>(cx: &mut Scope<'_>, deps: D, op: F) -> bool
where
    D: PartialEq + 'static,
    F: FnOnce(&D) -> Fut + 'static,
    Fut: Future + 'static,
{
    use_async_status(cx, deps, op).is_ready()
}

// =============================================================================
// TESTS
// =============================================================================
