// ============================================================================
// spark-links - Local Executor
// Single-threaded task queue for `!Send` futures, polled from flush()
// ============================================================================
//
// Tasks live in a thread-local map keyed by a monotonically increasing id.
// A waker only records its task id in the ready queue; the task is polled on
// the next flush pass. Ids are never reused, so a late wake for a finished
// task is simply ignored.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll, Wake, Waker};

/// Boxed task future.
type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Identifier of a spawned task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

// =============================================================================
// READY QUEUE + WAKER
// =============================================================================

#[derive(Default)]
struct ReadyQueue {
    ids: Mutex<VecDeque<u64>>,
}

impl ReadyQueue {
    fn push(&self, id: u64) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(id);
    }

    fn drain(&self) -> Vec<u64> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

struct TaskWaker {
    id: u64,
    ready: Arc<ReadyQueue>,
}

impl Wake for TaskWaker {
    fn wake(self: Arc<Self>) {
        self.ready.push(self.id);
    }

    fn wake_by_ref(self: &Arc<Self>) {
        self.ready.push(self.id);
    }
}

// =============================================================================
// EXECUTOR
// =============================================================================

struct Executor {
    tasks: RefCell<HashMap<u64, LocalTask>>,
    ready: Arc<ReadyQueue>,
    next_id: Cell<u64>,
}

impl Executor {
    fn new() -> Self {
        Self {
            tasks: RefCell::new(HashMap::new()),
            ready: Arc::new(ReadyQueue::default()),
            next_id: Cell::new(1),
        }
    }

    fn spawn(&self, task: LocalTask) -> TaskId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.tasks.borrow_mut().insert(id, task);
        self.ready.push(id);
        TaskId(id)
    }

    fn waker(&self, id: u64) -> Waker {
        Waker::from(Arc::new(TaskWaker {
            id,
            ready: self.ready.clone(),
        }))
    }
}

thread_local! {
    static EXECUTOR: Executor = Executor::new();
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Spawn a future on this thread's host. It is first polled on the next
/// [`flush`](crate::flush) and then whenever its waker fires.
///
/// There is no cancellation: the task runs to completion even if the
/// component that spawned it is torn down.
pub fn spawn_local(future: impl Future<Output = ()> + 'static) -> TaskId {
    let id = EXECUTOR.with(|ex| ex.spawn(Box::pin(future)));
    tracing::debug!(task = id.0, "task spawned");
    id
}

/// Number of spawned tasks that have not completed.
pub fn active_task_count() -> usize {
    EXECUTOR.with(|ex| ex.tasks.borrow().len())
}

/// Whether any task has been woken and awaits a poll.
pub fn has_ready_tasks() -> bool {
    EXECUTOR.with(|ex| !ex.ready.is_empty())
}

/// Poll every woken task once. Returns how many polls happened.
pub(crate) fn run_ready_tasks() -> usize {
    let ids = EXECUTOR.with(|ex| ex.ready.drain());
    let mut polled = 0;

    for id in ids {
        // Take the task out so a poll that spawns more tasks can borrow the map.
        let Some(mut task) = EXECUTOR.with(|ex| ex.tasks.borrow_mut().remove(&id)) else {
            continue;
        };
        let waker = EXECUTOR.with(|ex| ex.waker(id));
        let mut cx = Context::from_waker(&waker);
        polled += 1;

        match task.as_mut().poll(&mut cx) {
            Poll::Ready(()) => tracing::debug!(task = id, "task completed"),
            Poll::Pending => {
                EXECUTOR.with(|ex| ex.tasks.borrow_mut().insert(id, task));
            }
        }
    }
    polled
}

// =============================================================================
// TESTS
// =============================================================================
