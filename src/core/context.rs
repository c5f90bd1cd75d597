// ============================================================================
// spark-links - Host Context
// Thread-local scheduler state shared by every component on this thread
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Weak;

use super::config::HostConfig;
use super::types::AnyComponent;

// =============================================================================
// HOST CONTEXT
// =============================================================================

/// Thread-local host state.
///
/// Everything here is single-threaded: components, state cells and tasks are
/// `Rc`-based and only ever touched from the thread that created them.
pub struct HostContext {
    // =========================================================================
    // QUEUES
    // =========================================================================
    /// Components with queued state transitions awaiting a render
    pub dirty: RefCell<VecDeque<Weak<dyn AnyComponent>>>,

    /// Components whose latest render scheduled effects
    pub effects: RefCell<VecDeque<Weak<dyn AnyComponent>>>,

    // =========================================================================
    // COUNTERS
    // =========================================================================
    /// Set actions accepted but not yet applied by a render
    pub pending_updates: Cell<usize>,

    /// Next component id
    pub next_id: Cell<u64>,

    // =========================================================================
    // FLUSH STATE
    // =========================================================================
    /// Whether a flush is in progress
    pub flushing: Cell<bool>,

    /// Active configuration
    pub config: Cell<HostConfig>,
}

impl HostContext {
    pub fn new() -> Self {
        Self {
            dirty: RefCell::new(VecDeque::new()),
            effects: RefCell::new(VecDeque::new()),
            pending_updates: Cell::new(0),
            next_id: Cell::new(1),
            flushing: Cell::new(false),
            config: Cell::new(HostConfig::default()),
        }
    }

    /// Allocate a component id
    pub fn allocate_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }

    /// Queue a component for re-render. Duplicate entries are harmless; the
    /// component skips renders it has nothing to apply for.
    pub fn mark_dirty(&self, component: Weak<dyn AnyComponent>) {
        self.dirty.borrow_mut().push_back(component);
    }

    pub fn take_dirty(&self) -> VecDeque<Weak<dyn AnyComponent>> {
        self.dirty.replace(VecDeque::new())
    }

    pub fn queue_effects(&self, component: Weak<dyn AnyComponent>) {
        self.effects.borrow_mut().push_back(component);
    }

    pub fn take_effects(&self) -> VecDeque<Weak<dyn AnyComponent>> {
        self.effects.replace(VecDeque::new())
    }

    pub fn add_pending_updates(&self, count: usize) {
        self.pending_updates.set(self.pending_updates.get() + count);
    }

    pub fn remove_pending_updates(&self, count: usize) {
        self.pending_updates
            .set(self.pending_updates.get().saturating_sub(count));
    }

    pub fn set_flushing(&self, value: bool) -> bool {
        self.flushing.replace(value)
    }

    pub fn is_flushing(&self) -> bool {
        self.flushing.get()
    }
}

impl Default for HostContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    static CONTEXT: HostContext = HostContext::new();
}

/// Run `f` with this thread's host context.
pub fn with_context<R>(f: impl FnOnce(&HostContext) -> R) -> R {
    CONTEXT.with(f)
}

/// Like [`with_context`], but returns `None` once the thread-local has been
/// destroyed. Used from `Drop` impls that may run during thread shutdown.
pub fn try_with_context<R>(f: impl FnOnce(&HostContext) -> R) -> Option<R> {
    CONTEXT.try_with(f).ok()
}

/// Number of set actions queued on this thread that no render has applied yet.
pub fn pending_update_count() -> usize {
    with_context(|ctx| ctx.pending_updates.get())
}

/// Whether a flush is running on this thread.
pub fn is_flushing() -> bool {
    with_context(|ctx| ctx.is_flushing())
}
