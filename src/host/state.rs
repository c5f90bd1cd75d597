// ============================================================================
// spark-links - State Cells
// Component-owned state with an ordered queue of pending transitions
// ============================================================================
//
// A setter never writes the value directly. It queues a SetAction and marks
// the owning component dirty; the next render drains the queue front to back,
// resolving each action against the value left by the previous one. That is
// what lets functional updates dispatched in the same tick compose instead of
// overwriting each other.
// ============================================================================

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::context::with_context;
use crate::core::types::{AnyComponent, Commit, SetAction};

// =============================================================================
// STATE CELL
// =============================================================================

/// State owned by one component instance, held in one of its hook slots.
pub struct StateCell<T> {
    value: RefCell<T>,
    queue: RefCell<VecDeque<SetAction<T>>>,
    owner: Weak<dyn AnyComponent>,
}

impl<T: 'static> StateCell<T> {
    pub(crate) fn new(value: T, owner: Weak<dyn AnyComponent>) -> Self {
        Self {
            value: RefCell::new(value),
            queue: RefCell::new(VecDeque::new()),
            owner,
        }
    }

    /// Queue a transition for the owner's next render.
    ///
    /// Returns false when the owner is gone or torn down; the action is then
    /// dropped without being evaluated.
    pub(crate) fn dispatch(&self, action: SetAction<T>) -> bool {
        let Some(owner) = self.owner.upgrade().filter(|o| o.is_mounted()) else {
            return false;
        };

        self.queue.borrow_mut().push_back(action);
        with_context(|ctx| ctx.add_pending_updates(1));
        owner.request_render();
        true
    }

    /// Apply every queued action in dispatch order. Returns how many applied.
    pub(crate) fn process(&self) -> usize {
        let mut applied = 0;
        loop {
            // Pop before resolving so an action that dispatches again does
            // not collide with this borrow.
            let next = self.queue.borrow_mut().pop_front();
            let Some(action) = next else { break };

            let resolved = action.resolve(&self.value.borrow());
            *self.value.borrow_mut() = resolved;
            applied += 1;
        }
        if applied > 0 {
            with_context(|ctx| ctx.remove_pending_updates(applied));
        }
        applied
    }

    /// Clone of the committed value.
    pub(crate) fn snapshot(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }

    /// Number of actions waiting for a render.
    pub fn queued(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl<T> Drop for StateCell<T> {
    fn drop(&mut self) {
        let dropped = self.queue.get_mut().len();
        if dropped > 0 {
            // The thread-local may already be gone during thread shutdown.
            let _ = crate::core::context::try_with_context(|ctx| {
                ctx.remove_pending_updates(dropped)
            });
        }
    }
}

// =============================================================================
// STATE SETTER
// =============================================================================

/// The stable write capability for a [`StateCell`].
///
/// Every render hands out a setter for the same cell; it holds only a weak
/// reference, so it never keeps a torn-down component's state alive.
pub struct StateSetter<T> {
    cell: Weak<StateCell<T>>,
}

impl<T> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: 'static> StateSetter<T> {
    pub(crate) fn new(cell: &Rc<StateCell<T>>) -> Self {
        Self {
            cell: Rc::downgrade(cell),
        }
    }

    /// Queue a replacement value or a functional update.
    ///
    /// Writes to a torn-down component are dropped and reported with a
    /// warning; use a safe link to drop them quietly.
    pub fn set(&self, action: impl Into<SetAction<T>>) {
        let accepted = self
            .cell
            .upgrade()
            .is_some_and(|cell| cell.dispatch(action.into()));
        if !accepted {
            tracing::warn!(
                state = std::any::type_name::<T>(),
                "state update on an unmounted component was dropped"
            );
        }
    }

    /// Whether the owning component is still mounted.
    pub fn is_connected(&self) -> bool {
        self.cell
            .upgrade()
            .and_then(|cell| cell.owner.upgrade())
            .is_some_and(|owner| owner.is_mounted())
    }

    /// Whether two setters write to the same cell.
    pub fn same_cell(&self, other: &StateSetter<T>) -> bool {
        Weak::ptr_eq(&self.cell, &other.cell)
    }
}

impl<T: 'static> Commit<T> for StateSetter<T> {
    fn commit(&self, action: SetAction<T>) {
        self.set(action);
    }
}

impl<T> fmt::Debug for StateSetter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSetter")
            .field("live", &(self.cell.strong_count() > 0))
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
