// ============================================================================
// spark-links - Effects
// Post-render side effects keyed on a dependency value
// ============================================================================
//
// An effect slot remembers the dependency value from the render that last
// scheduled it. A render schedules the effect again only when the new value
// differs. Scheduled effects run after the render, from flush(); each run
// first calls the cleanup left by the previous run.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::core::types::CleanupFn;

// =============================================================================
// TEARDOWN
// =============================================================================

/// Something holding a cleanup that must run when its component is torn down.
pub trait Teardown {
    fn teardown(&self);
}

// =============================================================================
// EFFECT SLOT
// =============================================================================

/// Hook slot backing one `use_effect` call site.
pub struct EffectSlot<D> {
    /// Dependency value as of the last render that scheduled the effect
    deps: RefCell<Option<Rc<D>>>,

    /// Cleanup returned by the last run
    cleanup: RefCell<Option<CleanupFn>>,

    /// Set once the owning component has been torn down
    torn_down: Cell<bool>,
}

impl<D: PartialEq> EffectSlot<D> {
    pub fn new() -> Self {
        Self {
            deps: RefCell::new(None),
            cleanup: RefCell::new(None),
            torn_down: Cell::new(false),
        }
    }

    /// Record `deps` for this render. Returns the shared value if it differs
    /// from the recorded one, meaning the effect must be scheduled.
    pub fn observe(&self, deps: D) -> Option<Rc<D>> {
        let unchanged = self
            .deps
            .borrow()
            .as_deref()
            .is_some_and(|previous| *previous == deps);
        if unchanged {
            return None;
        }

        let deps = Rc::new(deps);
        *self.deps.borrow_mut() = Some(deps.clone());
        Some(deps)
    }

    fn run_cleanup(&self) {
        let cleanup = self.cleanup.borrow_mut().take();
        if let Some(cleanup) = cleanup {
            cleanup();
        }
    }
}

impl<D: PartialEq> Default for EffectSlot<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PartialEq> Teardown for EffectSlot<D> {
    fn teardown(&self) {
        self.torn_down.set(true);
        self.run_cleanup();
    }
}

// =============================================================================
// EFFECT JOB
// =============================================================================

/// An effect run scheduled by a render, waiting for flush.
pub struct EffectJob {
    run: Box<dyn FnOnce()>,
}

impl EffectJob {
    pub fn new<D, F>(slot: Rc<EffectSlot<D>>, deps: Rc<D>, effect: F) -> Self
    where
        D: PartialEq + 'static,
        F: FnOnce(&D) -> Option<CleanupFn> + 'static,
    {
        Self {
            run: Box::new(move || {
                slot.run_cleanup();
                let cleanup = effect(&deps);
                if slot.torn_down.get() {
                    // The effect tore down its own component; nothing will
                    // come back for this cleanup.
                    if let Some(cleanup) = cleanup {
                        cleanup();
                    }
                } else {
                    *slot.cleanup.borrow_mut() = cleanup;
                }
            }),
        }
    }

    pub fn run(self) {
        (self.run)()
    }
}

// =============================================================================
// TESTS
// =============================================================================
