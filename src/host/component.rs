// ============================================================================
// spark-links - Components
//
// A component is a render closure plus the hook slots it fills, in call
// order, on every render. The host owns the slots; render output is kept so
// callers can inspect what the latest render produced.
// ============================================================================
//
// Lifecycle:
// - mount(render) runs the first render synchronously
// - set actions on owned state mark the component dirty; flush() re-renders
// - effects scheduled by a render run during flush(), after the render
// - unmount() (or dropping the last handle) tears it down: the mount handle
//   flips, effect cleanups and unmount callbacks run, hook slots are dropped
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::context::with_context;
use crate::core::types::{AnyComponent, CleanupFn};
use crate::host::effect::{EffectJob, EffectSlot, Teardown};
use crate::host::state::{StateCell, StateSetter};
use crate::primitives::mount::MountHandle;

/// Render closure signature.
pub type RenderFn<R> = Box<dyn FnMut(&mut Scope<'_>) -> R>;

// =============================================================================
// COMPONENT CORE
// =============================================================================

/// The type-independent half of a component: hooks, effects, lifecycle.
pub struct ComponentCore {
    id: u64,

    /// Weak self-reference handed to state cells and host queues
    owner: Weak<dyn AnyComponent>,

    /// Hook slots in call order
    hooks: RefCell<Vec<Rc<dyn Any>>>,

    /// Effect slots, for cleanup at teardown
    teardowns: RefCell<Vec<Rc<dyn Teardown>>>,

    /// Effects scheduled by the latest render
    pending_effects: RefCell<Vec<EffectJob>>,

    /// Callbacks registered with `Scope::on_unmount`
    unmount_callbacks: RefCell<Vec<CleanupFn>>,

    /// Lifecycle flag shared with every `MountHandle` for this instance
    mount: MountHandle,

    /// Set when owned state has queued actions
    needs_render: Cell<bool>,

    render_count: Cell<u64>,
}

impl ComponentCore {
    fn new(id: u64, owner: Weak<dyn AnyComponent>) -> Self {
        Self {
            id,
            owner,
            hooks: RefCell::new(Vec::new()),
            teardowns: RefCell::new(Vec::new()),
            pending_effects: RefCell::new(Vec::new()),
            unmount_callbacks: RefCell::new(Vec::new()),
            mount: MountHandle::new(),
            needs_render: Cell::new(false),
            render_count: Cell::new(0),
        }
    }

    fn has_pending_effects(&self) -> bool {
        !self.pending_effects.borrow().is_empty()
    }

    /// Tear down. Returns false if already torn down.
    fn teardown(&self) -> bool {
        if !self.mount.invalidate() {
            return false;
        }

        self.needs_render.set(false);
        self.pending_effects.borrow_mut().clear();

        // Effect cleanups first, newest first, then unmount callbacks.
        let teardowns: Vec<_> = self.teardowns.borrow_mut().drain(..).collect();
        for slot in teardowns.into_iter().rev() {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| slot.teardown())).is_err()
            {
                tracing::error!(component = self.id, "effect cleanup panicked during teardown");
            }
        }

        let callbacks: Vec<_> = self.unmount_callbacks.borrow_mut().drain(..).collect();
        for callback in callbacks.into_iter().rev() {
            if std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)).is_err() {
                tracing::error!(component = self.id, "unmount callback panicked");
            }
        }

        // Dropping the slots drops state cells, which releases their queues.
        let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
        drop(hooks);

        tracing::trace!(component = self.id, "component unmounted");
        true
    }

    /// Drop what a render registered after tearing down its own component.
    /// None of it ran, so there are no cleanups to call.
    fn discard_late_hooks(&self) {
        self.pending_effects.borrow_mut().clear();
        self.teardowns.borrow_mut().clear();
        let callbacks = std::mem::take(&mut *self.unmount_callbacks.borrow_mut());
        drop(callbacks);
        let hooks = std::mem::take(&mut *self.hooks.borrow_mut());
        drop(hooks);
    }
}

// =============================================================================
// SCOPE - what a render closure sees
// =============================================================================

/// Render-time access to a component's hooks.
///
/// Hooks are matched to slots by call order, so a render must call the same
/// hooks in the same order every time.
pub struct Scope<'a> {
    core: &'a ComponentCore,
    cursor: usize,
}

impl<'a> Scope<'a> {
    fn new(core: &'a ComponentCore) -> Self {
        Self { core, cursor: 0 }
    }

    /// Claim the next hook slot, creating it on first use.
    /// Returns the slot and whether this call created it.
    ///
    /// # Panics
    ///
    /// Panics if the slot at this position holds a different type, which
    /// means hooks were called in a different order than on a prior render.
    fn slot<H: 'static>(&mut self, init: impl FnOnce() -> H) -> (Rc<H>, bool) {
        let index = self.cursor;
        self.cursor += 1;

        let existing = self.core.hooks.borrow().get(index).cloned();
        match existing {
            Some(slot) => match slot.downcast::<H>() {
                Ok(slot) => (slot, false),
                Err(_) => panic!(
                    "hook #{index} of component {} changed type between renders; \
                     hooks must be called in the same order on every render",
                    self.core.id
                ),
            },
            None => {
                let slot = Rc::new(init());
                self.core
                    .hooks
                    .borrow_mut()
                    .push(slot.clone() as Rc<dyn Any>);
                (slot, true)
            }
        }
    }

    /// Id of the component being rendered.
    pub fn component_id(&self) -> u64 {
        self.core.id
    }

    /// How many renders completed before this one.
    pub fn render_index(&self) -> u64 {
        self.core.render_count.get()
    }

    /// The lifecycle handle of the component being rendered.
    pub fn mount_handle(&self) -> MountHandle {
        self.core.mount.clone()
    }

    /// A value that persists across renders. Created from `init` on the
    /// first render; later renders get the same `Rc` back. Mutating it never
    /// causes a render.
    pub fn use_ref<H: 'static>(&mut self, init: impl FnOnce() -> H) -> Rc<H> {
        self.slot(init).0
    }

    /// Component-local state: the value committed as of this render, and the
    /// stable setter for it.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_links::{flush, mount};
    ///
    /// let app = mount(|cx| cx.use_state(|| 1));
    /// let (value, set) = app.output();
    /// assert_eq!(value, 1);
    ///
    /// set.set(2);
    /// flush().unwrap();
    /// assert_eq!(app.output().0, 2);
    /// ```
    pub fn use_state<T: Clone + 'static>(
        &mut self,
        init: impl FnOnce() -> T,
    ) -> (T, StateSetter<T>) {
        let owner = self.core.owner.clone();
        let cell = self.use_ref(|| StateCell::new(init(), owner));
        cell.process();
        (cell.snapshot(), StateSetter::new(&cell))
    }

    /// Run `effect` after this render commits if `deps` differs from the
    /// value it had on the render that last scheduled it (always on mount).
    pub fn use_effect<D: PartialEq + 'static>(
        &mut self,
        deps: D,
        effect: impl FnOnce(&D) + 'static,
    ) {
        self.use_effect_with_cleanup(deps, move |deps| {
            effect(deps);
            None
        });
    }

    /// Like [`use_effect`](Self::use_effect), with an optional cleanup that
    /// runs before the effect's next run and at teardown.
    pub fn use_effect_with_cleanup<D: PartialEq + 'static>(
        &mut self,
        deps: D,
        effect: impl FnOnce(&D) -> Option<CleanupFn> + 'static,
    ) {
        let (slot, created) = self.slot(EffectSlot::<D>::new);
        if created {
            self.core
                .teardowns
                .borrow_mut()
                .push(slot.clone() as Rc<dyn Teardown>);
        }

        if let Some(deps) = slot.observe(deps) {
            self.core
                .pending_effects
                .borrow_mut()
                .push(EffectJob::new(slot, deps, effect));
        }
    }

    /// Register `callback` to run at teardown. Only the first render's
    /// registration counts; later calls at this position are ignored.
    pub fn on_unmount(&mut self, callback: impl FnOnce() + 'static) {
        let (_, created) = self.slot(|| ());
        if created {
            self.core
                .unmount_callbacks
                .borrow_mut()
                .push(Box::new(callback));
        }
    }
}

// =============================================================================
// COMPONENT INNER
// =============================================================================

struct ComponentInner<R> {
    core: ComponentCore,
    render_fn: RefCell<Option<RenderFn<R>>>,
    output: RefCell<R>,
}

impl<R: 'static> AnyComponent for ComponentInner<R> {
    fn id(&self) -> u64 {
        self.core.id
    }

    fn is_mounted(&self) -> bool {
        self.core.mount.is_mounted()
    }

    fn request_render(&self) {
        if self.core.needs_render.replace(true) {
            return;
        }
        let owner = self.core.owner.clone();
        with_context(|ctx| ctx.mark_dirty(owner));
    }

    fn render(&self) -> bool {
        if !self.is_mounted() || !self.core.needs_render.replace(false) {
            return false;
        }

        let Ok(mut render_fn) = self.render_fn.try_borrow_mut() else {
            tracing::warn!(component = self.core.id, "skipping re-entrant render");
            return false;
        };
        let Some(render) = render_fn.as_mut() else {
            return false;
        };

        let mut scope = Scope::new(&self.core);
        let output = render(&mut scope);

        if !self.is_mounted() {
            // The render unmounted its own component. unmount() could not
            // release the closure while it was running, so release it here.
            let released = render_fn.take();
            drop(render_fn);
            drop(released);
            self.core.discard_late_hooks();
            drop(output);
            return false;
        }
        drop(render_fn);

        *self.output.borrow_mut() = output;
        let count = self.core.render_count.get() + 1;
        self.core.render_count.set(count);
        tracing::trace!(component = self.core.id, render = count, "rendered");

        if self.core.has_pending_effects() {
            let owner = self.core.owner.clone();
            with_context(|ctx| ctx.queue_effects(owner));
        }
        true
    }

    fn run_effects(&self) -> usize {
        let jobs = std::mem::take(&mut *self.core.pending_effects.borrow_mut());
        let mut ran = 0;
        for job in jobs {
            // Teardown from an earlier effect in this batch cancels the rest.
            if !self.is_mounted() {
                break;
            }
            job.run();
            ran += 1;
        }
        ran
    }
}

impl<R> Drop for ComponentInner<R> {
    fn drop(&mut self) {
        if self.core.mount.is_mounted() {
            self.core.teardown();
        }
    }
}

// =============================================================================
// COMPONENT (public handle)
// =============================================================================

/// A mounted component.
///
/// Cloning shares the instance. When the last handle is dropped the
/// component is torn down, like an effect scope going out of scope.
pub struct Component<R: 'static> {
    inner: Rc<ComponentInner<R>>,
}

impl<R: 'static> Clone for Component<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: 'static> Component<R> {
    /// Host-assigned id.
    pub fn id(&self) -> u64 {
        self.inner.core.id
    }

    /// Whether the component has not been torn down.
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }

    /// Completed renders, including the initial one.
    pub fn render_count(&self) -> u64 {
        self.inner.core.render_count.get()
    }

    /// Lifecycle handle for this instance.
    pub fn mount_handle(&self) -> MountHandle {
        self.inner.core.mount.clone()
    }

    /// Clone of the latest render output. After teardown this is the output
    /// of the final render.
    pub fn output(&self) -> R
    where
        R: Clone,
    {
        self.inner.output.borrow().clone()
    }

    /// Borrow the latest render output.
    pub fn with_output<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.inner.output.borrow())
    }

    /// Force a render on the next flush even if no state changed.
    pub fn invalidate(&self) {
        if self.is_mounted() {
            self.inner.request_render();
        }
    }

    /// Tear the component down now. Idempotent.
    pub fn unmount(&self) {
        if self.inner.core.teardown() {
            // Release whatever the render closure captured. Mid-render the
            // closure is still borrowed and the render releases it instead.
            let released = self
                .inner
                .render_fn
                .try_borrow_mut()
                .ok()
                .and_then(|mut render_fn| render_fn.take());
            drop(released);
        }
    }
}

impl<R: 'static> Drop for Component<R> {
    fn drop(&mut self) {
        if Rc::strong_count(&self.inner) == 1 {
            self.unmount();
        }
    }
}

impl<R: fmt::Debug + 'static> fmt::Debug for Component<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id())
            .field("mounted", &self.is_mounted())
            .field("renders", &self.render_count())
            .field("output", &*self.inner.output.borrow())
            .finish()
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Mount a component on this thread's host and run its first render.
///
/// Effects scheduled by the first render run on the next [`flush`].
///
/// [`flush`]: crate::flush
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let ran = Rc::new(Cell::new(false));
/// let app = mount({
///     let ran = ran.clone();
///     move |cx| {
///         let ran = ran.clone();
///         cx.use_effect((), move |_| ran.set(true));
///     }
/// });
///
/// assert_eq!(app.render_count(), 1);
/// assert!(!ran.get());
/// flush().unwrap();
/// assert!(ran.get());
/// ```
pub fn mount<R, F>(render: F) -> Component<R>
where
    R: 'static,
    F: FnMut(&mut Scope<'_>) -> R + 'static,
{
    let mut render: RenderFn<R> = Box::new(render);
    let id = with_context(|ctx| ctx.allocate_id());

    let inner = Rc::new_cyclic(|weak: &Weak<ComponentInner<R>>| {
        let owner: Weak<dyn AnyComponent> = weak.clone();
        let core = ComponentCore::new(id, owner);
        let output = render(&mut Scope::new(&core));
        core.render_count.set(1);
        ComponentInner {
            core,
            render_fn: RefCell::new(Some(render)),
            output: RefCell::new(output),
        }
    });

    tracing::trace!(component = id, "component mounted");

    if inner.core.has_pending_effects() {
        let owner = inner.core.owner.clone();
        with_context(|ctx| ctx.queue_effects(owner));
    }
    Component { inner }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::scheduling::flush;

    #[test]
    fn first_render_is_synchronous() {
        let app = mount(|cx| cx.render_index());
        assert_eq!(app.output(), 0);
        assert_eq!(app.render_count(), 1);
        assert!(app.is_mounted());
    }

    #[test]
    fn use_ref_persists() {
        let app = mount(|cx| {
            let hits = cx.use_ref(|| Cell::new(0));
            hits.set(hits.get() + 1);
            hits.get()
        });
        app.invalidate();
        flush().unwrap();
        app.invalidate();
        flush().unwrap();
        assert_eq!(app.output(), 3);
    }

    #[test]
    fn no_render_without_changes() {
        let app = mount(|cx| cx.use_state(|| 0).0);
        flush().unwrap();
        assert_eq!(app.render_count(), 1);
    }

    #[test]
    fn effect_runs_on_deps_change_only() {
        let runs = Rc::new(Cell::new(0));
        let app = mount({
            let runs = runs.clone();
            move |cx| {
                let (value, set) = cx.use_state(|| 0);
                let runs = runs.clone();
                cx.use_effect(value / 2, move |_| runs.set(runs.get() + 1));
                set
            }
        });
        flush().unwrap();
        assert_eq!(runs.get(), 1);

        let set = app.output();
        set.set(1); // 1 / 2 == 0, deps unchanged
        flush().unwrap();
        assert_eq!(runs.get(), 1);

        set.set(2);
        flush().unwrap();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn cleanup_runs_before_rerun_and_at_teardown() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let app = mount({
            let log = log.clone();
            move |cx| {
                let (value, set) = cx.use_state(|| 0);
                let log = log.clone();
                cx.use_effect_with_cleanup(value, move |v| {
                    let v = *v;
                    log.borrow_mut().push(format!("run {v}"));
                    let log = log.clone();
                    Some(Box::new(move || log.borrow_mut().push(format!("clean {v}"))))
                });
                set
            }
        });
        flush().unwrap();
        app.output().set(1);
        flush().unwrap();
        app.unmount();

        assert_eq!(
            *log.borrow(),
            vec!["run 0", "clean 0", "run 1", "clean 1"]
        );
    }

    #[test]
    fn effects_never_run_after_unmount() {
        let ran = Rc::new(Cell::new(false));
        let app = mount({
            let ran = ran.clone();
            move |cx| {
                let ran = ran.clone();
                cx.use_effect((), move |_| ran.set(true));
            }
        });
        app.unmount();
        flush().unwrap();
        assert!(!ran.get());
    }

    #[test]
    fn unmount_callbacks_run_once_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let app = mount({
            let log = log.clone();
            move |cx| {
                let a = log.clone();
                cx.on_unmount(move || a.borrow_mut().push("a"));
                let b = log.clone();
                cx.on_unmount(move || b.borrow_mut().push("b"));
            }
        });
        app.invalidate();
        flush().unwrap();
        app.unmount();
        app.unmount();
        assert_eq!(*log.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn mount_flag_flips_before_cleanups() {
        let seen = Rc::new(Cell::new(true));
        let app = mount({
            let seen = seen.clone();
            move |cx| {
                let handle = cx.mount_handle();
                let seen = seen.clone();
                cx.on_unmount(move || seen.set(handle.is_mounted()));
            }
        });
        app.unmount();
        assert!(!seen.get());
    }

    #[test]
    fn effect_unmounting_its_component_still_cleans_up() {
        let cleaned = Rc::new(Cell::new(false));
        let me: Rc<RefCell<Option<Component<()>>>> = Rc::new(RefCell::new(None));
        let app = mount({
            let cleaned = cleaned.clone();
            let me = me.clone();
            move |cx| {
                let cleaned = cleaned.clone();
                let me = me.clone();
                cx.use_effect_with_cleanup((), move |_| {
                    if let Some(me) = me.borrow().as_ref() {
                        me.unmount();
                    }
                    Some(Box::new(move || cleaned.set(true)))
                });
            }
        });
        *me.borrow_mut() = Some(app.clone());

        flush().unwrap();
        assert!(!app.is_mounted());
        assert!(cleaned.get());
        me.borrow_mut().take();
    }

    #[test]
    fn render_unmounting_its_component() {
        let ran = Rc::new(Cell::new(false));
        let me: Rc<RefCell<Option<Component<u64>>>> = Rc::new(RefCell::new(None));
        let app = mount({
            let ran = ran.clone();
            let me = me.clone();
            move |cx| {
                let index = cx.render_index();
                if index > 0 {
                    if let Some(me) = me.borrow().as_ref() {
                        me.unmount();
                    }
                }
                let ran = ran.clone();
                cx.use_effect(index, move |_| ran.set(true));
                index
            }
        });
        *me.borrow_mut() = Some(app.clone());
        flush().unwrap();
        ran.set(false);

        app.invalidate();
        flush().unwrap();

        assert!(!app.is_mounted());
        assert_eq!(app.render_count(), 1);
        assert_eq!(app.output(), 0);
        assert!(!ran.get());
        me.borrow_mut().take();
    }

    #[test]
    fn clone_keeps_component_alive() {
        let app = mount(|_| ());
        let handle = app.mount_handle();
        let copy = app.clone();
        drop(app);
        assert!(handle.is_mounted());
        drop(copy);
        assert!(!handle.is_mounted());
    }

    #[test]
    #[should_panic(expected = "changed type between renders")]
    fn hook_order_change_panics() {
        let app = mount(|cx| {
            if cx.render_index() == 0 {
                cx.use_ref(|| 1u8);
            } else {
                cx.use_ref(|| String::new());
            }
        });
        app.invalidate();
        let _ = flush();
    }

    #[test]
    fn with_output_borrows() {
        let app = mount(|_| vec![1, 2, 3]);
        assert_eq!(app.with_output(|v| v.len()), 3);
    }
}
