// ============================================================================
// spark-links - Safe Link
// A link that quietly absorbs writes once its component is torn down
// ============================================================================
//
// Async work often finishes after the component that started it is gone.
// A safe link checks the mount handle on every commit: while mounted it
// forwards, afterwards it drops the action unevaluated. No state changes,
// no render is scheduled, and no warning is logged.
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::core::types::{Commit, SetAction};
use crate::host::component::Scope;
use crate::primitives::link::Link;
use crate::primitives::mount::MountHandle;
use crate::primitives::state_link::use_state_link;

// =============================================================================
// SAFE COMMIT
// =============================================================================

/// Forwards to `inner` only while `mount` reports the component alive.
pub struct SafeCommit<T> {
    inner: Rc<dyn Commit<T>>,
    mount: MountHandle,
}

impl<T> SafeCommit<T> {
    pub fn new(inner: Rc<dyn Commit<T>>, mount: MountHandle) -> Self {
        Self { inner, mount }
    }
}

impl<T> Commit<T> for SafeCommit<T> {
    fn commit(&self, action: SetAction<T>) {
        if self.mount.is_mounted() {
            self.inner.commit(action);
        } else {
            tracing::trace!(
                state = std::any::type_name::<T>(),
                functional = action.is_functional(),
                "stale write absorbed"
            );
        }
    }
}

impl<T> fmt::Debug for SafeCommit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SafeCommit")
            .field("mount", &self.mount)
            .finish_non_exhaustive()
    }
}

/// Wrap any link's commit so writes after `mount` is invalidated are dropped.
pub fn guard_commit<T: 'static>(link: Link<T>, mount: MountHandle) -> Link<T> {
    link.map_commit(|inner| SafeCommit::new(inner, mount))
}

// =============================================================================
// HOOK
// =============================================================================

/// A state link that is safe to write from late async completions.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_safe_link};
///
/// let app = mount(|cx| use_safe_link(cx, 0));
/// let link = app.output();
/// app.unmount();
///
/// // Dropped without evaluating the closure.
/// link.set_with(|_| unreachable!());
/// flush().unwrap();
/// assert_eq!(*app.output().value(), 0);
/// ```
pub fn use_safe_link<T: Clone + 'static>(cx: &mut Scope<'_>, init: T) -> Link<T> {
    let mount = cx.mount_handle();
    guard_commit(use_state_link(cx, init), mount)
}

// =============================================================================
// TESTS
// =============================================================================
