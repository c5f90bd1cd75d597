// ============================================================================
// spark-links - Mount Tracker
//
// A read-only lifecycle capability: true from component creation until
// teardown, then false forever. Not reactive state; flipping it never
// schedules a render.
// ============================================================================

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::host::component::Scope;

// =============================================================================
// MOUNT HANDLE
// =============================================================================

/// Lifecycle handle for one component instance.
///
/// The host creates it alongside the component and invalidates it exactly
/// once, at the start of teardown. Clones share the same flag and can only
/// read it, so closures captured during any earlier render can check whether
/// their component is still alive.
///
/// # Example
///
/// ```
/// use spark_links::{mount, use_mount_tracker};
///
/// let app = mount(|cx| use_mount_tracker(cx));
/// let handle = app.output();
/// assert!(handle.is_mounted());
///
/// app.unmount();
/// assert!(!handle.is_mounted());
/// ```
#[derive(Clone)]
pub struct MountHandle {
    alive: Rc<Cell<bool>>,
}

impl MountHandle {
    /// Host-side constructor. Only the host may invalidate the handle.
    pub(crate) fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    /// Whether the owning component has not been torn down.
    pub fn is_mounted(&self) -> bool {
        self.alive.get()
    }

    /// Flip to unmounted. Returns true the first time only.
    pub(crate) fn invalidate(&self) -> bool {
        self.alive.replace(false)
    }

    /// Whether two handles belong to the same component instance.
    pub fn same_instance(&self, other: &MountHandle) -> bool {
        Rc::ptr_eq(&self.alive, &other.alive)
    }
}

impl fmt::Debug for MountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountHandle")
            .field("mounted", &self.is_mounted())
            .finish()
    }
}

// =============================================================================
// HOOK
// =============================================================================

/// Get the lifecycle handle of the component currently rendering.
///
/// Every call within one component instance returns a handle to the same flag.
pub fn use_mount_tracker(cx: &mut Scope<'_>) -> MountHandle {
    cx.mount_handle()
}
