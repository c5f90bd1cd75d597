// ============================================================================
// spark-links - State-Backed Link
// A link over component-local state; commits go straight to the host setter
// ============================================================================

use std::fmt;

use crate::core::types::{Commit, SetAction};
use crate::host::component::Scope;
use crate::host::state::StateSetter;
use crate::primitives::link::Link;

// =============================================================================
// STATE COMMIT
// =============================================================================

/// Forwards every action to a state setter, unconditionally.
pub struct StateCommit<T> {
    setter: StateSetter<T>,
}

impl<T: 'static> StateCommit<T> {
    pub fn new(setter: StateSetter<T>) -> Self {
        Self { setter }
    }

    /// The setter this commit writes through.
    pub fn setter(&self) -> &StateSetter<T> {
        &self.setter
    }
}

impl<T: 'static> Commit<T> for StateCommit<T> {
    fn commit(&self, action: SetAction<T>) {
        self.setter.set(action);
    }
}

impl<T> fmt::Debug for StateCommit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCommit").field(&self.setter).finish()
    }
}

// =============================================================================
// HOOK
// =============================================================================

/// A link over a fresh piece of component state initialized to `init`.
///
/// The returned link is this render's snapshot. Writes are queued and show
/// up in the link returned by the next render.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_state_link, SetAction};
///
/// let app = mount(|cx| use_state_link(cx, 0));
/// let link = app.output();
///
/// link.set(SetAction::apply(|n| n + 1));
/// link.set(SetAction::apply(|n| n + 1));
/// flush().unwrap();
///
/// assert_eq!(*app.output().value(), 2);
/// ```
pub fn use_state_link<T: Clone + 'static>(cx: &mut Scope<'_>, init: T) -> Link<T> {
    let (value, setter) = cx.use_state(move || init);
    Link::new(value, StateCommit::new(setter))
}

// =============================================================================
// TESTS
// =============================================================================
