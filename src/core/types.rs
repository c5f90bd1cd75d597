// ============================================================================
// spark-links - Type Definitions
// Set actions, the commit capability, and type-erased component handles
// ============================================================================

use std::fmt;

// =============================================================================
// SET ACTION
// =============================================================================

/// Functional update: receives the latest committed value, returns the next one.
pub type ApplyFn<T> = Box<dyn FnOnce(&T) -> T>;

/// Cleanup returned by effects and registered for teardown.
pub type CleanupFn = Box<dyn FnOnce()>;

/// A requested state transition.
///
/// Either a replacement value, or a function applied against whatever value is
/// current when the host processes the action. Functional actions never see a
/// snapshot captured at dispatch time, so several of them queued in the same
/// tick compose in dispatch order.
///
/// # Example
///
/// ```
/// use spark_links::SetAction;
///
/// let replace: SetAction<i32> = 5.into();
/// assert_eq!(replace.resolve(&1), 5);
///
/// let bump = SetAction::apply(|n: &i32| n + 1);
/// assert_eq!(bump.resolve(&1), 2);
/// ```
pub enum SetAction<T> {
    /// Commit this value as-is.
    Replace(T),
    /// Compute the next value from the latest one.
    Apply(ApplyFn<T>),
}

impl<T> SetAction<T> {
    /// Build a functional action from a closure.
    pub fn apply(f: impl FnOnce(&T) -> T + 'static) -> Self {
        SetAction::Apply(Box::new(f))
    }

    /// Produce the next value given the latest one.
    pub fn resolve(self, current: &T) -> T {
        match self {
            SetAction::Replace(value) => value,
            SetAction::Apply(f) => f(current),
        }
    }

    /// Whether this is a functional action.
    pub fn is_functional(&self) -> bool {
        matches!(self, SetAction::Apply(_))
    }
}

impl<T> From<T> for SetAction<T> {
    fn from(value: T) -> Self {
        SetAction::Replace(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for SetAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SetAction::Replace(value) => f.debug_tuple("Replace").field(value).finish(),
            SetAction::Apply(_) => f.write_str("Apply(..)"),
        }
    }
}

// =============================================================================
// COMMIT CAPABILITY
// =============================================================================
//
// A link is a value snapshot plus a commit capability. Variants (state-backed,
// mount-guarded, ...) are built by wrapping one capability in another rather
// than by specializing the link type itself.
// =============================================================================

/// The write half of a link.
pub trait Commit<T> {
    /// Hand a transition to whatever owns the underlying state.
    fn commit(&self, action: SetAction<T>);
}

impl<T, F> Commit<T> for F
where
    F: Fn(SetAction<T>),
{
    fn commit(&self, action: SetAction<T>) {
        self(action)
    }
}

// =============================================================================
// TYPE-ERASED COMPONENT
// =============================================================================

/// Type-erased view of a mounted component, used by the host's queues.
///
/// The dirty and effect queues hold `Weak<dyn AnyComponent>` so a component
/// dropped while queued simply disappears from the next flush.
pub trait AnyComponent {
    /// Host-assigned identifier, stable for the component's lifetime.
    fn id(&self) -> u64;

    /// Whether teardown has not happened yet.
    fn is_mounted(&self) -> bool;

    /// Mark the component as needing a render and queue it once.
    fn request_render(&self);

    /// Re-run the render closure if state was queued since the last render.
    /// Returns whether a render happened.
    fn render(&self) -> bool;

    /// Run effects scheduled by the latest render. Returns how many ran.
    fn run_effects(&self) -> usize;
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn replace_ignores_current() {
        let action: SetAction<String> = String::from("next").into();
        assert!(!action.is_functional());
        assert_eq!(action.resolve(&String::from("prev")), "next");
    }

    #[test]
    fn apply_sees_current() {
        let action = SetAction::apply(|v: &Vec<i32>| {
            let mut next = v.clone();
            next.push(3);
            next
        });
        assert!(action.is_functional());
        assert_eq!(action.resolve(&vec![1, 2]), vec![1, 2, 3]);
    }

    #[test]
    fn closures_are_commits() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let commit = {
            let seen = seen.clone();
            move |action: SetAction<i32>| seen.borrow_mut().push(action.resolve(&10))
        };

        commit.commit(SetAction::Replace(1));
        commit.commit(SetAction::apply(|n| n * 2));

        assert_eq!(*seen.borrow(), vec![1, 20]);
    }

    #[test]
    fn debug_hides_closures() {
        let replace: SetAction<i32> = 7.into();
        assert_eq!(format!("{:?}", replace), "Replace(7)");
        let apply: SetAction<i32> = SetAction::apply(|n| *n);
        assert_eq!(format!("{:?}", apply), "Apply(..)");
    }
}
