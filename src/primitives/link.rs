// ============================================================================
// spark-links - Value Link
//
// A link is a snapshot of a value plus the capability to request that the
// value be replaced. It is read-only from the outside: the only way to change
// what the next snapshot holds is through set() / update().
// ============================================================================

use std::fmt;
use std::rc::Rc;

use crate::core::types::{Commit, SetAction};

// =============================================================================
// LINK<T>
// =============================================================================

/// A value cursor: the current value and a way to request a new one.
///
/// Links built by hooks are snapshots taken at render time. Calling `set`
/// does not change this snapshot; the committed value shows up in the link
/// produced by the next render. Only the commit capability keeps its
/// identity across renders.
///
/// # Example
///
/// ```
/// use spark_links::{Link, SetAction};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let store = Rc::new(RefCell::new(1));
/// let link = Link::new(*store.borrow(), {
///     let store = store.clone();
///     move |action: SetAction<i32>| {
///         let next = action.resolve(&store.borrow());
///         *store.borrow_mut() = next;
///     }
/// });
///
/// link.set_with(|n| n + 1);
/// assert_eq!(*store.borrow(), 2);
/// // The link itself is a snapshot.
/// assert_eq!(*link.value(), 1);
/// ```
pub struct Link<T> {
    value: T,
    commit: Rc<dyn Commit<T>>,
}

impl<T: Clone> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            commit: self.commit.clone(),
        }
    }
}

impl<T: 'static> Link<T> {
    /// Build a link from a value and any commit capability.
    pub fn new(value: T, commit: impl Commit<T> + 'static) -> Self {
        Self {
            value,
            commit: Rc::new(commit),
        }
    }

    /// Build a link that shares an existing commit capability.
    pub fn from_shared(value: T, commit: Rc<dyn Commit<T>>) -> Self {
        Self { value, commit }
    }

    /// A link whose writes go nowhere.
    pub fn detached(value: T) -> Self {
        Self::new(value, |_: SetAction<T>| {})
    }

    /// The current value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.clone()
    }

    /// Borrow the current value in a closure.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value)
    }

    /// Deep copy of the current value, detached from the link.
    pub fn clone_value(&self) -> T
    where
        T: Clone,
    {
        self.value.clone()
    }

    /// Request a new value: either a replacement, or a function of the latest
    /// committed value.
    pub fn set(&self, action: impl Into<SetAction<T>>) {
        self.commit.commit(action.into());
    }

    /// Request a functional update.
    pub fn set_with(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.commit.commit(SetAction::apply(f));
    }

    /// Edit a clone of the latest committed value.
    ///
    /// `f` receives a mutable draft. If it returns `Some(next)`, `next` is
    /// committed; if it returns `None`, the (possibly mutated) draft is
    /// committed. Either way the draft is a clone, so the value the link
    /// was built from is never touched.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_links::{flush, mount, use_state_link};
    ///
    /// let app = mount(|cx| use_state_link(cx, vec![1, 2]));
    ///
    /// // Mutate in place, return nothing.
    /// app.output().update(|items| {
    ///     items.push(3);
    ///     None
    /// });
    /// flush().unwrap();
    /// assert_eq!(*app.output().value(), vec![1, 2, 3]);
    ///
    /// // Or compute and return a new value.
    /// app.output().update(|items| Some(items.iter().map(|n| n * 10).collect()));
    /// flush().unwrap();
    /// assert_eq!(*app.output().value(), vec![10, 20, 30]);
    /// ```
    pub fn update(&self, f: impl FnOnce(&mut T) -> Option<T> + 'static)
    where
        T: Clone,
    {
        self.set_with(move |current| {
            let mut draft = current.clone();
            f(&mut draft).unwrap_or(draft)
        });
    }

    /// [`update`](Self::update) with an event payload handed to `f`.
    pub fn update_with<E: 'static>(
        &self,
        event: E,
        f: impl FnOnce(&mut T, &E) -> Option<T> + 'static,
    ) where
        T: Clone,
    {
        self.update(move |draft| f(draft, &event));
    }

    /// The commit capability, for building decorated variants.
    pub fn commit_handle(&self) -> Rc<dyn Commit<T>> {
        self.commit.clone()
    }

    /// Same value, different commit capability.
    pub fn with_commit(self, commit: impl Commit<T> + 'static) -> Self {
        Self::new(self.value, commit)
    }

    /// Same value, commit capability wrapped by `wrap`.
    pub fn map_commit<C>(self, wrap: impl FnOnce(Rc<dyn Commit<T>>) -> C) -> Self
    where
        C: Commit<T> + 'static,
    {
        let commit = wrap(self.commit);
        Self::new(self.value, commit)
    }

    /// Whether two links write to the same place.
    pub fn same_commit(&self, other: &Link<T>) -> bool {
        Rc::ptr_eq(&self.commit, &other.commit)
    }
}

impl<T: PartialEq> PartialEq for Link<T> {
    /// Links compare by value.
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Link<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link").field("value", &self.value).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
