// ============================================================================
// spark-links - Bound Links
// Local state that follows an external source value, one way
// ============================================================================
//
// A bound link starts from the source value. When a render brings a
// different source value, an effect keyed on it overwrites the local state. Between source changes the local
// state may be set freely and diverge; the next source change wins.
// ============================================================================

use std::fmt;

use crate::core::types::SetAction;
use crate::host::component::Scope;
use crate::primitives::link::Link;
use crate::primitives::safe::use_safe_link;
use crate::primitives::state_link::use_state_link;

// =============================================================================
// LINK SOURCE
// =============================================================================

/// What a bound link follows: a plain value, or another link's value.
///
/// Links convert with `.into()`; plain values are wrapped explicitly in
/// [`LinkSource::Value`].
pub enum LinkSource<T> {
    Value(T),
    Link(Link<T>),
}

impl<T: Clone + 'static> LinkSource<T> {
    /// The source's current value.
    pub fn value(&self) -> &T {
        match self {
            LinkSource::Value(value) => value,
            LinkSource::Link(link) => link.value(),
        }
    }

    /// Unwrap to the current value. Only a link's value is tracked, never
    /// its commit capability.
    pub fn into_value(self) -> T {
        match self {
            LinkSource::Value(value) => value,
            LinkSource::Link(link) => link.clone_value(),
        }
    }

    pub fn is_link(&self) -> bool {
        matches!(self, LinkSource::Link(_))
    }
}

impl<T> From<Link<T>> for LinkSource<T> {
    fn from(link: Link<T>) -> Self {
        LinkSource::Link(link)
    }
}

impl<T: fmt::Debug> fmt::Debug for LinkSource<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSource::Value(value) => f.debug_tuple("Value").field(value).finish(),
            LinkSource::Link(link) => f.debug_tuple("Link").field(link).finish(),
        }
    }
}

// =============================================================================
// HOOKS
// =============================================================================

/// A state link initialized from `source` that re-syncs whenever the source
/// value changes.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_bound_link, use_state_link};
///
/// let app = mount(|cx| {
///     let parent = use_state_link(cx, 1);
///     let child = use_bound_link(cx, parent.clone());
///     (parent, child)
/// });
///
/// let (_, child) = app.output();
/// child.set(50);
/// flush().unwrap();
/// assert_eq!(*app.output().1.value(), 50);
///
/// let (parent, _) = app.output();
/// parent.set(2);
/// flush().unwrap();
/// assert_eq!(*app.output().1.value(), 2);
/// ```
pub fn use_bound_link<T>(cx: &mut Scope<'_>, source: impl Into<LinkSource<T>>) -> Link<T>
where
    T: Clone + PartialEq + 'static,
{
    let source = source.into().into_value();
    let link = use_state_link(cx, source.clone());
    follow_source(cx, &link, source);
    link
}

/// [`use_bound_link`] over a safe link: syncs and local writes that land
/// after teardown are absorbed.
pub fn use_safe_bound_link<T>(cx: &mut Scope<'_>, source: impl Into<LinkSource<T>>) -> Link<T>
where
    T: Clone + PartialEq + 'static,
{
    let source = source.into().into_value();
    let link = use_safe_link(cx, source.clone());
    follow_source(cx, &link, source);
    link
}

fn follow_source<T>(cx: &mut Scope<'_>, link: &Link<T>, source: T)
where
    T: Clone + PartialEq + 'static,
{
    // The state already starts at the mount-time source.
    let mounting = cx.render_index() == 0;
    let commit = link.commit_handle();

    cx.use_effect(source, move |source| {
        if !mounting {
            commit.commit(SetAction::Replace(source.clone()));
        }
    });
}

// =============================================================================
// TESTS
// =============================================================================
