// ============================================================================
// spark-links - Ergonomic Macros
// ============================================================================

/// Helper macro to clone variables into a move closure.
///
/// Links, setters, and mount handles are all cheap to clone; this saves the
/// `let x = x.clone();` lines before handing them to an effect or callback.
///
/// # Usage
///
/// ```rust
/// use spark_links::{cloned, flush, mount, use_state_link};
///
/// let app = mount(|cx| {
///     let count = use_state_link(cx, 0);
///     cx.use_effect((), cloned!(count => move |_| count.set_with(|n| n + 1)));
///     count
/// });
///
/// flush().unwrap();
/// assert_eq!(*app.output().value(), 1);
/// ```
#[macro_export]
macro_rules! cloned {
    ($($n:ident),+ => $e:expr) => {
        {
            $( let $n = $n.clone(); )+
            $e
        }
    };
}

/// Build a [`LinkSet`](crate::LinkSet) from links.
///
/// Bare identifiers are cloned and stored under their own name;
/// `"name" => expr` pairs store `expr` under `name`.
///
/// # Usage
///
/// ```rust
/// use spark_links::{link_set, mount, use_state_link};
///
/// let app = mount(|cx| {
///     let email = use_state_link(cx, String::from("a@b.c"));
///     let age = use_state_link(cx, 30u8);
///     let by_ident = link_set!(email, age);
///     let by_name = link_set!("mail" => email, "years" => age);
///     (by_ident, by_name)
/// });
///
/// let (by_ident, by_name) = app.output();
/// assert_eq!(by_ident.names().collect::<Vec<_>>(), ["age", "email"]);
/// assert_eq!(by_name.names().collect::<Vec<_>>(), ["mail", "years"]);
/// ```
#[macro_export]
macro_rules! link_set {
    () => {
        $crate::LinkSet::new()
    };
    ($($name:literal => $link:expr),+ $(,)?) => {
        $crate::LinkSet::new()$(.with($name, $link))+
    };
    ($($link:ident),+ $(,)?) => {
        $crate::LinkSet::new()$(.with(stringify!($link), $link.clone()))+
    };
}
