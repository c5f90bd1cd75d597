// ============================================================================
// spark-links - LinkSet
// A named collection of links with batch get/set over JSON values
// ============================================================================
//
// Links of different value types live side by side behind a small erased
// trait. Values cross the boundary as serde_json::Value, which is also the
// shape persistence writes to storage.
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::error::PersistError;
use crate::core::types::SetAction;
use crate::primitives::link::Link;

// =============================================================================
// ERASED LINK
// =============================================================================

/// A link seen only through JSON.
trait ErasedLink {
    fn read_json(&self) -> Result<Value, serde_json::Error>;
    fn check_json(&self, value: &Value) -> Result<(), serde_json::Error>;
    fn write_json(&self, value: &Value) -> Result<(), serde_json::Error>;
}

impl<T> ErasedLink for Link<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    fn read_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self.value())
    }

    fn check_json(&self, value: &Value) -> Result<(), serde_json::Error> {
        T::deserialize(value).map(drop)
    }

    fn write_json(&self, value: &Value) -> Result<(), serde_json::Error> {
        let decoded = T::deserialize(value)?;
        self.set(SetAction::Replace(decoded));
        Ok(())
    }
}

// =============================================================================
// LINK SET
// =============================================================================

/// Named links, ordered by name.
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_state_link, LinkSet};
///
/// let app = mount(|cx| {
///     let name = use_state_link(cx, String::from("ada"));
///     let age = use_state_link(cx, 36u32);
///     LinkSet::new().with("name", name).with("age", age)
/// });
///
/// let values = app.with_output(|links| links.get_values()).unwrap();
/// assert_eq!(values["age"], 36);
///
/// let mut update = serde_json::Map::new();
/// update.insert("age".into(), 37.into());
/// app.with_output(|links| links.set_values(&update)).unwrap();
/// flush().unwrap();
///
/// let values = app.with_output(|links| links.get_values()).unwrap();
/// assert_eq!(values["age"], 37);
/// assert_eq!(values["name"], "ada");
/// ```
#[derive(Clone, Default)]
pub struct LinkSet {
    links: BTreeMap<String, Rc<dyn ErasedLink>>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with<T>(mut self, name: impl Into<String>, link: Link<T>) -> Self
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.insert(name, link);
        self
    }

    /// Add a link under `name`, replacing any link already there.
    pub fn insert<T>(&mut self, name: impl Into<String>, link: Link<T>)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        self.links.insert(name.into(), Rc::new(link));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.links.contains_key(name)
    }

    /// Link names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.links.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Current value of every link, keyed by name.
    pub fn get_values(&self) -> Result<Map<String, Value>, PersistError> {
        let mut values = Map::new();
        for (name, link) in &self.links {
            let value = link.read_json().map_err(|source| PersistError::Encode {
                key: name.clone(),
                source,
            })?;
            values.insert(name.clone(), value);
        }
        Ok(values)
    }

    /// Replace the value of each link named in `values`. Names without a
    /// link are ignored.
    ///
    /// Returns how many links were written. Stops at the first value that
    /// does not decode into its link's type; writes issued before that stay
    /// issued.
    pub fn set_values(&self, values: &Map<String, Value>) -> Result<usize, PersistError> {
        let mut written = 0;
        for (name, value) in values {
            let Some(link) = self.links.get(name) else {
                continue;
            };
            link.write_json(value)
                .map_err(|source| PersistError::Decode {
                    key: name.clone(),
                    source,
                })?;
            written += 1;
        }
        Ok(written)
    }

    /// Check that every value in `values` decodes into its link's type,
    /// without writing anything.
    pub fn validate_values(&self, values: &Map<String, Value>) -> Result<(), PersistError> {
        for (name, value) in values {
            if let Some(link) = self.links.get(name) {
                link.check_json(value)
                    .map_err(|source| PersistError::Decode {
                        key: name.clone(),
                        source,
                    })?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for LinkSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// A link over a plain cell, committing immediately.
    fn cell_link<T: Clone + 'static>(store: &Rc<RefCell<T>>) -> Link<T> {
        let sink = store.clone();
        Link::new(store.borrow().clone(), move |action: SetAction<T>| {
            let next = action.resolve(&sink.borrow());
            *sink.borrow_mut() = next;
        })
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn names_are_ordered() {
        let set = LinkSet::new()
            .with("b", Link::detached(1))
            .with("a", Link::detached(2));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(set.len(), 2);
        assert!(set.contains("a"));
        assert!(!LinkSet::new().contains("a"));
        assert!(LinkSet::new().is_empty());
    }

    #[test]
    fn insert_replaces() {
        let mut set = LinkSet::new();
        set.insert("x", Link::detached(1));
        set.insert("x", Link::detached(String::from("one")));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_values().unwrap()["x"], "one");
    }

    #[test]
    fn get_values_mixed_types() {
        let set = LinkSet::new()
            .with("n", Link::detached(3))
            .with("s", Link::detached(String::from("x")))
            .with("v", Link::detached(vec![true, false]));
        assert_eq!(
            Value::Object(set.get_values().unwrap()),
            json!({ "n": 3, "s": "x", "v": [true, false] })
        );
    }

    #[test]
    fn set_values_skips_unknown_names() {
        let n = Rc::new(RefCell::new(0));
        let set = LinkSet::new().with("n", cell_link(&n));

        let written = set
            .set_values(&as_map(json!({ "n": 5, "other": "ignored" })))
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(*n.borrow(), 5);
    }

    #[test]
    fn set_values_stops_at_bad_value() {
        let a = Rc::new(RefCell::new(0));
        let b = Rc::new(RefCell::new(0));
        let set = LinkSet::new().with("a", cell_link(&a)).with("b", cell_link(&b));

        let err = set
            .set_values(&as_map(json!({ "a": 1, "b": "not a number" })))
            .unwrap_err();

        assert!(matches!(err, PersistError::Decode { ref key, .. } if key == "b"));
        assert_eq!(*a.borrow(), 1);
        assert_eq!(*b.borrow(), 0);
    }

    #[test]
    fn validate_writes_nothing() {
        let a = Rc::new(RefCell::new(0));
        let set = LinkSet::new().with("a", cell_link(&a));

        assert!(set.validate_values(&as_map(json!({ "a": 4, "z": null }))).is_ok());
        assert!(set.validate_values(&as_map(json!({ "a": [] }))).is_err());
        assert_eq!(*a.borrow(), 0);
    }

    #[test]
    fn debug_lists_names() {
        let set = LinkSet::new().with("k", Link::detached(0));
        assert_eq!(format!("{set:?}"), r#"{"k"}"#);
    }
}
