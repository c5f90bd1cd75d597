// ============================================================================
// spark-links - Persistence
// Save a LinkSet to a key-value store and restore it on the next mount
// ============================================================================
//
// The stored form is a JSON object keyed by link name. Loading is lenient:
// anything that does not decode cleanly is logged and treated as if nothing
// had been saved, so the links keep their defaults.
// ============================================================================

mod storage;

pub use storage::{FileStorage, MemoryStorage, Storage};

use std::cell::RefCell;

use serde_json::{Map, Value};

use crate::collections::LinkSet;
use crate::core::error::PersistError;
use crate::core::types::CleanupFn;
use crate::host::component::Scope;

// =============================================================================
// SAVE / LOAD
// =============================================================================

/// Write the current value of every link in `links` under `key`.
pub fn save_links<S: Storage + ?Sized>(
    storage: &S,
    key: &str,
    links: &LinkSet,
) -> Result<(), PersistError> {
    let values = links.get_values()?;
    let encoded =
        serde_json::to_string(&Value::Object(values)).map_err(|source| PersistError::Encode {
            key: key.to_owned(),
            source,
        })?;
    storage.set(key, encoded);
    tracing::debug!(key, links = links.len(), "links saved");
    Ok(())
}

/// Restore `links` from the object stored under `key`.
///
/// Returns true if stored values were applied. Returns false, leaving every
/// link untouched, when nothing is stored or the stored data is malformed:
/// invalid JSON, not an object, or an entry that does not decode into its
/// link's type.
pub fn load_links<S: Storage + ?Sized>(storage: &S, key: &str, links: &LinkSet) -> bool {
    let Some(raw) = storage.get(key) else {
        tracing::debug!(key, "no persisted links");
        return false;
    };

    let restored = decode_object(key, &raw).and_then(|values| {
        links.validate_values(&values)?;
        links.set_values(&values)
    });

    match restored {
        Ok(applied) => {
            tracing::debug!(key, applied, "links restored");
            true
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "ignoring malformed persisted links");
            false
        }
    }
}

fn decode_object(key: &str, raw: &str) -> Result<Map<String, Value>, PersistError> {
    let value: Value = serde_json::from_str(raw).map_err(|source| PersistError::Decode {
        key: key.to_owned(),
        source,
    })?;
    match value {
        Value::Object(values) => Ok(values),
        other => Err(PersistError::malformed(format!(
            "expected an object under `{key}`, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// HOOK
// =============================================================================

/// Restore `links` from `storage` on mount and save them back at teardown.
///
/// Every render hands in the current `links`; the save at teardown uses the
/// set from the latest render. Updates still queued at teardown are not
/// saved. `storage` is only taken from the first render, and from any render
/// that changes `key` (which saves under the old key and loads the new one).
///
/// # Example
///
/// ```
/// use spark_links::{flush, mount, use_persisted_links, use_state_link, LinkSet, MemoryStorage};
///
/// let storage = MemoryStorage::new();
///
/// let form = {
///     let storage = storage.clone();
///     move |cx: &mut spark_links::Scope<'_>| {
///         let email = use_state_link(cx, String::new());
///         use_persisted_links(cx, "signup", storage.clone(), LinkSet::new().with("email", email.clone()));
///         email
///     }
/// };
///
/// let first = mount(form.clone());
/// first.output().set(String::from("a@b.c"));
/// flush().unwrap();
/// first.unmount();
///
/// let second = mount(form);
/// flush().unwrap();
/// assert_eq!(second.output().value(), "a@b.c");
/// ```
pub fn use_persisted_links<S>(
    cx: &mut Scope<'_>,
    key: impl Into<String>,
    storage: S,
    links: LinkSet,
) where
    S: Storage + 'static,
{
    let latest = cx.use_ref(|| RefCell::new(LinkSet::new()));
    *latest.borrow_mut() = links;

    cx.use_effect_with_cleanup(key.into(), move |key| {
        load_links(&storage, key, &latest.borrow());

        let key = key.clone();
        let save: CleanupFn = Box::new(move || {
            if let Err(err) = save_links(&storage, &key, &latest.borrow()) {
                tracing::warn!(key = %key, error = %err, "failed to save links");
            }
        });
        Some(save)
    });
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::link::Link;
    use crate::SetAction;
    use std::rc::Rc;

    fn cell_link<T: Clone + 'static>(store: &Rc<RefCell<T>>) -> Link<T> {
        let sink = store.clone();
        Link::new(store.borrow().clone(), move |action: SetAction<T>| {
            let next = action.resolve(&sink.borrow());
            *sink.borrow_mut() = next;
        })
    }

    #[test]
    fn save_writes_object() {
        let storage = MemoryStorage::new();
        let links = LinkSet::new()
            .with("a", Link::detached(1))
            .with("b", Link::detached(String::from("x")));

        save_links(&storage, "k", &links).unwrap();

        assert_eq!(storage.get("k").as_deref(), Some(r#"{"a":1,"b":"x"}"#));
    }

    #[test]
    fn load_applies_stored_values() {
        let storage = MemoryStorage::new();
        storage.set("k", String::from(r#"{"a":5,"gone":true}"#));
        let a = Rc::new(RefCell::new(0));

        assert!(load_links(&storage, "k", &LinkSet::new().with("a", cell_link(&a))));
        assert_eq!(*a.borrow(), 5);
    }

    #[test]
    fn load_missing_key() {
        let storage = MemoryStorage::new();
        assert!(!load_links(&storage, "nothing", &LinkSet::new()));
    }

    #[test]
    fn malformed_data_is_ignored() {
        let a = Rc::new(RefCell::new(1));
        let b = Rc::new(RefCell::new(2));
        let links = LinkSet::new().with("a", cell_link(&a)).with("b", cell_link(&b));
        let storage = MemoryStorage::new();

        for raw in ["not json", "[1, 2]", r#"{"a": 9, "b": "wrong type"}"#] {
            storage.set("k", raw.to_owned());
            assert!(!load_links(&storage, "k", &links), "accepted {raw}");
        }
        assert_eq!((*a.borrow(), *b.borrow()), (1, 2));
    }

    #[test]
    fn malformed_reason_names_kind() {
        let err = decode_object("k", "3").unwrap_err();
        assert!(err.to_string().contains("a number"));
    }
}
