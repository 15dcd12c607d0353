#![forbid(unsafe_code)]

//! Fixed set of named reactive cells.

use std::fmt::Write as _;

use ahash::AHashMap;
use knit_text::Lookup;

use super::cell::{ReactiveCell, Subscription};
use crate::error::VmError;
use crate::value::Value;

/// Component state: one [`ReactiveCell`] per declared key.
///
/// The key set is fixed when the store is built. Reads of unknown keys
/// return `None`; writes to them fail with [`VmError::UndeclaredKey`].
#[derive(Debug, Default)]
pub struct Store {
    cells: AHashMap<String, ReactiveCell<Value>>,
    order: Vec<String>,
}

impl Store {
    /// Build a store from `(key, initial value)` pairs.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn new<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let mut store = Self::default();
        for (key, value) in entries {
            let key = key.into();
            match store.cells.get(&key) {
                Some(cell) => cell.set(value),
                None => {
                    store.cells.insert(key.clone(), ReactiveCell::new(value));
                    store.order.push(key);
                }
            }
        }
        store
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cells.contains_key(key)
    }

    /// Declared keys in declaration order.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.order
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn cell(&self, key: &str) -> Option<&ReactiveCell<Value>> {
        self.cells.get(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.cells.get(key).map(ReactiveCell::get)
    }

    /// Store `value` under `key` and notify the key's subscribers.
    pub fn set(&self, key: &str, value: Value) -> Result<(), VmError> {
        let cell = self.cells.get(key).ok_or_else(|| VmError::UndeclaredKey {
            key: key.to_owned(),
        })?;
        cell.set(value);
        Ok(())
    }

    /// Observe writes to `key`.
    pub fn subscribe(
        &self,
        key: &str,
        callback: impl Fn(&Value) + 'static,
    ) -> Result<Subscription, VmError> {
        let cell = self.cells.get(key).ok_or_else(|| VmError::UndeclaredKey {
            key: key.to_owned(),
        })?;
        Ok(cell.subscribe(callback))
    }
}

impl Lookup for Store {
    fn write_value(&self, key: &str, out: &mut String) -> bool {
        match self.cells.get(key) {
            Some(cell) => {
                cell.with(|value| {
                    let _ = write!(out, "{value}");
                });
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knit_text::{MissingKey, resolve};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn person() -> Store {
        Store::new([("name", Value::from("Ada")), ("age", Value::from(30))])
    }

    #[test]
    fn keys_keep_declaration_order() {
        let store = Store::new([
            ("b", Value::Null),
            ("a", Value::Null),
            ("b", Value::from(1)),
        ]);
        assert_eq!(store.keys(), ["b", "a"]);
        assert_eq!(store.get("b"), Some(Value::Int(1)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn undeclared_writes_fail() {
        let store = person();
        assert_eq!(
            store.set("email", Value::from("x")),
            Err(VmError::UndeclaredKey {
                key: "email".into()
            })
        );
        assert!(!store.contains("email"));
        assert_eq!(store.get("email"), None);
    }

    #[test]
    fn subscribers_receive_writes() {
        let store = person();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _sub = store
            .subscribe("name", move |v| s.borrow_mut().push(v.clone()))
            .unwrap();
        store.set("name", Value::from("Grace")).unwrap();
        store.set("age", Value::from(31)).unwrap();
        assert_eq!(*seen.borrow(), [Value::from("Grace")]);
    }

    #[test]
    fn resolves_as_lookup() {
        let store = person();
        assert_eq!(
            resolve("Hello {{name}}, you are {{age}}", &store, MissingKey::Empty).text,
            "Hello Ada, you are 30"
        );
    }
}
