//! Option and data stores carried by every handle.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};

/// String-valued options keyed by name.
///
/// Options come from the configuration file and the command line; the
/// typed readers interpret the stored text on demand.
#[derive(Debug, Clone, Default)]
pub struct OptionStore {
    entries: BTreeMap<String, String>,
}

impl OptionStore {
    /// Create an empty option store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an option value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|s| s.as_str())
    }

    /// Get an option parsed as an integer.
    ///
    /// Returns `None` if the option is missing or not a number.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Get an option parsed as a boolean.
    ///
    /// Accepts `true`/`false`, `yes`/`no`, `on`/`off` and `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)?.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }

    /// Set an option, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove an option.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    /// Check if an option is set.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Merge options from another map; incoming values win.
    pub fn merge<I, K, V>(&mut self, options: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in options {
            self.entries.insert(k.into(), v.into());
        }
    }

    /// Iterate over options in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Opaque per-handle data keyed by name.
///
/// Values are owned by the store and read back by their concrete type.
#[derive(Default)]
pub struct DataStore {
    entries: HashMap<String, Box<dyn Any>>,
}

impl DataStore {
    /// Create an empty data store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value, replacing (and dropping) any previous one under `key`.
    pub fn insert<T: Any>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Borrow a value if it exists and has type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref())
    }

    /// Mutably borrow a value if it exists and has type `T`.
    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries.get_mut(key).and_then(|v| v.downcast_mut())
    }

    /// Remove a value and return it if it has type `T`.
    ///
    /// A value of another type stays in the store.
    pub fn remove<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.entries.get(key)?.is::<T>() {
            return None;
        }
        self.entries
            .remove(key)
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Check if a key is present, regardless of value type.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for DataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("DataStore").field("keys", &keys).finish()
    }
}
